//! Autodiscovery orchestration.

use tracing::{debug, info};

use crate::config::generate::{synthesize, GeneratedConfig};
use crate::discovery::binary::BinaryLocator;
use crate::discovery::cache::CacheLocator;
use crate::discovery::identity::deduplicate;
use crate::discovery::metadata::discover_all;
use crate::env::{EnvSource, SystemEnv};
use crate::error::{DiscoveryError, Result};

/// Runs the discovery pipeline end to end: cache resolution, metadata
/// extraction, deduplication, server lookup, config synthesis.
///
/// This is the fallback entry point a proxy calls when it has no usable
/// configuration. Every run performs a fresh scan; no state is kept
/// between runs.
pub struct Autodiscovery<E: EnvSource = SystemEnv> {
    cache: CacheLocator<E>,
    binary: BinaryLocator<E>,
}

impl Autodiscovery<SystemEnv> {
    pub fn new() -> Self {
        Self::with_env(SystemEnv)
    }
}

impl Default for Autodiscovery<SystemEnv> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EnvSource + Clone> Autodiscovery<E> {
    pub fn with_env(env: E) -> Self {
        Self {
            cache: CacheLocator::with_env(env.clone()),
            binary: BinaryLocator::with_env(env),
        }
    }
}

impl<E: EnvSource> Autodiscovery<E> {
    /// Assemble from preconfigured locators (lets tests pin the platform
    /// and home directory).
    pub fn from_parts(cache: CacheLocator<E>, binary: BinaryLocator<E>) -> Self {
        Self { cache, binary }
    }

    /// Discover cached models and synthesize a complete configuration.
    pub fn run(&self) -> Result<GeneratedConfig> {
        info!("scanning llama.cpp cache directory for GGUF files");
        let cache_dir = self
            .cache
            .resolve()
            .map_err(|e| e.context("failed to resolve cache directory"))?;

        let models =
            discover_all(&cache_dir).map_err(|e| e.context("failed to discover models"))?;
        if models.is_empty() {
            return Err(DiscoveryError::NoModelsFound(
                cache_dir.display().to_string(),
            ));
        }
        info!("found {} GGUF file(s) in cache", models.len());

        let found = models.len();
        let models = deduplicate(models);
        if models.len() < found {
            info!("{} unique model(s) after deduplication", models.len());
        }

        info!("searching for llama-server binary");
        let server_path = self.binary.locate().map_err(|e| {
            e.context(
                "failed to find llama-server \
                 (set LLAMA_SERVER_PATH environment variable or ensure llama-server is in PATH)",
            )
        })?;
        info!("found llama-server at {}", server_path.display());

        let config = synthesize(&models, &server_path)
            .map_err(|e| e.context("failed to generate config"))?;

        info!("auto-discovered {} model(s)", config.models.len());
        for id in config.models.keys() {
            debug!("  - {}", id);
        }

        Ok(config)
    }
}

/// Discover models and synthesize a config using the process
/// environment.
pub fn auto_discover() -> Result<GeneratedConfig> {
    Autodiscovery::new().run()
}
