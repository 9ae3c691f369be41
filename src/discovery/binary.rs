//! llama-server executable discovery.

use std::fs;
use std::path::{Path, PathBuf};

use crate::env::{EnvSource, Platform, SystemEnv};
use crate::error::{DiscoveryError, Result};

/// Environment override pointing directly at the server executable.
pub const SERVER_PATH_ENV_VAR: &str = "LLAMA_SERVER_PATH";

/// Finds the llama-server executable, searching in order:
///
/// 1. `LLAMA_SERVER_PATH` environment variable
/// 2. the `PATH` search path
/// 3. common installation locations
pub struct BinaryLocator<E = SystemEnv> {
    env: E,
    os: &'static str,
    home_dir: Option<PathBuf>,
}

impl BinaryLocator<SystemEnv> {
    pub fn new() -> Self {
        Self::with_env(SystemEnv)
    }
}

impl Default for BinaryLocator<SystemEnv> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EnvSource> BinaryLocator<E> {
    pub fn with_env(env: E) -> Self {
        Self::with_env_and_os(env, std::env::consts::OS)
    }

    /// Pin the OS name instead of detecting it, so tests can exercise
    /// every platform branch from any host.
    pub fn with_env_and_os(env: E, os: &'static str) -> Self {
        let home_dir = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        Self { env, os, home_dir }
    }

    /// Override the home directory used for home-relative install
    /// locations (for tests).
    pub fn with_home_dir(mut self, home_dir: Option<PathBuf>) -> Self {
        self.home_dir = home_dir;
        self
    }

    /// Locate the server executable and return its absolute path.
    pub fn locate(&self) -> Result<PathBuf> {
        if let Some(override_path) = self.env.non_empty(SERVER_PATH_ENV_VAR) {
            let path = Path::new(&override_path);
            return match fs::metadata(path) {
                Ok(meta) if meta.is_dir() => {
                    Err(DiscoveryError::ServerOverrideIsDirectory(override_path))
                }
                Ok(_) => absolute(path),
                Err(_) => Err(DiscoveryError::ServerOverrideMissing(override_path)),
            };
        }

        let name = self.binary_name();

        let search_path = self.env.non_empty("PATH").unwrap_or_default();
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        if let Ok(path) = which::which_in(name, Some(search_path), &cwd) {
            return absolute(&path);
        }

        for dir in self.install_locations() {
            let candidate = dir.join(name);
            if let Ok(meta) = fs::metadata(&candidate) {
                if !meta.is_dir() {
                    tracing::debug!("found {} at {}", name, candidate.display());
                    return absolute(&candidate);
                }
            }
        }

        Err(DiscoveryError::ServerNotFound)
    }

    fn binary_name(&self) -> &'static str {
        if self.os == "windows" {
            "llama-server.exe"
        } else {
            "llama-server"
        }
    }

    /// Conventional install locations, probed in order after the PATH
    /// lookup fails.
    fn install_locations(&self) -> Vec<PathBuf> {
        let mut locations = vec![
            PathBuf::from("/usr/local/bin"),
            PathBuf::from("/usr/bin"),
            PathBuf::from("/opt/llama.cpp/bin"),
        ];

        if let Some(home) = &self.home_dir {
            locations.push(home.join("llama.cpp").join("build").join("bin"));
            locations.push(home.join(".local").join("bin"));
            locations.push(home.join("bin"));
        }

        match Platform::from_os(self.os) {
            Some(Platform::MacOs) => {
                locations.push(PathBuf::from("/opt/homebrew/bin"));
                locations.push(PathBuf::from("/usr/local/opt/llama.cpp/bin"));
            }
            Some(Platform::Windows) => {
                if let Some(program_files) = self.env.non_empty("ProgramFiles") {
                    locations.push(PathBuf::from(program_files).join("llama.cpp").join("bin"));
                }
            }
            _ => {}
        }

        locations
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .map_err(|e| DiscoveryError::Io(e).context("failed to make path absolute"))
}
