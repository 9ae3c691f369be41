//! Cache directory resolution.

use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use crate::env::{EnvSource, Platform, SystemEnv};
use crate::error::{DiscoveryError, Result};

/// Environment override for the cache location, used verbatim when set.
pub const CACHE_DIR_ENV_VAR: &str = "LLAMA_CACHE";

/// Vendor subdirectory appended under the platform cache base.
const VENDOR_DIR: &str = "llama.cpp";

/// Resolves the on-disk llama.cpp model cache, mirroring llama.cpp's own
/// lookup order:
///
/// 1. `LLAMA_CACHE` environment variable (used directly)
/// 2. Platform convention:
///    - unix-likes: `$XDG_CACHE_HOME/llama.cpp` or `$HOME/.cache/llama.cpp`
///    - macOS: `$HOME/Library/Caches/llama.cpp`
///    - Windows: `%LOCALAPPDATA%\llama.cpp`
pub struct CacheLocator<E = SystemEnv> {
    env: E,
    os: &'static str,
}

impl CacheLocator<SystemEnv> {
    pub fn new() -> Self {
        Self::with_env(SystemEnv)
    }
}

impl Default for CacheLocator<SystemEnv> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EnvSource> CacheLocator<E> {
    pub fn with_env(env: E) -> Self {
        Self {
            env,
            os: std::env::consts::OS,
        }
    }

    /// Pin the OS name instead of detecting it, so tests can exercise
    /// every platform branch from any host.
    pub fn with_env_and_os(env: E, os: &'static str) -> Self {
        Self { env, os }
    }

    /// Resolve the cache directory. The returned path always ends with a
    /// path separator.
    pub fn resolve(&self) -> Result<PathBuf> {
        if let Some(dir) = self.env.non_empty(CACHE_DIR_ENV_VAR) {
            return Ok(PathBuf::from(ensure_trailing_separator(&dir)));
        }

        let platform = Platform::from_os(self.os)
            .ok_or_else(|| DiscoveryError::UnsupportedPlatform(self.os.to_string()))?;

        let base = match platform {
            Platform::Unix => {
                let cache_base = if let Some(xdg) = self.env.non_empty("XDG_CACHE_HOME") {
                    PathBuf::from(xdg)
                } else if let Some(home) = self.env.non_empty("HOME") {
                    PathBuf::from(home).join(".cache")
                } else {
                    user_home()?.join(".cache")
                };
                cache_base.join(VENDOR_DIR)
            }
            Platform::MacOs => {
                let home = match self.env.non_empty("HOME") {
                    Some(home) => PathBuf::from(home),
                    None => user_home()?,
                };
                home.join("Library").join("Caches").join(VENDOR_DIR)
            }
            Platform::Windows => {
                let local_app_data = self
                    .env
                    .non_empty("LOCALAPPDATA")
                    .ok_or(DiscoveryError::MissingEnvVar("LOCALAPPDATA"))?;
                PathBuf::from(local_app_data).join(VENDOR_DIR)
            }
        };

        Ok(PathBuf::from(ensure_trailing_separator(
            &base.to_string_lossy(),
        )))
    }

    /// Absolute path for `name` inside the cache, creating the cache
    /// directory with owner-only permissions on first use.
    ///
    /// `name` must be a bare file name; anything with a directory
    /// component is rejected before the filesystem is touched.
    pub fn resource_file(&self, name: &str) -> Result<PathBuf> {
        if Path::new(name).file_name() != Some(std::ffi::OsStr::new(name)) {
            return Err(DiscoveryError::UnsafeResourceName(name.to_string()));
        }

        let cache_dir = self.resolve()?;
        create_private_dir(&cache_dir)
            .map_err(|e| DiscoveryError::Io(e).context("failed to create cache directory"))?;

        Ok(cache_dir.join(name))
    }
}

/// Home directory from the user database, the lookup of last resort when
/// `HOME` is unset.
fn user_home() -> Result<PathBuf> {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or(DiscoveryError::HomeNotFound)
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

/// Append the platform separator unless the path already ends with one.
/// Idempotent; empty input stays empty.
fn ensure_trailing_separator(path: &str) -> String {
    match path.chars().last() {
        Some(c) if std::path::is_separator(c) => path.to_string(),
        Some(_) => format!("{path}{MAIN_SEPARATOR}"),
        None => String::new(),
    }
}
