//! Process-environment access and platform selection.

use std::collections::HashMap;

/// Read-only source of environment values.
///
/// The pipeline never reads process state directly; everything goes
/// through this trait so tests can supply fixed values without mutating
/// the real environment.
pub trait EnvSource {
    /// Raw value for `key`, if present.
    fn var(&self, key: &str) -> Option<String>;

    /// Value for `key`, treating empty strings as unset.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|v| !v.is_empty())
    }
}

/// Environment source backed by the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl EnvSource for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Platform family the locators resolve against, selected once instead
/// of branching on the OS name at every decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Linux and the unix-likes llama.cpp caches on (`$XDG_CACHE_HOME`
    /// conventions).
    Unix,
    MacOs,
    Windows,
}

impl Platform {
    /// Map an OS name (as in `std::env::consts::OS`) to a platform
    /// family. Returns `None` for platforms without a cache convention.
    pub fn from_os(os: &str) -> Option<Self> {
        match os {
            "linux" | "freebsd" | "openbsd" | "aix" => Some(Platform::Unix),
            "macos" => Some(Platform::MacOs),
            "windows" => Some(Platform::Windows),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_count_as_unset() {
        let mut vars = HashMap::new();
        vars.insert("LLAMA_CACHE".to_string(), String::new());
        assert_eq!(vars.var("LLAMA_CACHE"), Some(String::new()));
        assert_eq!(vars.non_empty("LLAMA_CACHE"), None);
        assert_eq!(vars.non_empty("UNSET"), None);
    }

    #[test]
    fn platform_families() {
        assert_eq!(Platform::from_os("linux"), Some(Platform::Unix));
        assert_eq!(Platform::from_os("freebsd"), Some(Platform::Unix));
        assert_eq!(Platform::from_os("macos"), Some(Platform::MacOs));
        assert_eq!(Platform::from_os("windows"), Some(Platform::Windows));
        assert_eq!(Platform::from_os("wasm32"), None);
    }
}
