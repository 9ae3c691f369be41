//! Cache directory scanning.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{DiscoveryError, Result};

/// Extension of model weight files, matched case-insensitively.
pub const MODEL_FILE_EXTENSION: &str = ".gguf";

/// Enumerate GGUF files directly inside `cache_dir`, sorted by file name.
///
/// A missing cache directory yields an empty list, not an error; a cache
/// path that exists but is not a directory is an error, as are listing
/// failures. Subdirectories are skipped.
pub fn scan_cache(cache_dir: &Path) -> Result<Vec<PathBuf>> {
    let meta = match fs::metadata(cache_dir) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(DiscoveryError::Io(e).context("failed to stat cache directory")),
    };

    if !meta.is_dir() {
        return Err(DiscoveryError::NotADirectory(
            cache_dir.display().to_string(),
        ));
    }

    let entries = fs::read_dir(cache_dir)
        .map_err(|e| DiscoveryError::Io(e).context("failed to read cache directory"))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| DiscoveryError::Io(e).context("failed to read cache directory"))?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }

        let name = entry.file_name();
        if name
            .to_string_lossy()
            .to_lowercase()
            .ends_with(MODEL_FILE_EXTENSION)
        {
            files.push(cache_dir.join(name));
        }
    }

    files.sort();
    tracing::debug!(
        "scan of {} matched {} GGUF file(s)",
        cache_dir.display(),
        files.len()
    );
    Ok(files)
}
