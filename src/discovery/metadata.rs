//! GGUF metadata extraction.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use candle_core::quantized::gguf_file::{Content, Value};

use crate::discovery::identity::infer_name_from_filename;
use crate::discovery::scan::scan_cache;
use crate::error::{DiscoveryError, Result};

/// Metadata extracted from one GGUF weight file. Immutable once built.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    /// Path to the weight file.
    pub file_path: PathBuf,
    /// Base file name (e.g. `model.gguf`).
    pub file_name: String,
    /// Model architecture (e.g. `llama`, `qwen2`). Always non-empty.
    pub architecture: String,
    /// Human-readable model name.
    pub name: String,
    /// Size label (e.g. `8B`, `70B`).
    pub size_label: String,
    /// Maximum context window, 0 when the file does not declare one.
    pub context_length: u64,
    /// Embedding dimension, 0 when the file does not declare one.
    pub embedding_length: u64,
    /// Finetune flavor (e.g. `Instruct`, `Chat`).
    pub finetune: String,
}

/// Parse one GGUF file into a descriptor.
///
/// `general.architecture` is mandatory. Every other key is read
/// permissively: missing or wrongly-typed values degrade to an empty
/// string or zero instead of failing. A missing name is synthesized from
/// the file name.
pub fn extract_metadata(path: &Path) -> Result<ModelDescriptor> {
    let file = File::open(path).map_err(|e| DiscoveryError::MalformedModelFile(e.to_string()))?;
    let mut reader = BufReader::new(file);
    let content = Content::read(&mut reader)
        .map_err(|e| DiscoveryError::MalformedModelFile(e.to_string()))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let architecture = metadata_string(&content, "general.architecture")
        .filter(|arch| !arch.is_empty())
        .ok_or_else(|| DiscoveryError::MissingMetadataKey("general.architecture".to_string()))?;

    let mut name = metadata_string(&content, "general.name").unwrap_or_default();
    if name.is_empty() {
        name = infer_name_from_filename(&file_name);
    }

    let size_label = metadata_string(&content, "general.size_label").unwrap_or_default();
    let finetune = metadata_string(&content, "general.finetune").unwrap_or_default();

    let context_length =
        metadata_integer(&content, &format!("{architecture}.context_length")).unwrap_or(0);
    let embedding_length =
        metadata_integer(&content, &format!("{architecture}.embedding_length")).unwrap_or(0);

    Ok(ModelDescriptor {
        file_path: path.to_path_buf(),
        file_name,
        architecture,
        name,
        size_label,
        context_length,
        embedding_length,
        finetune,
    })
}

/// Scan `cache_dir` and extract metadata from every GGUF file found.
///
/// Files that fail extraction are dropped: as long as at least one file
/// yields a descriptor, the batch succeeds and the failures are only
/// logged. The batch fails only when every file failed, with one error
/// naming them all. Do not tighten this to fail-fast; a cache routinely
/// holds partial downloads next to good files.
pub fn discover_all(cache_dir: &Path) -> Result<Vec<ModelDescriptor>> {
    let files = scan_cache(cache_dir)?;
    if files.is_empty() {
        return Ok(Vec::new());
    }

    let mut models = Vec::new();
    let mut failures = Vec::new();

    for path in &files {
        match extract_metadata(path) {
            Ok(descriptor) => models.push(descriptor),
            Err(e) => {
                let file = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                tracing::warn!("skipping {}: {}", file, e);
                failures.push(format!("{file}: {e}"));
            }
        }
    }

    if models.is_empty() && !failures.is_empty() {
        return Err(DiscoveryError::AllFilesFailed(failures.join("; ")));
    }

    Ok(models)
}

fn metadata_string(content: &Content, key: &str) -> Option<String> {
    content.metadata.get(key).and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        _ => None,
    })
}

fn metadata_integer(content: &Content, key: &str) -> Option<u64> {
    content.metadata.get(key).and_then(|v| match v {
        Value::U64(n) => Some(*n),
        Value::U32(n) => Some(u64::from(*n)),
        Value::U16(n) => Some(u64::from(*n)),
        Value::U8(n) => Some(u64::from(*n)),
        Value::I64(n) if *n >= 0 => Some(*n as u64),
        Value::I32(n) if *n >= 0 => Some(*n as u64),
        _ => None,
    })
}
