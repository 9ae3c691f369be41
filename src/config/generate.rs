//! Generated configuration types and the synthesizer.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::discovery::identity::{generate_display_name, generate_model_id};
use crate::discovery::metadata::ModelDescriptor;
use crate::error::{DiscoveryError, Result};

/// One runnable server entry in a generated configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Command line that starts a server for this model. `${PORT}` is
    /// substituted by the proxy at launch time.
    pub cmd: String,
    /// Display name shown to users.
    pub name: String,
    /// Short human-readable description.
    pub description: String,
}

/// Complete configuration synthesized from discovered models, handed to
/// the proxy's config validator in place of a missing config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedConfig {
    /// Seconds to wait for a started server to become healthy.
    pub health_check_timeout: u64,
    /// First port assigned to spawned servers.
    pub start_port: u16,
    pub log_level: String,
    /// Cap on metrics samples retained in memory.
    pub metrics_max_in_memory: usize,
    /// Unique model ID to server entry.
    pub models: BTreeMap<String, ModelEntry>,
}

impl Default for GeneratedConfig {
    fn default() -> Self {
        Self {
            health_check_timeout: 120,
            start_port: 5800,
            log_level: "info".to_string(),
            metrics_max_in_memory: 1000,
            models: BTreeMap::new(),
        }
    }
}

/// Build a complete config for `models`, assigning collision-free IDs.
///
/// The first descriptor to claim a base ID keeps it bare; later
/// descriptors with the same base get `-1`, `-2`, … in input order.
pub fn synthesize(models: &[ModelDescriptor], server_path: &Path) -> Result<GeneratedConfig> {
    if models.is_empty() {
        return Err(DiscoveryError::InvalidInput("no models provided"));
    }
    if server_path.as_os_str().is_empty() {
        return Err(DiscoveryError::InvalidInput("server path cannot be empty"));
    }

    let mut config = GeneratedConfig::default();
    let mut used_ids: HashMap<String, u32> = HashMap::new();

    for meta in models {
        let base_id = generate_model_id(meta);
        let id = match used_ids.get_mut(&base_id) {
            Some(count) => {
                *count += 1;
                format!("{base_id}-{count}")
            }
            None => {
                used_ids.insert(base_id.clone(), 0);
                base_id
            }
        };
        config.models.insert(id, model_entry(meta, server_path));
    }

    Ok(config)
}

fn model_entry(meta: &ModelDescriptor, server_path: &Path) -> ModelEntry {
    let mut cmd = format!(
        "{} --model {} --port ${{PORT}}",
        server_path.display(),
        meta.file_path.display()
    );
    if meta.context_length > 0 {
        cmd.push_str(&format!(" --ctx-size {}", meta.context_length));
    }

    let description = if meta.size_label.is_empty() {
        format!("Auto-discovered {} model", meta.architecture)
    } else {
        format!(
            "Auto-discovered {} {} model",
            meta.architecture, meta.size_label
        )
    };

    ModelEntry {
        cmd,
        name: generate_display_name(meta),
        description,
    }
}
