//! GGUF model autodiscovery.
//!
//! Locates locally cached llama.cpp model weights, extracts their
//! metadata, and synthesizes a runnable llama-server proxy configuration
//! for use when no explicit configuration exists.

pub mod config;
pub mod discovery;
pub mod env;
pub mod error;

pub use config::autodiscover::{auto_discover, Autodiscovery};
pub use config::generate::{synthesize, GeneratedConfig, ModelEntry};
pub use discovery::binary::BinaryLocator;
pub use discovery::cache::CacheLocator;
pub use discovery::metadata::{discover_all, extract_metadata, ModelDescriptor};
pub use error::{DiscoveryError, ErrorKind, Result};
