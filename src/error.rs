//! Error types for the discovery pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Broad classification of a [`DiscoveryError`].
///
/// Stable across stage wrapping, so callers can branch on the failure
/// class without matching message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The host is missing something discovery requires: platform
    /// support, a mandatory environment variable, a home directory.
    Configuration,
    /// Nothing usable was found where something was expected.
    NotFound,
    /// An input or on-disk entry had the wrong shape.
    Validation,
    /// A weight file could not be parsed or lacks mandatory metadata.
    Format,
    /// Every file in a batch failed extraction.
    Aggregate,
    /// An underlying filesystem operation failed.
    Io,
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("{0} environment variable not set")]
    MissingEnvVar(&'static str),

    #[error("failed to find HOME directory")]
    HomeNotFound,

    #[error("filename must not contain directory separators: {0}")]
    UnsafeResourceName(String),

    #[error("cache path is not a directory: {0}")]
    NotADirectory(String),

    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("LLAMA_SERVER_PATH points to a directory: {0}")]
    ServerOverrideIsDirectory(String),

    #[error("LLAMA_SERVER_PATH file not found: {0}")]
    ServerOverrideMissing(String),

    #[error("llama-server not found (checked PATH and common locations)")]
    ServerNotFound,

    #[error("no GGUF models found in {0}")]
    NoModelsFound(String),

    #[error("failed to read GGUF file: {0}")]
    MalformedModelFile(String),

    #[error("missing {0}")]
    MissingMetadataKey(String),

    #[error("failed to parse any GGUF files: {0}")]
    AllFilesFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<DiscoveryError>,
    },
}

impl DiscoveryError {
    /// Wrap the error with stage-identifying context. The kind of the
    /// wrapped error is preserved.
    pub fn context(self, context: impl Into<String>) -> Self {
        DiscoveryError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DiscoveryError::UnsupportedPlatform(_)
            | DiscoveryError::MissingEnvVar(_)
            | DiscoveryError::HomeNotFound => ErrorKind::Configuration,
            DiscoveryError::ServerOverrideMissing(_)
            | DiscoveryError::ServerNotFound
            | DiscoveryError::NoModelsFound(_) => ErrorKind::NotFound,
            DiscoveryError::UnsafeResourceName(_)
            | DiscoveryError::NotADirectory(_)
            | DiscoveryError::InvalidInput(_)
            | DiscoveryError::ServerOverrideIsDirectory(_) => ErrorKind::Validation,
            DiscoveryError::MalformedModelFile(_) | DiscoveryError::MissingMetadataKey(_) => {
                ErrorKind::Format
            }
            DiscoveryError::AllFilesFailed(_) => ErrorKind::Aggregate,
            DiscoveryError::Io(_) => ErrorKind::Io,
            DiscoveryError::Context { source, .. } => source.kind(),
        }
    }
}
