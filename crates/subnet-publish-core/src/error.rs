use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Subnet already published: {name} (found in registry '{alias}')")]
    AlreadyPublished { name: String, alias: String },

    #[error("Failed to capture publication metadata: {message}")]
    MetadataCaptureFailed { message: String },

    #[error("Failed to access registry repository at {path}: {message}")]
    RepositoryAccessFailed { path: PathBuf, message: String },

    #[error("Failed to publish subnet {name}: {message}")]
    PublishFailed { name: String, message: String },

    #[error("Filesystem error while scanning {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid subnet name: '{name}'")]
    InvalidSubnetName { name: String },

    #[error("Sidecar not found: {path}")]
    SidecarNotFound { path: PathBuf },

    #[error("Failed to parse sidecar {path}: {message}")]
    SidecarParse { path: PathBuf, message: String },

    #[error("Sidecar describes subnet '{found}', not '{expected}'")]
    SidecarMismatch { expected: String, found: String },

    #[error("Custom VM binary missing for subnet {name}")]
    MissingVmBinary { name: String },

    #[error("Invalid semantic version: '{version}'")]
    InvalidVersion { version: String },

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Unknown config key: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Git error: {0}")]
    Git(String),
}

pub type Result<T> = std::result::Result<T, PublishError>;

impl PublishError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AlreadyPublished { .. } => 2,
            Self::MetadataCaptureFailed { .. } => 3,
            Self::RepositoryAccessFailed { .. } => 4,
            Self::PublishFailed { .. } => 5,
            Self::Filesystem { .. } => 6,
            _ => 1,
        }
    }

    pub(crate) fn metadata(message: impl Into<String>) -> Self {
        Self::MetadataCaptureFailed {
            message: message.into(),
        }
    }
}
