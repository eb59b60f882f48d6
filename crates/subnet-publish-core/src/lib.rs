pub mod config;
pub mod error;
pub mod layout;
pub mod metadata;
pub mod prompt;
pub mod publisher;
pub mod registry;
pub mod sidecar;
pub mod workflow;

pub use config::{Config, GitConfig, RegistryConfig};
pub use error::{PublishError, Result};
pub use layout::{Layout, SUBNET_DIR, VM_DIR};
pub use metadata::{collect_metadata, PublicationMetadata};
pub use prompt::{validate_url_or_empty, validate_version, Prompter, Validator};
pub use publisher::{ArtifactSet, GitPublisher, Publisher, PublisherFactory, RepositoryHandle};
pub use registry::{RegistryScanner, SubnetDefinition, VmDefinition};
pub use sidecar::{Sidecar, VmKind};
pub use workflow::{assemble_artifacts, do_publish, PublishContext};
