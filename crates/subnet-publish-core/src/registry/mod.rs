//! Registry Module
//!
//! - `scanner`: existence checks across locally cloned registries
//! - `definition`: subnet / VM entry formats written into a registry

pub mod definition;
pub mod scanner;

pub use definition::{SubnetDefinition, VmDefinition};
pub use scanner::{validate_subnet_name, RegistryScanner};
