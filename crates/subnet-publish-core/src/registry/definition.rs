//! Registry entry formats
//!
//! Both definitions are TOML documents stored without extension under
//! `subnet/<name>` and `vm/<name>` of a registry repository.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{PublishError, Result};
use crate::metadata::PublicationMetadata;
use crate::sidecar::{Sidecar, VmKind};

/// Subnet entry, discoverable by other operators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubnetDefinition {
    pub id: String,
    pub alias: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub homepage: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub maintainers: Vec<String>,
    /// VM definitions this subnet runs, by registry id
    pub vms: Vec<String>,
}

/// VM entry referenced by a subnet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmDefinition {
    pub id: String,
    pub alias: String,
    pub kind: VmKind,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_vm_name: Option<String>,
    /// Upstream release of a built-in VM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub homepage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,
    /// Hex SHA-256 of the custom VM binary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(default)]
    pub maintainers: Vec<String>,
}

impl SubnetDefinition {
    pub fn new(subnet_name: &str, metadata: &PublicationMetadata) -> Self {
        Self {
            id: subnet_name.to_string(),
            alias: subnet_name.to_string(),
            homepage: metadata.homepage.clone(),
            description: metadata.description.clone(),
            maintainers: metadata.maintainers.clone(),
            vms: vec![subnet_name.to_string()],
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl VmDefinition {
    /// Build the VM entry for the sidecar's VM kind
    ///
    /// Built-in VMs point at their upstream release. A custom VM points at its
    /// binary, which must exist so its checksum can be recorded.
    pub fn for_sidecar(
        sidecar: &Sidecar,
        subnet_name: &str,
        subnet_dir: &Path,
        metadata: &PublicationMetadata,
    ) -> Result<Self> {
        let mut def = Self {
            id: subnet_name.to_string(),
            alias: subnet_name.to_string(),
            kind: sidecar.vm,
            version: metadata.version.clone(),
            vm_id: sidecar.vm_id.clone(),
            canonical_vm_name: sidecar.vm.canonical_name().map(str::to_string),
            url: sidecar.vm.upstream_url().map(str::to_string),
            homepage: metadata.homepage.clone(),
            binary: None,
            checksum: None,
            maintainers: metadata.maintainers.clone(),
        };

        if sidecar.vm == VmKind::CustomVm {
            let binary = sidecar
                .custom_vm_binary_path(subnet_dir)
                .filter(|p| p.is_file())
                .ok_or_else(|| PublishError::MissingVmBinary {
                    name: subnet_name.to_string(),
                })?;
            def.checksum = Some(sha256_file(&binary)?);
            def.binary = binary
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
        }

        Ok(def)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn sha256_file(path: &Path) -> Result<String> {
    let content = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(hex::encode(hasher.finalize()))
}
