use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PublishError, Result};

/// Virtual machine a subnet runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VmKind {
    #[serde(rename = "SubnetEVM")]
    SubnetEvm,
    #[serde(rename = "SpacesVM")]
    SpacesVm,
    #[serde(rename = "Custom VM")]
    CustomVm,
}

impl VmKind {
    /// Canonical VM name for built-in VMs
    pub fn canonical_name(&self) -> Option<&'static str> {
        match self {
            Self::SubnetEvm => Some("subnet-evm"),
            Self::SpacesVm => Some("spacesvm"),
            Self::CustomVm => None,
        }
    }

    /// Upstream repository releases are published from
    pub fn upstream_url(&self) -> Option<&'static str> {
        match self {
            Self::SubnetEvm => Some("https://github.com/ava-labs/subnet-evm"),
            Self::SpacesVm => Some("https://github.com/ava-labs/spacesvm"),
            Self::CustomVm => None,
        }
    }
}

impl fmt::Display for VmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SubnetEvm => "SubnetEVM",
            Self::SpacesVm => "SpacesVM",
            Self::CustomVm => "Custom VM",
        };
        write!(f, "{}", s)
    }
}

/// Deployment record of a locally created subnet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sidecar {
    #[serde(default)]
    pub name: String,

    pub vm: VmKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,

    /// Binary of a custom VM, relative to the subnet directory unless absolute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_vm_binary: Option<PathBuf>,
}

impl Sidecar {
    pub fn new(name: &str, vm: VmKind) -> Self {
        Self {
            name: name.to_string(),
            vm,
            vm_id: None,
            vm_version: None,
            chain_id: None,
            custom_vm_binary: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PublishError::SidecarNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| PublishError::SidecarParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content =
            serde_json::to_string_pretty(self).map_err(|e| PublishError::SidecarParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the custom VM binary against the subnet directory
    pub fn custom_vm_binary_path(&self, subnet_dir: &Path) -> Option<PathBuf> {
        self.custom_vm_binary.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                subnet_dir.join(p)
            }
        })
    }
}
