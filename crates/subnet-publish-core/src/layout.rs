//! On-disk layout of the base directory
//!
//! ```text
//! <base_dir>/
//! ├── config.toml
//! ├── subnets/<name>/sidecar.json
//! └── repos/<alias>/{vm,subnet}/<name>
//! ```

use std::path::{Path, PathBuf};

use crate::config::Config;

/// VM definition area inside a registry repository
pub const VM_DIR: &str = "vm";

/// Subnet definition area inside a registry repository
pub const SUBNET_DIR: &str = "subnet";

const SUBNETS_DIR: &str = "subnets";
const SIDECAR_FILE: &str = "sidecar.json";
const STAGING_DIR: &str = "publish";

#[derive(Debug, Clone)]
pub struct Layout {
    base_dir: PathBuf,
    repos_dir: PathBuf,
}

impl Layout {
    pub fn new(base_dir: PathBuf, config: &Config) -> Self {
        let repos_dir = config.repos_dir(&base_dir);
        Self {
            base_dir,
            repos_dir,
        }
    }

    /// Layout with the default registry root (for testing)
    pub fn with_base(base_dir: PathBuf) -> Self {
        Self::new(base_dir, &Config::default())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Registry root: one subdirectory per repository alias
    pub fn repos_dir(&self) -> &Path {
        &self.repos_dir
    }

    pub fn repo_dir(&self, alias: &str) -> PathBuf {
        self.repos_dir.join(alias)
    }

    pub fn subnet_dir(&self, name: &str) -> PathBuf {
        self.base_dir.join(SUBNETS_DIR).join(name)
    }

    pub fn sidecar_path(&self, name: &str) -> PathBuf {
        self.subnet_dir(name).join(SIDECAR_FILE)
    }

    /// Where artifacts are materialized before the publisher picks them up
    pub fn staging_dir(&self, name: &str) -> PathBuf {
        self.subnet_dir(name).join(STAGING_DIR)
    }
}
