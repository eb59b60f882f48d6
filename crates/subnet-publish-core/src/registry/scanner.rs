//! Registry scanner
//!
//! Answers "has this subnet name been claimed?" by looking for
//! `<root>/<alias>/subnet/<name>` in every locally cloned registry.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{PublishError, Result};
use crate::layout::SUBNET_DIR;

/// Read-only view over the registry root
#[derive(Debug, Clone)]
pub struct RegistryScanner {
    root: PathBuf,
}

impl RegistryScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Working tree of a registry alias
    pub fn repo_dir(&self, alias: &str) -> PathBuf {
        self.root.join(alias)
    }

    /// Whether any registry's subnet area holds an entry named `subnet_name`
    pub fn is_already_published(&self, subnet_name: &str) -> Result<bool> {
        Ok(self.find_published(subnet_name)?.is_some())
    }

    /// Alias of the first registry whose subnet area holds `subnet_name`
    ///
    /// A missing root means nothing has been published yet. Registries without
    /// a subnet area are skipped. Any other I/O error aborts the scan.
    pub fn find_published(&self, subnet_name: &str) -> Result<Option<String>> {
        validate_subnet_name(subnet_name)?;

        for (alias, repo_dir) in self.entries()? {
            let subnet_area = repo_dir.join(SUBNET_DIR);
            match fs::metadata(&subnet_area) {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => {
                    warn!(path = %subnet_area.display(), "subnet area is not a directory");
                    continue;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(fs_error(&subnet_area, e)),
            }

            let candidate = subnet_area.join(subnet_name);
            match fs::symlink_metadata(&candidate) {
                Ok(_) => {
                    debug!(subnet = subnet_name, alias = %alias, "found published subnet");
                    return Ok(Some(alias));
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(fs_error(&candidate, e)),
            }
        }

        Ok(None)
    }

    /// Known registry aliases, sorted
    pub fn aliases(&self) -> Result<Vec<String>> {
        let mut aliases: Vec<String> = self.entries()?.into_iter().map(|(a, _)| a).collect();
        aliases.sort();
        Ok(aliases)
    }

    /// Directories directly under the root, following symlinks
    fn entries(&self) -> Result<Vec<(String, PathBuf)>> {
        let read_dir = match fs::read_dir(&self.root) {
            Ok(rd) => rd,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(fs_error(&self.root, e)),
        };

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| fs_error(&self.root, e))?;
            let path = entry.path();

            let is_dir = match fs::metadata(&path) {
                Ok(meta) => meta.is_dir(),
                // Dangling symlink
                Err(e) if e.kind() == io::ErrorKind::NotFound => false,
                Err(e) => return Err(fs_error(&path, e)),
            };
            if !is_dir {
                debug!(path = %path.display(), "skipping non-directory registry entry");
                continue;
            }

            let alias = entry.file_name().to_string_lossy().into_owned();
            entries.push((alias, path));
        }

        Ok(entries)
    }
}

/// Subnet names become path components in every registry
pub fn validate_subnet_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\');
    if invalid {
        return Err(PublishError::InvalidSubnetName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn fs_error(path: &Path, source: io::Error) -> PublishError {
    PublishError::Filesystem {
        path: path.to_path_buf(),
        source,
    }
}
