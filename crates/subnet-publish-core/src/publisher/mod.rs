//! Publisher Module
//!
//! A publisher owns the registry working tree: it obtains the repository and
//! commits/pushes the artifacts into it.
//!
//! - `git`: publisher driving the `git` CLI

pub mod git;

use std::path::{Path, PathBuf};

use crate::error::Result;

pub use git::GitPublisher;

/// Local git working tree of a registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryHandle {
    pub path: PathBuf,
    /// Whether `get_repo` had to create the repository
    pub created: bool,
}

/// Materialized definitions ready to be copied into a registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    pub subnet_name: String,
    pub version: String,
    /// Rendered subnet definition, lands at `subnet/<subnet_name>`
    pub subnet_definition: PathBuf,
    /// Rendered VM definition, lands at `vm/<subnet_name>`
    pub vm_definition: PathBuf,
}

pub trait Publisher {
    /// Open or create the registry working tree
    fn get_repo(&self) -> Result<RepositoryHandle>;

    /// Commit the artifacts into `repo` and push them to `url`
    fn publish(
        &self,
        repo: &RepositoryHandle,
        alias: &str,
        url: &str,
        maintainers: &[String],
        artifacts: &ArtifactSet,
    ) -> Result<()>;
}

impl<P: Publisher + ?Sized> Publisher for Box<P> {
    fn get_repo(&self) -> Result<RepositoryHandle> {
        (**self).get_repo()
    }

    fn publish(
        &self,
        repo: &RepositoryHandle,
        alias: &str,
        url: &str,
        maintainers: &[String],
        artifacts: &ArtifactSet,
    ) -> Result<()> {
        (**self).publish(repo, alias, url, maintainers, artifacts)
    }
}

/// Builds a publisher from `(repo_dir, repos_path, subnet_dir)` without I/O
pub trait PublisherFactory {
    type Output: Publisher;

    fn create(self, repo_dir: &Path, repos_path: &Path, subnet_dir: &Path) -> Self::Output;
}

impl<F, P> PublisherFactory for F
where
    F: FnOnce(&Path, &Path, &Path) -> P,
    P: Publisher,
{
    type Output = P;

    fn create(self, repo_dir: &Path, repos_path: &Path, subnet_dir: &Path) -> P {
        self(repo_dir, repos_path, subnet_dir)
    }
}
