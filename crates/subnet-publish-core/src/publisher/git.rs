//! Git Publisher
//!
//! Publishes into a registry working tree by driving the `git` CLI.
//! Credentials are whatever git's own helpers provide.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::config::GitConfig;
use crate::error::{PublishError, Result};
use crate::layout::{SUBNET_DIR, VM_DIR};
use crate::publisher::{ArtifactSet, Publisher, RepositoryHandle};

/// Publisher bound to one registry working tree
#[derive(Debug, Clone)]
pub struct GitPublisher {
    /// Working tree (`<repos_path>/<alias>`)
    repo_dir: PathBuf,
    /// Registry root
    repos_path: PathBuf,
    git: GitConfig,
}

impl GitPublisher {
    pub fn new(repo_dir: &Path, repos_path: &Path) -> Self {
        Self {
            repo_dir: repo_dir.to_path_buf(),
            repos_path: repos_path.to_path_buf(),
            git: GitConfig::default(),
        }
    }

    pub fn with_git_config(mut self, git: &GitConfig) -> Self {
        self.git = git.clone();
        self
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    // ========== Repository ==========

    fn open_or_init(&self) -> Result<RepositoryHandle> {
        fs::create_dir_all(&self.repos_path)?;

        if self.repo_dir.join(".git").exists() {
            self.run(&["rev-parse", "--git-dir"])?;
            debug!(path = %self.repo_dir.display(), "opened registry repository");
            return Ok(RepositoryHandle {
                path: self.repo_dir.clone(),
                created: false,
            });
        }

        if self.repo_dir.exists() && fs::read_dir(&self.repo_dir)?.next().is_some() {
            return Err(PublishError::RepositoryAccessFailed {
                path: self.repo_dir.clone(),
                message: "directory exists and is not a git repository".to_string(),
            });
        }

        fs::create_dir_all(&self.repo_dir)?;
        self.run(&["init", "--quiet"])?;
        let head = format!("refs/heads/{}", self.git.branch);
        self.run(&["symbolic-ref", "HEAD", head.as_str()])?;
        debug!(path = %self.repo_dir.display(), "initialized registry repository");

        Ok(RepositoryHandle {
            path: self.repo_dir.clone(),
            created: true,
        })
    }

    // ========== Remote ==========

    /// Point the configured remote at `url`
    fn ensure_remote(&self, repo: &RepositoryHandle, url: &str) -> Result<()> {
        let remotes = run_git(&repo.path, &["remote"])?;
        let exists = remotes.lines().any(|r| r.trim() == self.git.remote);
        let action = if exists { "set-url" } else { "add" };
        run_git(&repo.path, &["remote", action, self.git.remote.as_str(), url])?;
        Ok(())
    }

    /// Bring the working tree up to date with the remote branch, if it exists
    fn sync_with_remote(&self, repo: &RepositoryHandle) -> Result<()> {
        let heads = run_git(
            &repo.path,
            &[
                "ls-remote",
                "--heads",
                self.git.remote.as_str(),
                self.git.branch.as_str(),
            ],
        )?;
        if heads.trim().is_empty() {
            debug!(branch = %self.git.branch, "remote branch absent, publishing first commit");
            return Ok(());
        }

        run_git(
            &repo.path,
            &[
                "fetch",
                "--quiet",
                self.git.remote.as_str(),
                self.git.branch.as_str(),
            ],
        )?;

        let unborn = Command::new("git")
            .arg("-C")
            .arg(&repo.path)
            .args(["rev-parse", "--verify", "--quiet", "HEAD"])
            .output()?
            .status
            .code()
            != Some(0);

        if unborn {
            run_git(
                &repo.path,
                &[
                    "checkout",
                    "--quiet",
                    "-B",
                    self.git.branch.as_str(),
                    "FETCH_HEAD",
                ],
            )?;
        } else {
            run_git(&repo.path, &["merge", "--ff-only", "--quiet", "FETCH_HEAD"])?;
        }
        Ok(())
    }

    // ========== Commit ==========

    fn commit(&self, repo: &RepositoryHandle, message: &str) -> Result<()> {
        let mut args: Vec<String> = Vec::new();
        if !self.git.author_name.is_empty() {
            args.push("-c".to_string());
            args.push(format!("user.name={}", self.git.author_name));
        }
        if !self.git.author_email.is_empty() {
            args.push("-c".to_string());
            args.push(format!("user.email={}", self.git.author_email));
        }
        args.extend(["commit", "--quiet", "-m", message].map(str::to_string));

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_git(&repo.path, &args)?;
        Ok(())
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        run_git(&self.repo_dir, args)
    }
}

impl Publisher for GitPublisher {
    fn get_repo(&self) -> Result<RepositoryHandle> {
        self.open_or_init()
    }

    fn publish(
        &self,
        repo: &RepositoryHandle,
        alias: &str,
        url: &str,
        maintainers: &[String],
        artifacts: &ArtifactSet,
    ) -> Result<()> {
        self.ensure_remote(repo, url)?;
        self.sync_with_remote(repo)?;

        let subnet_entry = Path::new(SUBNET_DIR).join(&artifacts.subnet_name);
        if repo.path.join(&subnet_entry).exists() {
            return Err(PublishError::AlreadyPublished {
                name: artifacts.subnet_name.clone(),
                alias: alias.to_string(),
            });
        }

        let written: Vec<String> = copy_artifacts(&repo.path, artifacts)?
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        let mut add = vec!["add", "--"];
        add.extend(written.iter().map(String::as_str));
        run_git(&repo.path, &add)?;

        self.commit(repo, &commit_message(artifacts, maintainers))?;

        let refspec = format!("HEAD:{}", self.git.branch);
        run_git(&repo.path, &["push", "--quiet", self.git.remote.as_str(), refspec.as_str()])?;

        info!(
            subnet = %artifacts.subnet_name,
            alias = alias,
            url = url,
            "pushed subnet definition"
        );
        Ok(())
    }
}

/// Copy definitions into the registry areas, returning repo-relative paths
fn copy_artifacts(repo: &Path, artifacts: &ArtifactSet) -> Result<Vec<PathBuf>> {
    let targets = [
        (
            &artifacts.subnet_definition,
            Path::new(SUBNET_DIR).join(&artifacts.subnet_name),
        ),
        (
            &artifacts.vm_definition,
            Path::new(VM_DIR).join(&artifacts.subnet_name),
        ),
    ];

    let mut written = Vec::with_capacity(targets.len());
    for (source, relative) in targets {
        let dest = repo.join(&relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, &dest)?;
        written.push(relative);
    }
    Ok(written)
}

fn commit_message(artifacts: &ArtifactSet, maintainers: &[String]) -> String {
    let mut message = format!(
        "Publish subnet {} ({})",
        artifacts.subnet_name, artifacts.version
    );
    if !maintainers.is_empty() {
        message.push_str("\n\nMaintainers: ");
        message.push_str(&maintainers.join(", "));
    }
    message
}

/// Run git in `dir`, returning stdout
fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
    debug!(dir = %dir.display(), args = ?args, "git");
    let output = Command::new("git").arg("-C").arg(dir).args(args).output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PublishError::Git(format!(
            "git {} failed: {}",
            args.first().copied().unwrap_or_default(),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
