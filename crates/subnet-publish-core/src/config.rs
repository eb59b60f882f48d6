use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PublishError, Result};

const CONFIG_FILE: &str = "config.toml";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# subnet-publish configuration file
# Location: ~/.subnet-publish/config.toml

[registry]
# Directory holding one clone per registry repository alias
# Relative paths are resolved against the base directory
# Default: "repos"
repos_dir = "repos"

[git]
# Remote name used when pushing published subnets
remote = "origin"

# Branch the published commit is pushed to
branch = "main"

# Commit identity (empty: use git's own user.name / user.email)
author_name = ""
author_email = ""
"#;

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub git: GitConfig,
}

/// Registry cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry root, relative to the base directory unless absolute
    #[serde(default = "default_repos_dir")]
    pub repos_dir: String,
}

fn default_repos_dir() -> String {
    "repos".to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            repos_dir: default_repos_dir(),
        }
    }
}

/// Git push configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default)]
    pub author_name: String,

    #[serde(default)]
    pub author_email: String,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            branch: default_branch(),
            author_name: String::new(),
            author_email: String::new(),
        }
    }
}

impl Config {
    /// Load config from base directory
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content).map_err(|e| PublishError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save config to base directory
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(base_dir: &Path) -> Result<PathBuf> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path)
    }

    /// Resolve the registry root against the base directory
    pub fn repos_dir(&self, base_dir: &Path) -> PathBuf {
        let dir = Path::new(&self.registry.repos_dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            base_dir.join(dir)
        }
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        self.list()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim().to_string();
        match key {
            "registry.repos_dir" => self.registry.repos_dir = value,
            "git.remote" => self.git.remote = value,
            "git.branch" => self.git.branch = value,
            "git.author_name" => self.git.author_name = value,
            "git.author_email" => self.git.author_email = value,
            _ => {
                return Err(PublishError::ConfigKeyNotFound {
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            (
                "registry.repos_dir".to_string(),
                self.registry.repos_dir.clone(),
            ),
            ("git.remote".to_string(), self.git.remote.clone()),
            ("git.branch".to_string(), self.git.branch.clone()),
            ("git.author_name".to_string(), self.git.author_name.clone()),
            ("git.author_email".to_string(), self.git.author_email.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_returns_default() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(temp.path()).unwrap();
        assert_eq!(config.registry.repos_dir, "repos");
        assert_eq!(config.git.branch, "main");
    }

    #[test]
    fn test_init_template_parses() {
        let temp = TempDir::new().unwrap();
        let path = Config::init(temp.path()).unwrap();
        assert!(path.exists());

        let config = Config::load(temp.path()).unwrap();
        assert_eq!(config.git.remote, "origin");
        assert!(config.git.author_name.is_empty());
    }

    #[test]
    fn test_config_get_set() {
        let mut config = Config::default();

        config.set("git.branch", "registry").unwrap();
        assert_eq!(config.git.branch, "registry");
        assert_eq!(config.get("git.branch").as_deref(), Some("registry"));

        assert!(config.set("git.unknown", "x").is_err());
        assert!(config.get("git.unknown").is_none());
    }

    #[test]
    fn test_save_load_roundtrip_keeps_author() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.set("git.author_email", "ops@example.com").unwrap();
        config.save(temp.path()).unwrap();

        let loaded = Config::load(temp.path()).unwrap();
        assert_eq!(loaded.git.author_email, "ops@example.com");
    }

    #[test]
    fn test_repos_dir_resolution() {
        let base = Path::new("/base");
        let mut config = Config::default();
        assert_eq!(config.repos_dir(base), PathBuf::from("/base/repos"));

        config.registry.repos_dir = "/var/registries".to_string();
        assert_eq!(config.repos_dir(base), PathBuf::from("/var/registries"));
    }

    #[test]
    fn test_invalid_config_reports_path() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "registry = 3").unwrap();

        let err = Config::load(temp.path()).unwrap_err();
        assert!(matches!(err, PublishError::ConfigParse { .. }));
    }
}
