use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "subnet-publish")]
#[command(about = "Publish subnet definitions into git-backed subnet registries")]
#[command(version)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Base directory (default: ~/.subnet-publish)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Publish a subnet into a registry repository
    Publish {
        /// Subnet name (must have a sidecar under <base>/subnets/<name>)
        subnet: String,
    },

    /// Check whether a subnet name is already claimed by a known registry
    Status {
        /// Subnet name
        subnet: String,
    },

    /// List known registry repositories
    Repos,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g., git.branch)
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key (e.g., git.branch)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all config values
    List,

    /// Show config file path
    Path,

    /// Initialize config file with defaults
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_publish_with_globals() {
        let cli = Cli::parse_from(["subnet-publish", "publish", "alpha", "-v", "--base-dir", "/b"]);
        assert!(cli.verbose);
        assert_eq!(cli.base_dir, Some(PathBuf::from("/b")));
        match cli.command {
            Some(Commands::Publish { subnet }) => assert_eq!(subnet, "alpha"),
            _ => panic!("expected publish"),
        }
    }
}
