use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use subnet_publish_core::config::Config;
use subnet_publish_core::{
    do_publish, GitPublisher, Layout, PublishContext, PublishError, RegistryScanner, Result,
    Sidecar,
};

mod args;
mod prompter;
use args::{Cli, Commands, ConfigAction};
use prompter::TerminalPrompter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let base_dir = resolve_base_dir(cli.base_dir);
    debug!(base_dir = %base_dir.display(), "resolved base directory");

    let result = match cli.command {
        Some(Commands::Publish { subnet }) => handle_publish(&base_dir, &subnet),
        Some(Commands::Status { subnet }) => handle_status(&base_dir, &subnet),
        Some(Commands::Repos) => handle_repos(&base_dir),
        Some(Commands::Config { action }) => handle_config(action, &base_dir),
        None => {
            Cli::command().print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// `RUST_LOG` wins; otherwise -v / -q pick the level
fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn resolve_base_dir(cli_base: Option<PathBuf>) -> PathBuf {
    if let Some(base) = cli_base {
        return base;
    }

    if let Ok(base) = std::env::var("SUBNET_PUBLISH_BASE") {
        return PathBuf::from(base);
    }

    dirs::home_dir()
        .map(|h| h.join(".subnet-publish"))
        .unwrap_or_else(|| PathBuf::from(".subnet-publish"))
}

fn load_layout(base_dir: &Path) -> Result<(Config, Layout)> {
    let config = Config::load(base_dir)?;
    let layout = Layout::new(base_dir.to_path_buf(), &config);
    Ok((config, layout))
}

fn handle_publish(base_dir: &Path, subnet: &str) -> Result<()> {
    let (config, layout) = load_layout(base_dir)?;
    let mut sidecar = Sidecar::load(&layout.sidecar_path(subnet))?;
    if sidecar.name.is_empty() {
        sidecar.name = subnet.to_string();
    }

    let prompter = TerminalPrompter::stdio();
    let ctx = PublishContext::new(&layout, &prompter);

    println!();
    println!("{} {} ({})", "Publishing:".cyan(), subnet, sidecar.vm);
    println!();

    do_publish(
        &ctx,
        &sidecar,
        subnet,
        |repo_dir: &Path, repos_path: &Path, _subnet_dir: &Path| {
            GitPublisher::new(repo_dir, repos_path).with_git_config(&config.git)
        },
    )?;

    println!();
    println!("{} {}", "Published:".green(), subnet);
    Ok(())
}

fn handle_status(base_dir: &Path, subnet: &str) -> Result<()> {
    let (_, layout) = load_layout(base_dir)?;
    let scanner = RegistryScanner::new(layout.repos_dir());

    match scanner.find_published(subnet)? {
        Some(alias) => println!("{} {} (in {})", "Published:".green(), subnet, alias.cyan()),
        None => println!("{} {}", "Not published:".yellow(), subnet),
    }
    Ok(())
}

fn handle_repos(base_dir: &Path) -> Result<()> {
    let (_, layout) = load_layout(base_dir)?;
    let scanner = RegistryScanner::new(layout.repos_dir());
    let aliases = scanner.aliases()?;

    if aliases.is_empty() {
        println!(
            "No registry repositories in {}",
            scanner.root().display().to_string().dimmed()
        );
        return Ok(());
    }

    println!();
    for alias in aliases {
        println!(
            "  {}  {}",
            alias.cyan(),
            scanner.repo_dir(&alias).display().to_string().dimmed()
        );
    }
    println!();
    Ok(())
}

fn handle_config(action: ConfigAction, base_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load(base_dir)?;
            match config.get(&key) {
                Some(value) => {
                    println!("{}", value);
                }
                None => {
                    return Err(PublishError::ConfigKeyNotFound { key });
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(base_dir)?;
            config.set(&key, &value)?;
            config.save(base_dir)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
        ConfigAction::List => {
            let config = Config::load(base_dir)?;
            println!();
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            println!();
        }
        ConfigAction::Path => {
            let path = Config::path(base_dir);
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            let path = Config::init(base_dir)?;
            println!("{} {}", "Initialized:".green(), path.display());
        }
    }

    Ok(())
}
