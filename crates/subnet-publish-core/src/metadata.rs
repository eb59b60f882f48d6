//! Publication metadata collection
//!
//! Questions are asked in a fixed order; later prompts mention earlier answers.

use tracing::debug;

use crate::error::{PublishError, Result};
use crate::prompt::{accept_any, validate_url_or_empty, Prompter};

/// What a registry entry needs besides the sidecar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationMetadata {
    pub repo_alias: String,
    pub repo_url: String,
    pub maintainers: Vec<String>,
    pub description: String,
    pub homepage: String,
    pub version: String,
}

/// Ask the operator for everything a registry entry needs
///
/// The first failing prompt aborts collection.
pub fn collect_metadata<P: Prompter + ?Sized>(
    prompter: &P,
    known_aliases: &[String],
) -> Result<PublicationMetadata> {
    let alias_prompt = if known_aliases.is_empty() {
        "Registry repository alias".to_string()
    } else {
        format!(
            "Registry repository alias (known: {})",
            known_aliases.join(", ")
        )
    };
    let repo_alias = required(prompter.capture_string(&alias_prompt), "repository alias")?;
    if repo_alias == "." || repo_alias == ".." || repo_alias.contains(['/', '\\']) {
        return Err(PublishError::metadata(format!(
            "repository alias '{}' must be a plain directory name",
            repo_alias
        )));
    }

    let repo_url = required(
        prompter.capture_string(&format!("Git remote URL for '{}'", repo_alias)),
        "repository URL",
    )?;

    let (maintainers, skipped) = capture(
        prompter.capture_list_decision("Who are the maintainers of this subnet?", "maintainer"),
        "maintainers",
    )?;
    let maintainers = if skipped { Vec::new() } else { maintainers };

    let description = capture(
        prompter.capture_empty("Subnet description (optional)", &accept_any),
        "description",
    )?;
    let homepage = capture(
        prompter.capture_empty("Subnet homepage URL (optional)", &validate_url_or_empty),
        "homepage",
    )?;

    let version = capture(
        prompter.capture_version("Version of the VM release to publish"),
        "version",
    )?;

    debug!(
        alias = %repo_alias,
        maintainers = maintainers.len(),
        version = %version,
        "collected publication metadata"
    );

    Ok(PublicationMetadata {
        repo_alias,
        repo_url,
        maintainers,
        description: description.trim().to_string(),
        homepage: homepage.trim().to_string(),
        version: version.trim().to_string(),
    })
}

fn capture<T>(result: Result<T>, field: &str) -> Result<T> {
    result.map_err(|e| match e {
        PublishError::MetadataCaptureFailed { .. } => e,
        other => PublishError::metadata(format!("{}: {}", field, other)),
    })
}

fn required(result: Result<String>, field: &str) -> Result<String> {
    let value = capture(result, field)?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(PublishError::metadata(format!("{} must not be empty", field)));
    }
    Ok(value)
}
