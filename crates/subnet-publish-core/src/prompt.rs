//! Prompter capability
//!
//! The core only asks questions through this trait. The CLI supplies a
//! terminal implementation; tests supply canned answers.

use semver::Version;

use crate::error::{PublishError, Result};

/// Validator for free-text answers
pub type Validator<'a> = &'a dyn Fn(&str) -> Result<()>;

pub trait Prompter {
    /// Non-empty free text
    fn capture_string(&self, prompt: &str) -> Result<String>;

    /// Free text where blank is allowed; `validator` sees the raw answer
    fn capture_empty(&self, prompt: &str, validator: Validator<'_>) -> Result<String>;

    /// Ordered list of `label` items, returns `(items, skipped)`
    fn capture_list_decision(&self, prompt: &str, label: &str) -> Result<(Vec<String>, bool)>;

    /// Semantic version, validated with [`validate_version`]
    fn capture_version(&self, prompt: &str) -> Result<String>;
}

/// Accepts `1.2.3` and `v1.2.3`, with optional pre-release and build parts
pub fn validate_version(input: &str) -> Result<()> {
    let trimmed = input.trim();
    let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(bare)
        .map(|_| ())
        .map_err(|_| PublishError::InvalidVersion {
            version: input.to_string(),
        })
}

/// Blank, or an http(s) URL
pub fn validate_url_or_empty(input: &str) -> Result<()> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        return Ok(());
    }
    Err(PublishError::metadata(format!(
        "'{}' is not an http(s) URL",
        trimmed
    )))
}

/// Accepts anything
pub fn accept_any(_input: &str) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_accepts_v_prefix() {
        assert!(validate_version("v0.9.99").is_ok());
        assert!(validate_version("1.0.0").is_ok());
        assert!(validate_version("1.0.0-rc.1+build.5").is_ok());
    }

    #[test]
    fn version_rejects_partial() {
        for bad in ["", "v", "1.0", "latest", "vv1.0.0"] {
            let err = validate_version(bad).unwrap_err();
            assert!(matches!(err, PublishError::InvalidVersion { .. }), "{}", bad);
        }
    }

    #[test]
    fn url_or_empty() {
        assert!(validate_url_or_empty("").is_ok());
        assert!(validate_url_or_empty("https://example.com").is_ok());
        assert!(validate_url_or_empty("ftp://example.com").is_err());
    }
}
