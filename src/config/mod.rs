//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.magpie.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `MAGPIE_REPO_URL`, `MAGPIE_TOKEN`, or legacy
//!    `GITHUB_TOKEN`
//! 4. **Command-line arguments** – `--repo-url`/`-u`, `--token`/`-t`, and so on
//!
//! # Configuration File
//!
//! ```toml
//! repo_url = "https://github.com/owner/repo"
//! token = "ghp_example"
//! target_count = 250
//! issues_since = "2024-01-01T00:00:00Z"
//! output = "repo.json"
//! ```

use std::env;

use chrono::{DateTime, Utc};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::github::error::MiningError;
use crate::github::iterator::MiningRequest;
use crate::github::locator::RepositoryLocator;

/// Default upper bound for commits, issues, and comments per issue.
pub const DEFAULT_TARGET_COUNT: usize = 100;

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `MAGPIE_REPO_URL` or `--repo-url`: Repository URL
/// - `MAGPIE_TOKEN`, `GITHUB_TOKEN`, or `--token`: Authentication token
/// - `MAGPIE_OWNER` or `--owner`: Repository owner
/// - `MAGPIE_REPO` or `--repo`: Repository name
/// - `MAGPIE_TARGET_COUNT` or `--target-count`: Elements per stream
///
/// # Example
///
/// ```no_run
/// use magpie::MagpieConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = MagpieConfig::load().expect("failed to load configuration");
/// let locator = config.require_repository().expect("repository required");
/// let token = config.resolve_token().expect("token required");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "MAGPIE",
    discovery(
        dotfile_name = ".magpie.toml",
        config_file_name = "magpie.toml",
        app_name = "magpie"
    )
)]
pub struct MagpieConfig {
    /// GitHub repository URL to mine.
    ///
    /// Can be provided via:
    /// - CLI: `--repo-url <URL>` or `-u <URL>`
    /// - Environment: `MAGPIE_REPO_URL`
    /// - Config file: `repo_url = "..."`
    #[ortho_config(cli_short = 'u')]
    pub repo_url: Option<String>,

    /// Personal access token for GitHub API authentication.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `MAGPIE_TOKEN` or `GITHUB_TOKEN` (legacy)
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Repository owner, used when no repository URL is given.
    #[ortho_config(cli_short = 'o')]
    pub owner: Option<String>,

    /// Repository name, used when no repository URL is given.
    #[ortho_config(cli_short = 'r')]
    pub repo: Option<String>,

    /// Upper bound for commits, issues, and comments per issue.
    ///
    /// Defaults to 100.
    #[ortho_config(cli_short = 'n')]
    pub target_count: usize,

    /// Only mine commits after this RFC 3339 timestamp.
    #[ortho_config()]
    pub commits_since: Option<String>,

    /// Only mine issues updated after this RFC 3339 timestamp.
    #[ortho_config()]
    pub issues_since: Option<String>,

    /// Skips the commit stream.
    ///
    /// Note: `ortho_config` does not load boolean values from the
    /// environment, so this is a CLI or file setting only.
    #[ortho_config()]
    pub no_commits: bool,

    /// Skips the issue stream, and with it every issue comment.
    #[ortho_config()]
    pub no_issues: bool,

    /// Stops after this many rounds and keeps the partial project.
    #[ortho_config()]
    pub max_rounds: Option<usize>,

    /// Writes the mined project as pretty JSON to this path.
    ///
    /// Missing parent directories are created. CLI: `--output <PATH>` or
    /// `-w <PATH>`.
    #[ortho_config(cli_short = 'w')]
    pub output: Option<String>,

    /// Writes telemetry events to stderr as JSON lines.
    #[ortho_config()]
    pub telemetry: bool,
}

impl Default for MagpieConfig {
    fn default() -> Self {
        Self {
            repo_url: None,
            token: None,
            owner: None,
            repo: None,
            target_count: DEFAULT_TARGET_COUNT,
            commits_since: None,
            issues_since: None,
            no_commits: false,
            no_issues: false,
            max_rounds: None,
            output: None,
            telemetry: false,
        }
    }
}

impl MagpieConfig {
    /// Resolves the token from configuration or the legacy `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// For backward compatibility, if no token is provided via `MAGPIE_TOKEN`,
    /// the CLI, or a configuration file, this method falls back to reading
    /// `GITHUB_TOKEN` from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`MiningError::MissingToken`] when no token source provides a
    /// value.
    pub fn resolve_token(&self) -> Result<String, MiningError> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .ok_or(MiningError::MissingToken)
    }

    /// Resolves the repository to mine.
    ///
    /// `repo_url` wins over `owner`/`repo` when both are configured.
    ///
    /// # Errors
    ///
    /// Returns [`MiningError::Configuration`] when neither a URL nor both
    /// owner and repo are configured, and the locator's parse errors for a
    /// malformed URL.
    pub fn require_repository(&self) -> Result<RepositoryLocator, MiningError> {
        if let Some(url) = self.repo_url.as_deref() {
            return RepositoryLocator::parse(url);
        }

        match (&self.owner, &self.repo) {
            (Some(owner), Some(repo)) => RepositoryLocator::from_owner_repo(owner, repo),
            (None, _) => Err(MiningError::Configuration {
                message: "repository URL or owner is required (use --repo-url or --owner)"
                    .to_owned(),
            }),
            (_, None) => Err(MiningError::Configuration {
                message: "repository name is required (use --repo or -r)".to_owned(),
            }),
        }
    }

    /// Checks that the configured options can be used together.
    ///
    /// # Errors
    ///
    /// Returns [`MiningError::Configuration`] when both streams are disabled
    /// or the round limit is zero.
    pub fn validate(&self) -> Result<(), MiningError> {
        if self.no_commits && self.no_issues {
            return Err(MiningError::Configuration {
                message: "--no-commits and --no-issues leave nothing to mine".to_owned(),
            });
        }
        if self.max_rounds == Some(0) {
            return Err(MiningError::Configuration {
                message: "max_rounds must be at least 1".to_owned(),
            });
        }
        Ok(())
    }

    /// Builds the mining request for the given repository.
    ///
    /// # Errors
    ///
    /// Returns [`MiningError::Configuration`] when a `*_since` value is not an
    /// RFC 3339 timestamp.
    pub fn mining_request(&self, locator: &RepositoryLocator) -> Result<MiningRequest, MiningError> {
        let commits_since = parse_since("commits_since", self.commits_since.as_deref())?;
        let issues_since = parse_since("issues_since", self.issues_since.as_deref())?;

        Ok(MiningRequest::for_locator(locator, self.target_count)
            .with_commits(!self.no_commits)
            .with_issues(!self.no_issues)
            .with_commits_since(commits_since)
            .with_issues_since(issues_since))
    }
}

fn parse_since(field: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, MiningError> {
    value
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|timestamp| timestamp.with_timezone(&Utc))
                .map_err(|error| MiningError::Configuration {
                    message: format!("{field} must be an RFC 3339 timestamp: {error}"),
                })
        })
        .transpose()
}

#[cfg(test)]
mod tests;
