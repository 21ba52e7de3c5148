//! Error types exposed by the GitHub mining layer.

use thiserror::Error;

/// Errors surfaced while parsing input, talking to GitHub, or merging rounds.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MiningError {
    /// The provided URL could not be parsed.
    #[error("repository URL is invalid: {0}")]
    InvalidUrl(String),

    /// The repository path is incomplete.
    #[error("repository URL must match /owner/repo")]
    MissingPathSegments,

    /// The authentication token was missing.
    #[error("personal access token is required")]
    MissingToken,

    /// The authentication token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub returned a non-authentication API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response body from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// The GraphQL envelope was well formed but failed validation.
    #[error("invalid GraphQL response: {message} ({parameters})")]
    InvalidResponse {
        /// What was wrong with the response.
        message: String,
        /// Query parameters of the failed round, for diagnosis.
        parameters: String,
    },

    /// The payload shape did not match the expected records.
    #[error("could not map GraphQL payload: {message}")]
    Mapping {
        /// Deserialisation error detail.
        message: String,
    },

    /// `next()` was called after the iterator reported no further work.
    #[error("project iteration has already finished")]
    IterationFinished,

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// Configuration could not be loaded.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },
}
