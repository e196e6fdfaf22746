//! Error types for gl-bulk-merge

use thiserror::Error;

/// Errors surfaced by the GitLab client, the merge orchestrator and the CLI
#[derive(Error, Debug)]
pub enum Error {
    /// GitLab answered with a non-2xx status
    ///
    /// The raw response body is kept verbatim so callers can pattern-match
    /// on GitLab's own error text.
    #[error("GitLab API {status}: {body}")]
    GitLabApi {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Transport-level failure (connection refused, timeout, TLS, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing or invalid settings
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid command input (blank branch, unknown target, ...)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Group path did not resolve to anything
    #[error("group not found: {0}")]
    GroupNotFound(String),

    /// Project selector did not match any project in the group
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    /// A merge run finished with failed projects
    #[error("{failed} of {total} project(s) failed")]
    MergeFailures {
        /// Number of projects that ended in an error outcome
        failed: usize,
        /// Number of projects in the run
        total: usize,
    },

    /// Unexpected internal state
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status of a GitLab API error, if this is one
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::GitLabApi { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result alias using the crate error type
pub type Result<T> = std::result::Result<T, Error>;
