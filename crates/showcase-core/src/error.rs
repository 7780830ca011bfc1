//! Error taxonomy for showcase-sync.
//!
//! [`ConfigError`] is fatal to a run, [`FetchError`] is per-project and gets
//! folded into a degraded output entry, [`OutputError`] covers persisting the
//! final document. [`SyncError`] is what the top-level drivers return.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading the project list or run credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config {path:?} has no `projects` key")]
    MissingProjects { path: PathBuf },

    #[error("`projects` in config {path:?} is not an array")]
    ProjectsNotSequence { path: PathBuf },

    #[error("invalid project at index {index} in config {path:?}: {reason}")]
    InvalidDescriptor {
        path: PathBuf,
        index: usize,
        reason: String,
    },

    #[error("failed to read credential file {path:?}: {source}")]
    CredentialRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unusable credential in {path:?}: {reason}")]
    InvalidCredential { path: PathBuf, reason: String },
}

/// Errors produced by a single repository lookup.
///
/// Never escapes the task that produced it during a sync run.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The API answered with a non-2xx status.
    #[error("GitHub API request for {repo} failed: {status} {reason}: {body}")]
    Status {
        repo: String,
        status: u16,
        reason: String,
        body: String,
    },

    /// DNS, connect, timeout or connection reset.
    #[error("GitHub API request for {repo} failed: {message}")]
    Transport { repo: String, message: String },

    /// 2xx response whose body is not the expected shape.
    #[error("unexpected GitHub API payload for {repo}: {message}")]
    Decode { repo: String, message: String },

    /// The identifier was rejected before any request was made.
    #[error("invalid GitHub identifier {repo:?}: {reason}")]
    InvalidIdentifier { repo: String, reason: String },

    /// The fetch task panicked or was cancelled before producing a result.
    #[error("fetch task for {repo} did not complete: {message}")]
    TaskFailed { repo: String, message: String },
}

impl FetchError {
    /// Identifier of the repository the failed request was for.
    pub fn repo(&self) -> &str {
        match self {
            FetchError::Status { repo, .. }
            | FetchError::Transport { repo, .. }
            | FetchError::Decode { repo, .. }
            | FetchError::InvalidIdentifier { repo, .. }
            | FetchError::TaskFailed { repo, .. } => repo,
        }
    }
}

/// Errors produced while serializing or persisting the output document.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to serialize output document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write output {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to replace output {path:?}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level error for a sync or discover run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Output(#[from] OutputError),

    /// Fatal only in discover mode, where there is no descriptor list to
    /// degrade against.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Result type for showcase-sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
