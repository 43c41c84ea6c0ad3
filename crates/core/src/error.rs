//! Error types for vblob
//!
//! Every public operation returns either its value or exactly one of these
//! errors. `Network` and `TransientStatus` only exist inside the retry loop;
//! once retries are exhausted they are converted into the boundary variant for
//! the stage the request belonged to (see [`Error::at_stage`]).

use std::fmt;

use thiserror::Error;

/// Result alias used throughout vblob
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The request stage a failure is attributed to once it leaves the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Single-shot put, multipart init or part upload
    Upload,
    /// Multipart finalize
    Commit,
    /// Any other request (list, head, delete, copy, download, abort)
    Request,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Upload => write!(f, "upload"),
            Stage::Commit => write!(f, "commit"),
            Stage::Request => write!(f, "request"),
        }
    }
}

/// Error type for all vblob operations
#[derive(Debug, Error)]
pub enum Error {
    /// Bad caller input, rejected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or rejected credential
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Blob or store does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Connection-level failure (reset, refused, timeout). Retryable.
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a transient status (5xx, 429). Retryable.
    #[error("Transient response {status}: {body}")]
    TransientStatus { status: u16, body: String },

    /// Upload failed after retries
    #[error("Upload failed{}: {body}", fmt_status(.status))]
    Upload { status: Option<u16>, body: String },

    /// Multipart commit failed after retries
    #[error("Commit failed{}: {body}", fmt_status(.status))]
    Commit { status: Option<u16>, body: String },

    /// Any other request failed after retries
    #[error("Request failed{}: {body}", fmt_status(.status))]
    Request { status: Option<u16>, body: String },

    /// Response body did not have the expected shape. Never retried.
    #[error("Unexpected response: {0}")]
    Parse(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" with status {code}"),
        None => String::new(),
    }
}

impl Error {
    /// Whether the retry loop should try again after this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Network(_) | Error::TransientStatus { .. })
    }

    /// Convert an exhausted transient failure into the boundary error for `stage`.
    ///
    /// Non-transient errors pass through unchanged.
    pub fn at_stage(self, stage: Stage) -> Self {
        let (status, body) = match self {
            Error::Network(msg) => (None, msg),
            Error::TransientStatus { status, body } => (Some(status), body),
            other => return other,
        };
        Self::for_stage(stage, status, body)
    }

    /// Build the boundary error for `stage`
    pub fn for_stage(stage: Stage, status: Option<u16>, body: impl Into<String>) -> Self {
        let body = body.into();
        match stage {
            Stage::Upload => Error::Upload { status, body },
            Stage::Commit => Error::Commit { status, body },
            Stage::Request => Error::Request { status, body },
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::TransientStatus { status, .. } => Some(*status),
            Error::Upload { status, .. }
            | Error::Commit { status, .. }
            | Error::Request { status, .. } => *status,
            _ => None,
        }
    }
}
