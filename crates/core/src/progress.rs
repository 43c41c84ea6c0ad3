//! Progress events for verbose operations
//!
//! Progress is a side channel: listeners observe events but can never change
//! the outcome of a request.

use std::fmt;
use std::sync::Arc;

/// Outcome of a single HTTP attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// 2xx response
    Success(u16),
    /// Transient status or network failure; another attempt may follow
    Transient(String),
    /// Non-transient failure, no retry
    Failed(String),
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Success(status) => write!(f, "ok ({status})"),
            AttemptOutcome::Transient(reason) => write!(f, "transient failure ({reason})"),
            AttemptOutcome::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

/// Something worth telling a verbose caller about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Attempt {
        attempt: u32,
        max_attempts: u32,
        target: String,
        outcome: AttemptOutcome,
    },
    /// Payload handed to the transport for a single-shot put
    BytesSent { bytes: u64, total: u64 },
    SessionStarted { upload_id: String, parts: u32 },
    PartCompleted {
        part_number: u32,
        size: u64,
        completed: u32,
        total: u32,
    },
    Committing { parts: u32 },
    Aborted { upload_id: String },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Attempt {
                attempt,
                max_attempts,
                target,
                outcome,
            } => write!(f, "attempt {attempt}/{max_attempts} {target}: {outcome}"),
            ProgressEvent::BytesSent { bytes, total } => write!(f, "sent {bytes}/{total} bytes"),
            ProgressEvent::SessionStarted { upload_id, parts } => {
                write!(f, "multipart session {upload_id} started ({parts} parts)")
            }
            ProgressEvent::PartCompleted {
                part_number,
                size,
                completed,
                total,
            } => write!(
                f,
                "part {part_number} uploaded ({size} bytes, {completed}/{total})"
            ),
            ProgressEvent::Committing { parts } => write!(f, "committing {parts} parts"),
            ProgressEvent::Aborted { upload_id } => {
                write!(f, "multipart session {upload_id} aborted")
            }
        }
    }
}

/// Receives progress events
#[cfg_attr(test, mockall::automock)]
pub trait ProgressListener: Send + Sync {
    fn on_event(&self, event: &ProgressEvent);
}

/// Default listener: one `tracing` line per event
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressListener for LogProgress {
    fn on_event(&self, event: &ProgressEvent) {
        tracing::info!("{event}");
    }
}

/// Emits events only when the call was made in verbose mode
#[derive(Clone)]
pub struct Progress {
    listener: Option<Arc<dyn ProgressListener>>,
}

impl Progress {
    /// `listener` is used only when `verbose` is set
    pub fn new(verbose: bool, listener: Arc<dyn ProgressListener>) -> Self {
        Self {
            listener: verbose.then_some(listener),
        }
    }

    pub fn silent() -> Self {
        Self { listener: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.listener.is_some()
    }

    pub fn emit(&self, event: ProgressEvent) {
        if let Some(listener) = &self.listener {
            listener.on_event(&event);
        }
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
