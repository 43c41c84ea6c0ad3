//! vblob-core: Core library for the vblob blob-storage client
//!
//! This crate provides the pieces of the client that do not depend on an HTTP
//! implementation:
//! - Error taxonomy
//! - Retry policy and the backoff loop
//! - Configuration management
//! - Per-call options, pathname rules and content-type inference
//! - Progress events
//! - BlobStore trait for blob operations

pub mod auth;
pub mod config;
pub mod error;
pub mod options;
pub mod pathname;
pub mod progress;
pub mod retry;
pub mod traits;
pub mod types;

pub use config::{Config, ConfigManager, MAX_PART_COUNT, TransferConfig};
pub use error::{Error, Result, Stage};
pub use options::{CopyOptions, ListMode, ListOptions, PutOptions, ResolvedPut};
pub use progress::{AttemptOutcome, LogProgress, Progress, ProgressEvent, ProgressListener};
pub use retry::{RetryBuilder, RetryPolicy, retry_with_backoff};
pub use traits::BlobStore;
pub use types::{BlobDescriptor, HeadResult, ListBlob, ListResult, PartResult};
