//! Retrying transport
//!
//! Wraps a [`Transport`] with the backoff loop from `vblob_core::retry`.
//! Each attempt is classified as success, transient (retry) or final failure;
//! an exhausted transient failure leaves as the request stage's error.

use std::sync::Arc;

use vblob_core::{
    AttemptOutcome, Error, Progress, ProgressEvent, Result, RetryPolicy, retry_with_backoff,
};

use crate::normalize::error_from_response;
use crate::transport::{BlobRequest, RawResponse, Transport};

#[derive(Clone)]
pub struct RetryingTransport {
    inner: Arc<dyn Transport>,
}

impl RetryingTransport {
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self { inner }
    }

    /// Send `request`, retrying transient failures per `policy`.
    ///
    /// Returns only 2xx responses. Every error is already normalized.
    pub async fn execute(
        &self,
        request: &BlobRequest,
        policy: &RetryPolicy,
        progress: &Progress,
    ) -> Result<RawResponse> {
        let target = request.target();

        retry_with_backoff(
            policy,
            |attempt| self.attempt(request, attempt, policy.max_attempts, &target, progress),
            Error::is_retryable,
        )
        .await
        .map_err(|e| e.at_stage(request.stage))
    }

    async fn attempt(
        &self,
        request: &BlobRequest,
        attempt: u32,
        max_attempts: u32,
        target: &str,
        progress: &Progress,
    ) -> Result<RawResponse> {
        let result = match self.inner.send(request).await {
            Ok(response) if response.is_success() => Ok(response),
            Ok(response) if response.is_transient() => Err(Error::TransientStatus {
                status: response.status,
                body: response.text(),
            }),
            Ok(response) => Err(error_from_response(&response, request.stage)),
            Err(e) => Err(e),
        };

        let outcome = match &result {
            Ok(response) => AttemptOutcome::Success(response.status),
            Err(Error::TransientStatus { status, .. }) => {
                AttemptOutcome::Transient(status.to_string())
            }
            Err(e) if e.is_retryable() => AttemptOutcome::Transient(e.to_string()),
            Err(e) => AttemptOutcome::Failed(e.to_string()),
        };
        tracing::trace!(attempt, request = target, %outcome, "HTTP attempt finished");

        progress.emit(ProgressEvent::Attempt {
            attempt,
            max_attempts,
            target: target.to_string(),
            outcome,
        });

        result
    }
}
