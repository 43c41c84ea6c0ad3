//! Multipart uploads
//!
//! A session moves `Init -> Uploading -> Committing -> Done`. A failure once
//! the session exists moves it to `Aborting`, which sends a single abort and
//! then returns the failure that caused it. A failed create has nothing to
//! abort and returns directly.
//!
//! Parts upload concurrently, bounded by `transfer.concurrency`. Results land
//! in a slot per part number, so completion order never affects the commit.

use std::ops::Range;

use bytes::Bytes;
use futures::stream::{FuturesUnordered, StreamExt};
use http::{HeaderMap, Method};
use url::Url;
use vblob_core::{
    BlobDescriptor, Error, MAX_PART_COUNT, PartResult, Progress, ProgressEvent, ResolvedPut,
    Result, RetryPolicy, Stage,
};

use crate::client::{BlobClient, insert_header};
use crate::normalize::{self, MultipartCreated, PartUploaded};
use crate::transport::BlobRequest;

/// One slice of the payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PartPlan {
    pub part_number: u32,
    pub range: Range<usize>,
}

impl PartPlan {
    fn len(&self) -> u64 {
        self.range.len() as u64
    }
}

/// Split `len` bytes into consecutive parts of `part_size`; the last part
/// takes the remainder. Parts grow past `part_size` when needed to stay
/// within `MAX_PART_COUNT`.
pub(crate) fn plan_parts(len: usize, part_size: u64) -> Result<Vec<PartPlan>> {
    if len == 0 {
        return Err(Error::Validation(
            "multipart upload requires a non-empty payload".into(),
        ));
    }
    if part_size == 0 {
        return Err(Error::Config("transfer.part_size must be greater than 0".into()));
    }

    let part_size = part_size.max((len as u64).div_ceil(u64::from(MAX_PART_COUNT)));
    let count = (len as u64).div_ceil(part_size);

    let part_size = part_size as usize;
    Ok((0..count as usize)
        .map(|i| {
            let start = i * part_size;
            PartPlan {
                part_number: i as u32 + 1,
                range: start..(start + part_size).min(len),
            }
        })
        .collect())
}

#[derive(Debug)]
struct MultipartSession {
    key: String,
    upload_id: String,
    parts: Vec<PartResult>,
}

enum SessionState {
    Init,
    Uploading(MultipartSession),
    Committing(MultipartSession),
    Aborting {
        session: MultipartSession,
        error: Error,
    },
    Done(BlobDescriptor),
}

impl BlobClient {
    pub(crate) async fn put_multipart(
        &self,
        put: &ResolvedPut,
        payload: Bytes,
    ) -> Result<BlobDescriptor> {
        let plan = plan_parts(payload.len(), self.config.transfer.part_size)?;
        let progress = self.progress(put.verbose);
        let mut state = SessionState::Init;

        loop {
            state = match state {
                SessionState::Init => {
                    let session = self.create_session(put, &progress).await?;
                    progress.emit(ProgressEvent::SessionStarted {
                        upload_id: session.upload_id.clone(),
                        parts: plan.len() as u32,
                    });
                    SessionState::Uploading(session)
                }
                SessionState::Uploading(mut session) => {
                    match self
                        .upload_parts(put, &session, &payload, &plan, &progress)
                        .await
                    {
                        Ok(parts) => {
                            session.parts = parts;
                            SessionState::Committing(session)
                        }
                        Err(error) => SessionState::Aborting { session, error },
                    }
                }
                SessionState::Committing(session) => {
                    match self.complete_session(put, &session, &progress).await {
                        Ok(blob) => SessionState::Done(blob),
                        // The service accepted the commit; only its reply was unreadable
                        Err(error @ Error::Parse(_)) => return Err(error),
                        Err(error) => SessionState::Aborting { session, error },
                    }
                }
                SessionState::Aborting { session, error } => {
                    self.abort_session(put, &session, &progress).await;
                    return Err(error);
                }
                SessionState::Done(blob) => {
                    tracing::debug!(
                        pathname = %blob.pathname,
                        parts = plan.len(),
                        "Multipart upload completed"
                    );
                    return Ok(blob);
                }
            };
        }
    }

    fn mpu_url(&self, pathname: &str) -> Result<Url> {
        let mut url = self.endpoint(["mpu"])?;
        url.query_pairs_mut().append_pair("pathname", pathname);
        Ok(url)
    }

    async fn create_session(
        &self,
        put: &ResolvedPut,
        progress: &Progress,
    ) -> Result<MultipartSession> {
        let mut headers = self.put_headers(put)?;
        insert_header(&mut headers, "x-mpu-action", "create")?;

        let request = BlobRequest::new(Method::POST, self.mpu_url(&put.pathname)?, Stage::Upload)
            .headers(headers);
        let response = self.transport.execute(&request, &put.retry, progress).await?;
        let created: MultipartCreated = normalize::parse(&response)?;

        tracing::debug!(upload_id = %created.upload_id, pathname = %put.pathname, "Multipart session created");
        Ok(MultipartSession {
            key: created.key,
            upload_id: created.upload_id,
            parts: Vec::new(),
        })
    }

    /// Upload every planned part. After the first failure no new part is
    /// started; parts already in flight finish before the error is returned.
    async fn upload_parts(
        &self,
        put: &ResolvedPut,
        session: &MultipartSession,
        payload: &Bytes,
        plan: &[PartPlan],
        progress: &Progress,
    ) -> Result<Vec<PartResult>> {
        let concurrency = self.config.transfer.concurrency.max(1);
        let total = plan.len() as u32;

        let mut slots: Vec<Option<PartResult>> = vec![None; plan.len()];
        let mut pending = plan.iter();
        let mut in_flight = FuturesUnordered::new();
        let mut first_error: Option<Error> = None;
        let mut completed = 0u32;

        loop {
            while first_error.is_none() && in_flight.len() < concurrency {
                let Some(part) = pending.next() else { break };
                in_flight.push(self.upload_part(
                    put,
                    session,
                    part,
                    payload.slice(part.range.clone()),
                    progress,
                ));
            }

            let Some(result) = in_flight.next().await else {
                break;
            };

            match result {
                Ok(part) => {
                    completed += 1;
                    progress.emit(ProgressEvent::PartCompleted {
                        part_number: part.part_number,
                        size: part.size,
                        completed,
                        total,
                    });
                    let slot = part.part_number as usize - 1;
                    slots[slot] = Some(part);
                }
                Err(e) => {
                    if first_error.is_none() {
                        tracing::debug!(
                            upload_id = %session.upload_id,
                            error = %e,
                            "Part failed; draining in-flight parts"
                        );
                        first_error = Some(e);
                    }
                }
            }
        }

        if let Some(error) = first_error {
            return Err(error);
        }

        slots.into_iter().collect::<Option<Vec<_>>>().ok_or_else(|| {
            Error::for_stage(
                Stage::Upload,
                None,
                "multipart upload finished with parts missing",
            )
        })
    }

    async fn upload_part(
        &self,
        put: &ResolvedPut,
        session: &MultipartSession,
        part: &PartPlan,
        body: Bytes,
        progress: &Progress,
    ) -> Result<PartResult> {
        let headers = self.session_headers(self.auth_headers(&put.token)?, "upload", session)?;
        let request = BlobRequest::new(Method::POST, self.mpu_url(&put.pathname)?, Stage::Upload)
            .headers(headers)
            .header("x-mpu-part-number", &part.part_number.to_string())?
            .body(body);

        let response = self.transport.execute(&request, &put.retry, progress).await?;
        let uploaded: PartUploaded = normalize::parse(&response)?;

        tracing::trace!(part_number = part.part_number, size = part.len(), "Part uploaded");
        Ok(PartResult {
            part_number: part.part_number,
            etag: uploaded.etag,
            size: part.len(),
        })
    }

    async fn complete_session(
        &self,
        put: &ResolvedPut,
        session: &MultipartSession,
        progress: &Progress,
    ) -> Result<BlobDescriptor> {
        progress.emit(ProgressEvent::Committing {
            parts: session.parts.len() as u32,
        });

        let headers = self.session_headers(self.put_headers(put)?, "complete", session)?;
        let request = BlobRequest::new(Method::POST, self.mpu_url(&put.pathname)?, Stage::Commit)
            .headers(headers)
            .json(&session.parts)?;

        let response = self.transport.execute(&request, &put.retry, progress).await?;
        normalize::parse(&response)
    }

    fn abort_request(&self, put: &ResolvedPut, session: &MultipartSession) -> Result<BlobRequest> {
        let headers = self.session_headers(self.auth_headers(&put.token)?, "abort", session)?;
        Ok(
            BlobRequest::new(Method::POST, self.mpu_url(&put.pathname)?, Stage::Request)
                .headers(headers),
        )
    }

    /// Best effort and sent once: a failed abort is logged, never retried or
    /// returned
    async fn abort_session(
        &self,
        put: &ResolvedPut,
        session: &MultipartSession,
        progress: &Progress,
    ) {
        let result = match self.abort_request(put, session) {
            Ok(request) => {
                self.transport
                    .execute(&request, &RetryPolicy::no_retry(), progress)
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(_) => {
                tracing::debug!(upload_id = %session.upload_id, "Multipart session aborted");
                progress.emit(ProgressEvent::Aborted {
                    upload_id: session.upload_id.clone(),
                });
            }
            Err(e) => {
                tracing::warn!(
                    upload_id = %session.upload_id,
                    error = %e,
                    "Failed to abort multipart upload"
                );
            }
        }
    }

    fn session_headers(
        &self,
        mut headers: HeaderMap,
        action: &str,
        session: &MultipartSession,
    ) -> Result<HeaderMap> {
        insert_header(&mut headers, "x-mpu-action", action)?;
        insert_header(&mut headers, "x-mpu-key", &urlencoding::encode(&session.key))?;
        insert_header(&mut headers, "x-mpu-upload-id", &session.upload_id)?;
        Ok(headers)
    }
}
