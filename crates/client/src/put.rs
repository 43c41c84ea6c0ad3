//! Single-shot uploads and the put dispatch

use bytes::Bytes;
use http::{HeaderMap, Method};
use vblob_core::{BlobDescriptor, ProgressEvent, PutOptions, ResolvedPut, Result, Stage};

use crate::client::{BlobClient, insert_header};
use crate::normalize;
use crate::transport::BlobRequest;

impl BlobClient {
    /// Upload a payload.
    ///
    /// Payloads above `transfer.multipart_threshold`, or any payload when
    /// `options.multipart` is set, go through a multipart session. Everything
    /// else is a single PUT.
    pub async fn put(
        &self,
        pathname: &str,
        payload: Bytes,
        options: PutOptions,
    ) -> Result<BlobDescriptor> {
        let put = self.resolve_put(pathname, pathname, &options)?;
        let len = payload.len() as u64;

        if put.multipart || len > self.config.transfer.multipart_threshold {
            tracing::debug!(pathname = %put.pathname, len, "Using multipart upload");
            self.put_multipart(&put, payload).await
        } else {
            self.put_single(&put, payload).await
        }
    }

    pub(crate) async fn put_single(
        &self,
        put: &ResolvedPut,
        payload: Bytes,
    ) -> Result<BlobDescriptor> {
        let total = payload.len() as u64;
        let request = BlobRequest::new(Method::PUT, self.blob_url(&put.pathname)?, Stage::Upload)
            .headers(self.put_headers(put)?)
            .body(payload);

        let progress = self.progress(put.verbose);
        let response = self.transport.execute(&request, &put.retry, &progress).await?;
        progress.emit(ProgressEvent::BytesSent {
            bytes: total,
            total,
        });

        let blob: BlobDescriptor = normalize::parse(&response)?;
        tracing::debug!(pathname = %blob.pathname, bytes = total, "Uploaded blob");
        Ok(blob)
    }

    /// Headers describing the blob being written
    pub(crate) fn put_headers(&self, put: &ResolvedPut) -> Result<HeaderMap> {
        let mut headers = self.auth_headers(&put.token)?;
        insert_header(&mut headers, "access", "public")?;
        insert_header(&mut headers, "x-content-type", &put.content_type)?;
        insert_header(
            &mut headers,
            "x-cache-control-max-age",
            &put.cache_control_max_age,
        )?;
        insert_header(&mut headers, "x-add-random-suffix", flag(put.add_random_suffix))?;
        insert_header(&mut headers, "x-allow-overwrite", flag(put.allow_overwrite))?;
        Ok(headers)
    }
}

fn flag(enabled: bool) -> &'static str {
    if enabled { "1" } else { "0" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedTransport, Recorder, descriptor_json, test_config};
    use crate::transport::RawResponse;
    use std::sync::Arc;
    use vblob_core::{Error, TransferConfig};

    fn client(transport: Arc<ScriptedTransport>) -> BlobClient {
        let mut config = test_config();
        config.transfer = TransferConfig {
            multipart_threshold: 1024,
            part_size: 512,
            concurrency: 2,
        };
        BlobClient::with_transport(config, transport).unwrap()
    }

    #[tokio::test]
    async fn test_small_put_is_single_request() {
        let transport = ScriptedTransport::service();
        let client = client(transport.clone());

        let blob = client
            .put("docs/readme.txt", Bytes::from_static(b"hello"), PutOptions::default())
            .await
            .unwrap();
        assert_eq!(blob.pathname, "docs/readme.txt");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.url.path(), "/docs/readme.txt");
        assert_eq!(request.header_value("access"), Some("public"));
        assert_eq!(request.header_value("x-content-type"), Some("text/plain"));
        assert_eq!(request.header_value("x-cache-control-max-age"), Some("31536000"));
        assert_eq!(request.header_value("x-add-random-suffix"), Some("0"));
        assert_eq!(request.header_value("x-allow-overwrite"), Some("1"));
        assert_eq!(request.header_value("x-api-version"), Some("7"));
        assert!(request.header_value("x-mpu-action").is_none());
        assert_eq!(request.body.as_deref(), Some(&b"hello"[..]));
    }

    #[tokio::test]
    async fn test_payload_at_threshold_stays_single_shot() {
        let transport = ScriptedTransport::service();
        client(transport.clone())
            .put("a.bin", Bytes::from(vec![0u8; 1024]), PutOptions::default())
            .await
            .unwrap();
        assert_eq!(transport.count_action("create"), 0);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_put_addresses_same_pathname() {
        let transport = ScriptedTransport::service();
        let client = client(transport.clone());

        let first = client
            .put("same.txt", Bytes::from_static(b"one"), PutOptions::default())
            .await
            .unwrap();
        let second = client
            .put("same.txt", Bytes::from_static(b"two"), PutOptions::default())
            .await
            .unwrap();

        assert_eq!(first.url, second.url);
        let requests = transport.requests();
        assert_eq!(requests[0].url, requests[1].url);
    }

    #[tokio::test]
    async fn test_invalid_pathname_fails_before_network() {
        let transport = ScriptedTransport::service();
        let err = client(transport.clone())
            .put("", Bytes::from_static(b"x"), PutOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_upload_error_carries_status() {
        let transport = ScriptedTransport::new(|_, _| {
            Ok(RawResponse::new(
                400,
                r#"{"error":{"code":"bad_request","message":"Invalid pathname"}}"#,
            ))
        });
        let err = client(transport)
            .put("a.txt", Bytes::from_static(b"x"), PutOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upload { status: Some(400), .. }));
    }

    #[tokio::test]
    async fn test_verbose_put_reports_bytes() {
        let transport = ScriptedTransport::new(|_, _| {
            Ok(RawResponse::new(200, descriptor_json("a.txt")))
        });
        let recorder = Arc::new(Recorder::default());
        let client = client(transport).with_listener(recorder.clone());

        client
            .put("a.txt", Bytes::from_static(b"12345"), PutOptions::new().verbose(true))
            .await
            .unwrap();

        let events = recorder.events();
        assert!(events.contains(&ProgressEvent::BytesSent { bytes: 5, total: 5 }));
    }

    #[tokio::test]
    async fn test_quiet_put_reports_nothing() {
        let recorder = Arc::new(Recorder::default());
        let client = client(ScriptedTransport::service()).with_listener(recorder.clone());

        client
            .put("a.txt", Bytes::from_static(b"12345"), PutOptions::default())
            .await
            .unwrap();
        assert!(recorder.events().is_empty());
    }
}
