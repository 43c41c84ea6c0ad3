//! In-process stand-ins for the blob service

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use vblob_core::{Config, ProgressEvent, ProgressListener, Result, RetryBuilder};

use crate::transport::{BlobRequest, RawResponse, Transport};

type Responder = Box<dyn Fn(&BlobRequest, usize) -> Result<RawResponse> + Send + Sync>;

/// Transport that records every request and answers from a closure.
/// The closure receives the request and its zero-based index.
pub(crate) struct ScriptedTransport {
    requests: Mutex<Vec<BlobRequest>>,
    responder: Responder,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(
        responder: impl Fn(&BlobRequest, usize) -> Result<RawResponse> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self::build(Box::new(responder), None))
    }

    /// Like `new`, but every exchange takes `delay`
    pub fn delayed(
        delay: Duration,
        responder: impl Fn(&BlobRequest, usize) -> Result<RawResponse> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self::build(Box::new(responder), Some(delay)))
    }

    /// Answers every request with an empty JSON object
    pub fn ok() -> Arc<Self> {
        Self::new(|_, _| Ok(RawResponse::new(200, "{}")))
    }

    /// Behaves like a healthy blob service
    pub fn service() -> Arc<Self> {
        Self::new(|request, _| service_response(request))
    }

    fn build(responder: Responder, delay: Option<Duration>) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            responder,
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn requests(&self) -> Vec<BlobRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests carrying `x-mpu-action: <action>`
    pub fn with_action(&self, action: &str) -> Vec<BlobRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.header_value("x-mpu-action") == Some(action))
            .collect()
    }

    pub fn count_action(&self, action: &str) -> usize {
        self.with_action(action).len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &BlobRequest) -> Result<RawResponse> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        (self.responder)(request, index)
    }
}

/// What a healthy service answers to `request`
pub(crate) fn service_response(request: &BlobRequest) -> Result<RawResponse> {
    let body = match request.header_value("x-mpu-action") {
        Some("create") => r#"{"key":"key-1","uploadId":"upload-1"}"#.to_string(),
        Some("upload") => {
            let part = request.header_value("x-mpu-part-number").unwrap_or("0");
            format!(r#"{{"etag":"etag-{part}"}}"#)
        }
        Some("complete") => {
            let pathname = request
                .url
                .query_pairs()
                .find(|(k, _)| k == "pathname")
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default();
            descriptor_json(&pathname)
        }
        Some(_) => "{}".to_string(),
        None => descriptor_json(request.url.path().trim_start_matches('/')),
    };
    Ok(RawResponse::new(200, body))
}

pub(crate) fn descriptor_json(pathname: &str) -> String {
    let url = format!("https://store.public.blob.vercel-storage.com/{pathname}");
    serde_json::json!({
        "url": url,
        "downloadUrl": format!("{url}?download=1"),
        "pathname": pathname,
        "contentType": "application/octet-stream",
        "contentDisposition": "inline",
    })
    .to_string()
}

/// Token set, fast retries
pub(crate) fn test_config() -> Config {
    Config {
        token: Some("vercel_blob_rw_store_secret".to_string()),
        api_url: "https://blob.example.com".to_string(),
        retry: RetryBuilder::new()
            .max_attempts(3)
            .base_delay(Duration::from_millis(1))
            .build(),
        ..Config::default()
    }
}

/// Listener that keeps every event
#[derive(Default)]
pub(crate) struct Recorder(Mutex<Vec<ProgressEvent>>);

impl Recorder {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.0.lock().unwrap().clone()
    }
}

impl ProgressListener for Recorder {
    fn on_event(&self, event: &ProgressEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}
