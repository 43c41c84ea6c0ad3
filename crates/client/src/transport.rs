//! HTTP transport
//!
//! [`Transport`] performs exactly one HTTP exchange; retry lives one level up
//! in [`crate::retrying::RetryingTransport`]. Connection-level failures come
//! back as [`Error::Network`], every HTTP response (whatever its status) as
//! `Ok(RawResponse)`.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use url::Url;
use vblob_core::{Error, Result, Stage};

/// A request ready to be sent, possibly more than once
#[derive(Debug, Clone)]
pub struct BlobRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    /// Which boundary error an exhausted failure becomes
    pub stage: Stage,
}

impl BlobRequest {
    pub fn new(method: Method, url: Url, stage: Stage) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            stage,
        }
    }

    /// Add a header, rejecting values that are not valid header text
    pub fn header(mut self, name: &'static str, value: &str) -> Result<Self> {
        let value = HeaderValue::from_str(value)
            .map_err(|_| Error::Validation(format!("invalid value for header '{name}'")))?;
        self.headers.insert(HeaderName::from_static(name), value);
        Ok(self)
    }

    /// Merge a prepared header map
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    /// JSON body with matching content type
    pub fn json<T: serde::Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value)?;
        self.header("content-type", "application/json")
            .map(|req| req.body(Bytes::from(body)))
    }

    /// Short description for logs: method and path, never the query or headers
    pub fn target(&self) -> String {
        format!("{} {}", self.method, self.url.path())
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A complete HTTP response
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Server errors and rate limiting are worth another attempt
    pub fn is_transient(&self) -> bool {
        self.status == 429 || (500..600).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// One HTTP exchange
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &BlobRequest) -> Result<RawResponse>;
}

/// Production transport backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a per-attempt timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("vblob/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Classify a reqwest failure
    fn map_error(error: reqwest::Error) -> Error {
        if error.is_builder() {
            Error::Validation(format!("invalid request: {error}"))
        } else if error.is_timeout() {
            Error::Network(format!("timeout: {error}"))
        } else if error.is_connect() {
            Error::Network(format!("connection failed: {error}"))
        } else {
            Error::Network(error.to_string())
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &BlobRequest) -> Result<RawResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());

        if let Some(body) = &request.body {
            // Cheap: Bytes clones share one buffer
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(Self::map_error)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(Self::map_error)?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
