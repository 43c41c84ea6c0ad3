//! Blob client
//!
//! Holds the configuration and the retrying transport, and implements the
//! BlobStore trait from vblob-core. Uploads live in `put.rs` and
//! `multipart.rs`; the thin metadata operations live here.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use url::Url;
use vblob_core::auth::{request_id, resolve_token};
use vblob_core::pathname::file_name_from_url;
use vblob_core::{
    BlobDescriptor, BlobStore, Config, CopyOptions, Error, HeadResult, ListOptions, ListResult,
    LogProgress, Progress, ProgressListener, PutOptions, ResolvedPut, Result, Stage,
};

use crate::normalize;
use crate::retrying::RetryingTransport;
use crate::transport::{BlobRequest, ReqwestTransport, Transport};

/// Client for the blob API
#[derive(Clone)]
pub struct BlobClient {
    pub(crate) config: Config,
    base_url: Url,
    pub(crate) transport: RetryingTransport,
    listener: Arc<dyn ProgressListener>,
}

impl BlobClient {
    /// Create a client that talks HTTP through reqwest
    pub fn new(config: Config) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Default configuration plus `BLOB_READ_WRITE_TOKEN` / `VERCEL_BLOB_API_URL`
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env())
    }

    /// Create a client over any transport
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let base_url = config.api_url()?;

        tracing::debug!(api_url = %base_url, "Blob client created");

        Ok(Self {
            config,
            base_url,
            transport: RetryingTransport::new(transport),
            listener: Arc::new(LogProgress),
        })
    }

    /// Receive progress events of verbose calls
    pub fn with_listener(mut self, listener: Arc<dyn ProgressListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn progress(&self, verbose: bool) -> Progress {
        Progress::new(verbose, self.listener.clone())
    }

    pub(crate) fn resolve_put(
        &self,
        pathname: &str,
        content_source: &str,
        options: &PutOptions,
    ) -> Result<ResolvedPut> {
        options.resolve(
            pathname,
            content_source,
            self.config.token.as_deref(),
            &self.config.retry,
        )
    }

    fn token(&self, explicit: Option<&str>) -> Result<String> {
        resolve_token(explicit, self.config.token.as_deref())
    }

    /// API URL with extra path segments; each segment is percent-encoded
    pub(crate) fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("api_url '{}' cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL addressing a pathname
    pub(crate) fn blob_url(&self, pathname: &str) -> Result<Url> {
        self.endpoint(pathname.split('/'))
    }

    /// Headers every authenticated request carries
    pub(crate) fn auth_headers(&self, token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        insert_header(&mut headers, "authorization", &format!("Bearer {token}"))?;
        insert_header(&mut headers, "x-api-version", &self.config.api_version)?;
        insert_header(&mut headers, "x-api-blob-request-id", &request_id(token))?;
        Ok(headers)
    }

    /// Fetch one page of blobs
    pub async fn list(&self, options: ListOptions) -> Result<ListResult> {
        let token = self.token(options.token.as_deref())?;

        let mut url = self.endpoint([])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &options.limit.to_string());
            if let Some(prefix) = &options.prefix {
                query.append_pair("prefix", prefix);
            }
            if let Some(cursor) = &options.cursor {
                query.append_pair("cursor", cursor);
            }
            query.append_pair("mode", options.mode.as_str());
        }

        let request =
            BlobRequest::new(Method::GET, url, Stage::Request).headers(self.auth_headers(&token)?);
        let response = self
            .transport
            .execute(&request, &self.config.retry, &Progress::silent())
            .await?;
        normalize::parse(&response)
    }

    /// Fetch metadata for a blob URL
    pub async fn head(&self, blob_url: &str, token: Option<&str>) -> Result<HeadResult> {
        let token = self.token(token)?;

        let mut url = self.endpoint([])?;
        url.query_pairs_mut().append_pair("url", blob_url);

        let request =
            BlobRequest::new(Method::GET, url, Stage::Request).headers(self.auth_headers(&token)?);
        let response = self
            .transport
            .execute(&request, &self.config.retry, &Progress::silent())
            .await
            .map_err(|e| match e {
                Error::Request {
                    status: Some(404), ..
                } => Error::NotFound(blob_url.to_string()),
                other => other,
            })?;
        normalize::parse(&response)
    }

    /// Delete blobs by URL. An empty list sends nothing.
    pub async fn delete(&self, urls: &[String], token: Option<&str>) -> Result<()> {
        if urls.is_empty() {
            return Ok(());
        }
        let token = self.token(token)?;

        let request = BlobRequest::new(Method::POST, self.endpoint(["delete"])?, Stage::Request)
            .headers(self.auth_headers(&token)?)
            .json(&serde_json::json!({ "urls": urls }))?;
        self.transport
            .execute(&request, &self.config.retry, &Progress::silent())
            .await?;

        tracing::debug!(count = urls.len(), "Deleted blobs");
        Ok(())
    }

    /// Copy an existing blob to a new pathname
    pub async fn copy(
        &self,
        from_url: &str,
        to_pathname: &str,
        options: CopyOptions,
    ) -> Result<BlobDescriptor> {
        Url::parse(from_url)
            .map_err(|e| Error::Validation(format!("invalid source url '{from_url}': {e}")))?;
        let put = self.resolve_put(to_pathname, from_url, &options)?;

        let mut url = self.blob_url(&put.pathname)?;
        url.query_pairs_mut().append_pair("fromUrl", from_url);

        let request =
            BlobRequest::new(Method::PUT, url, Stage::Request).headers(self.put_headers(&put)?);
        let response = self
            .transport
            .execute(&request, &put.retry, &self.progress(put.verbose))
            .await?;
        normalize::parse(&response)
    }

    /// Download a blob into an existing directory
    pub async fn download(&self, blob_url: &str, dir: &Path) -> Result<PathBuf> {
        if !dir.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!(
                    "directory {} must exist before downloading",
                    dir.display()
                ),
            )));
        }
        let file_name = file_name_from_url(blob_url)?;

        let mut url = Url::parse(blob_url)
            .map_err(|e| Error::Validation(format!("invalid blob url '{blob_url}': {e}")))?;
        url.query_pairs_mut().append_pair("download", "1");

        let request = BlobRequest::new(Method::GET, url, Stage::Request);
        let response = self
            .transport
            .execute(&request, &self.config.retry, &Progress::silent())
            .await?;

        let path = dir.join(file_name);
        tokio::fs::write(&path, &response.body).await?;

        tracing::debug!(path = %path.display(), bytes = response.body.len(), "Downloaded blob");
        Ok(path)
    }
}

pub(crate) fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<()> {
    let value = HeaderValue::from_str(value)
        .map_err(|_| Error::Validation(format!("invalid value for header '{name}'")))?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}

#[async_trait]
impl BlobStore for BlobClient {
    async fn put(
        &self,
        pathname: &str,
        payload: Bytes,
        options: PutOptions,
    ) -> Result<BlobDescriptor> {
        BlobClient::put(self, pathname, payload, options).await
    }

    async fn list(&self, options: ListOptions) -> Result<ListResult> {
        BlobClient::list(self, options).await
    }

    async fn head(&self, url: &str, token: Option<&str>) -> Result<HeadResult> {
        BlobClient::head(self, url, token).await
    }

    async fn delete(&self, urls: &[String], token: Option<&str>) -> Result<()> {
        BlobClient::delete(self, urls, token).await
    }

    async fn copy(
        &self,
        from_url: &str,
        to_pathname: &str,
        options: CopyOptions,
    ) -> Result<BlobDescriptor> {
        BlobClient::copy(self, from_url, to_pathname, options).await
    }

    async fn download(&self, url: &str, dir: &Path) -> Result<PathBuf> {
        BlobClient::download(self, url, dir).await
    }
}
