//! BlobStore trait definition
//!
//! Backend-independent surface of a blob client. The CLI only talks to this
//! trait, so commands can be exercised against any implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::options::{CopyOptions, ListOptions, PutOptions};
use crate::types::{BlobDescriptor, HeadResult, ListResult};

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload a payload, choosing single-shot or multipart
    async fn put(&self, pathname: &str, payload: Bytes, options: PutOptions)
    -> Result<BlobDescriptor>;

    /// List one page of blobs
    async fn list(&self, options: ListOptions) -> Result<ListResult>;

    /// Fetch metadata for a blob URL
    async fn head(&self, url: &str, token: Option<&str>) -> Result<HeadResult>;

    /// Delete blobs by URL
    async fn delete(&self, urls: &[String], token: Option<&str>) -> Result<()>;

    /// Copy a blob to a new pathname
    async fn copy(
        &self,
        from_url: &str,
        to_pathname: &str,
        options: CopyOptions,
    ) -> Result<BlobDescriptor>;

    /// Download a blob into `dir`, returning the written file path.
    /// Blob URLs are public; no token is sent.
    async fn download(&self, url: &str, dir: &Path) -> Result<PathBuf>;
}
