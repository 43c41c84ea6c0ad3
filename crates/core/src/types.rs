//! Blob metadata returned by the service
//!
//! Field names follow the service's camelCase JSON.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result of a successful put or copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobDescriptor {
    pub pathname: String,
    pub url: String,
    pub download_url: String,
    pub content_type: String,
    pub content_disposition: String,
}

impl fmt::Display for BlobDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.pathname, self.url)
    }
}

/// One entry of a list response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBlob {
    pub url: String,
    pub download_url: String,
    pub pathname: String,
    pub size: u64,
    pub uploaded_at: Timestamp,
}

/// A page of blobs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult {
    pub blobs: Vec<ListBlob>,
    /// Folder prefixes, only populated in folded mode
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub folders: Vec<String>,
    /// Cursor for the next page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    pub has_more: bool,
}

/// Metadata of a single blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadResult {
    pub url: String,
    pub download_url: String,
    pub pathname: String,
    pub size: u64,
    pub uploaded_at: Timestamp,
    pub content_type: String,
    pub content_disposition: String,
    pub cache_control: String,
}

/// A part accepted by the service during a multipart upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartResult {
    /// 1-indexed, assigned in split order
    pub part_number: u32,
    pub etag: String,
    #[serde(skip)]
    pub size: u64,
}
