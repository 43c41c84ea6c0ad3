//! vblob-client: HTTP client for the Vercel Blob API
//!
//! This crate implements the `BlobStore` trait from vblob-core on top of
//! reqwest. Every request goes through a retrying transport; large payloads
//! are uploaded as multipart sessions with bounded part concurrency.

pub mod client;
mod multipart;
pub mod normalize;
mod put;
pub mod retrying;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use client::BlobClient;
pub use retrying::RetryingTransport;
pub use transport::{BlobRequest, RawResponse, ReqwestTransport, Transport};
