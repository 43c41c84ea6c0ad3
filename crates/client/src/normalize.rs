//! Response normalization
//!
//! Turns raw responses into typed results. Success bodies must carry every
//! expected field; error bodies are matched against the service's
//! `{"error": {"code", "message"}}` shape (a flat `{"code", "message"}` is
//! accepted too). Anything unrecognized falls back to the stage's error with
//! the raw status and body text.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use vblob_core::{Error, Result, Stage};

use crate::transport::RawResponse;

/// Session handle returned by multipart create
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipartCreated {
    pub key: String,
    pub upload_id: String,
}

/// Part acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PartUploaded {
    pub etag: String,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Nested { error: ErrorDetail },
    Flat(ErrorDetail),
}

impl ErrorBody {
    fn into_detail(self) -> ErrorDetail {
        match self {
            ErrorBody::Nested { error } => error,
            ErrorBody::Flat(detail) => detail,
        }
    }
}

/// Decode a success body into `T`
pub fn parse<T: DeserializeOwned>(response: &RawResponse) -> Result<T> {
    serde_json::from_slice(&response.body).map_err(|e| {
        Error::Parse(format!(
            "{e} (status {}, body: {})",
            response.status,
            truncate(&response.text(), 200)
        ))
    })
}

/// Map a non-success response to a typed error
pub fn error_from_response(response: &RawResponse, stage: Stage) -> Error {
    let body = response.text();
    let detail = serde_json::from_slice::<ErrorBody>(&response.body)
        .ok()
        .map(ErrorBody::into_detail);

    match detail {
        Some(detail) => match detail.code.as_str() {
            "forbidden" | "unauthorized" | "store_suspended" | "client_token_expired" => {
                Error::Auth(describe(&detail))
            }
            "not_found" | "store_not_found" | "blob_not_found" => {
                Error::NotFound(describe(&detail))
            }
            _ if is_auth_status(response.status) => Error::Auth(describe(&detail)),
            _ => Error::for_stage(stage, Some(response.status), describe(&detail)),
        },
        None if is_auth_status(response.status) => Error::Auth(format!(
            "request rejected with status {}",
            response.status
        )),
        None => Error::for_stage(stage, Some(response.status), body),
    }
}

fn is_auth_status(status: u16) -> bool {
    status == 401 || status == 403
}

fn describe(detail: &ErrorDetail) -> String {
    if detail.message.is_empty() {
        detail.code.clone()
    } else {
        format!("{}: {}", detail.code, detail.message)
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
