//! Pathname rules and content-type inference

use crate::error::{Error, Result};

/// Longest pathname the service accepts
pub const MAX_PATHNAME_LENGTH: usize = 950;

const DISALLOWED_SEQUENCES: &[&str] = &["//"];

/// Fallback when the extension is unknown
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Check a destination pathname before any request is built
pub fn validate_pathname(pathname: &str) -> Result<()> {
    if pathname.is_empty() {
        return Err(Error::Validation("pathname is required".into()));
    }

    if pathname.chars().count() > MAX_PATHNAME_LENGTH {
        return Err(Error::Validation(format!(
            "pathname is too long, maximum length is {MAX_PATHNAME_LENGTH}"
        )));
    }

    for seq in DISALLOWED_SEQUENCES {
        if pathname.contains(seq) {
            return Err(Error::Validation(format!(
                "pathname cannot contain \"{seq}\", please encode it if needed"
            )));
        }
    }

    Ok(())
}

/// Guess a MIME type from a pathname or URL
pub fn guess_content_type(path: &str) -> String {
    // Query strings and fragments would hide the extension
    let path = path.split(['?', '#']).next().unwrap_or(path);
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

/// Last path segment of a blob URL, used as the local file name on download
pub fn file_name_from_url(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url)
        .map_err(|e| Error::Validation(format!("invalid blob url '{url}': {e}")))?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::Validation(format!("blob url '{url}' has no file name")))
}
