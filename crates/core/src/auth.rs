//! Credential resolution and request ids

use crate::error::{Error, Result};

/// Environment variable holding the read/write token
pub const TOKEN_ENV: &str = "BLOB_READ_WRITE_TOKEN";

/// Resolve the bearer token for one call.
///
/// Precedence: per-call option, client configuration, then the environment.
/// An empty string counts as absent.
pub fn resolve_token(explicit: Option<&str>, configured: Option<&str>) -> Result<String> {
    explicit
        .filter(|t| !t.is_empty())
        .or(configured.filter(|t| !t.is_empty()))
        .map(str::to_string)
        .or_else(|| std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()))
        .ok_or_else(|| {
            Error::Validation(format!(
                "no token provided: pass one explicitly or set {TOKEN_ENV}"
            ))
        })
}

/// Store id embedded in a token of the form `vercel_blob_rw_<storeId>_<secret>`
pub fn store_id(token: &str) -> &str {
    token.split('_').nth(3).unwrap_or("")
}

/// Build a request id of the form `{store_id}:{unix_millis}:{hex}`
pub fn request_id(token: &str) -> String {
    let now = jiff::Timestamp::now();
    let millis = now.as_millisecond();
    let random = (now.subsec_nanosecond() as u32) ^ (std::process::id().rotate_left(16));
    format!("{}:{millis}:{random:x}", store_id(token))
}
