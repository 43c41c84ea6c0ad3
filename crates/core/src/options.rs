//! Per-call options
//!
//! Options are plain data; they are resolved against the client configuration
//! into a [`ResolvedPut`] before any request is built.

use std::fmt;

use crate::auth::resolve_token;
use crate::error::Result;
use crate::pathname::{guess_content_type, validate_pathname};
use crate::retry::RetryPolicy;

/// Default `Cache-Control: max-age` in seconds (one year)
pub const DEFAULT_CACHE_MAX_AGE: &str = "31536000";

/// Options for a put
#[derive(Debug, Clone)]
pub struct PutOptions {
    /// Ask the service to append a random suffix to the pathname.
    /// Defaults to false, so repeated puts address the same blob.
    pub add_random_suffix: bool,
    /// Overwrite an existing blob at the same pathname
    pub allow_overwrite: bool,
    /// Explicit content type; inferred from the pathname when absent
    pub content_type: Option<String>,
    /// Cache max-age in seconds
    pub cache_control_max_age: Option<String>,
    /// Force the multipart path regardless of size
    pub multipart: bool,
    /// Emit progress events
    pub verbose: bool,
    /// Token overriding the client's
    pub token: Option<String>,
    /// Retry policy overriding the client's
    pub retry: Option<RetryPolicy>,
}

impl Default for PutOptions {
    fn default() -> Self {
        Self {
            add_random_suffix: false,
            allow_overwrite: true,
            content_type: None,
            cache_control_max_age: None,
            multipart: false,
            verbose: false,
            token: None,
            retry: None,
        }
    }
}

impl PutOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_random_suffix(mut self, enabled: bool) -> Self {
        self.add_random_suffix = enabled;
        self
    }

    pub fn allow_overwrite(mut self, enabled: bool) -> Self {
        self.allow_overwrite = enabled;
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn cache_control_max_age(mut self, seconds: impl Into<String>) -> Self {
        self.cache_control_max_age = Some(seconds.into());
        self
    }

    pub fn multipart(mut self, enabled: bool) -> Self {
        self.multipart = enabled;
        self
    }

    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Validate the pathname and fill in every default.
    ///
    /// `content_source` is what the content type is inferred from: the
    /// pathname for a put, the source URL for a copy.
    pub fn resolve(
        &self,
        pathname: &str,
        content_source: &str,
        configured_token: Option<&str>,
        default_retry: &RetryPolicy,
    ) -> Result<ResolvedPut> {
        validate_pathname(pathname)?;
        let token = resolve_token(self.token.as_deref(), configured_token)?;
        let retry = self.retry.clone().unwrap_or_else(|| default_retry.clone());
        retry.validate()?;

        Ok(ResolvedPut {
            pathname: pathname.to_string(),
            token,
            content_type: self
                .content_type
                .clone()
                .unwrap_or_else(|| guess_content_type(content_source)),
            cache_control_max_age: self
                .cache_control_max_age
                .clone()
                .unwrap_or_else(|| DEFAULT_CACHE_MAX_AGE.to_string()),
            add_random_suffix: self.add_random_suffix,
            allow_overwrite: self.allow_overwrite,
            multipart: self.multipart,
            verbose: self.verbose,
            retry,
        })
    }
}

/// Put options with every default applied
#[derive(Clone)]
pub struct ResolvedPut {
    pub pathname: String,
    pub token: String,
    pub content_type: String,
    pub cache_control_max_age: String,
    pub add_random_suffix: bool,
    pub allow_overwrite: bool,
    pub multipart: bool,
    pub verbose: bool,
    pub retry: RetryPolicy,
}

// Keep the token out of logs
impl fmt::Debug for ResolvedPut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedPut")
            .field("pathname", &self.pathname)
            .field("content_type", &self.content_type)
            .field("cache_control_max_age", &self.cache_control_max_age)
            .field("add_random_suffix", &self.add_random_suffix)
            .field("allow_overwrite", &self.allow_overwrite)
            .field("multipart", &self.multipart)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

/// Options for a copy; the content type defaults to the source URL's
pub type CopyOptions = PutOptions;

/// How a list response groups nested pathnames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListMode {
    /// Every blob is listed
    #[default]
    Expanded,
    /// Blobs under a folder collapse into a single folder entry
    Folded,
}

impl ListMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListMode::Expanded => "expanded",
            ListMode::Folded => "folded",
        }
    }
}

/// Default page size for list
pub const DEFAULT_LIST_LIMIT: u32 = 1000;

/// Options for list
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub limit: u32,
    pub prefix: Option<String>,
    pub cursor: Option<String>,
    pub mode: ListMode,
    pub token: Option<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            prefix: None,
            cursor: None,
            mode: ListMode::Expanded,
            token: None,
        }
    }
}
