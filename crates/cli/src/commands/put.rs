//! put command - Upload a file
//!
//! Small files go up in one request; large files (or `--multipart`) are split
//! into parts that upload concurrently.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use clap::Args;
use vblob_core::{ProgressListener, PutOptions};

use super::{Context, fail};
use crate::exit_code::ExitCode;
use crate::output::{BarProgress, EventLines};

/// Upload a file
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Local file to upload
    pub file: PathBuf,

    /// Destination pathname (defaults to the file name)
    pub pathname: Option<String>,

    /// Force a multipart upload regardless of size
    #[arg(long)]
    pub multipart: bool,

    /// Append a random suffix to the pathname
    #[arg(long)]
    pub random_suffix: bool,

    /// Fail instead of overwriting an existing blob
    #[arg(long)]
    pub no_overwrite: bool,

    /// Content type (inferred from the pathname by default)
    #[arg(long)]
    pub content_type: Option<String>,

    /// Cache max-age in seconds
    #[arg(long, value_name = "SECONDS")]
    pub cache_max_age: Option<u64>,

    /// Show retries and upload progress
    #[arg(short, long)]
    pub verbose: bool,
}

/// Execute the put command
pub async fn execute(args: PutArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    let pathname = match destination_pathname(&args.file, args.pathname.as_deref()) {
        Ok(p) => p,
        Err(e) => {
            formatter.error(&e);
            return ExitCode::UsageError;
        }
    };

    let payload = match tokio::fs::read(&args.file).await {
        Ok(data) => Bytes::from(data),
        Err(e) => {
            formatter.error(&format!("Failed to read {}: {e}", args.file.display()));
            return ExitCode::UsageError;
        }
    };
    let size = payload.len() as u64;

    let client = match ctx.client() {
        Ok(c) => c,
        Err(e) => return fail(&formatter, "Failed to create client", &e),
    };

    let bar = (args.verbose && ctx.output.show_progress()).then(|| Arc::new(BarProgress::new(size)));
    let client = match (&bar, args.verbose && !ctx.output.quiet) {
        (Some(bar), _) => client.with_listener(bar.clone()),
        (None, true) => client.with_listener(Arc::new(EventLines) as Arc<dyn ProgressListener>),
        (None, false) => client,
    };

    let result = client.put(&pathname, payload, put_options(&args)).await;
    if let Some(bar) = &bar {
        bar.finish();
    }

    match result {
        Ok(blob) => {
            if formatter.is_json() {
                formatter.json(&blob);
            } else {
                formatter.success(&format!(
                    "Uploaded {} ({})",
                    blob.pathname,
                    humansize::format_size(size, humansize::DECIMAL)
                ));
                formatter.println(&formatter.style_url(&blob.url));
            }
            ExitCode::Success
        }
        Err(e) => fail(&formatter, "Upload failed", &e),
    }
}

fn put_options(args: &PutArgs) -> PutOptions {
    let mut options = PutOptions::new()
        .multipart(args.multipart)
        .add_random_suffix(args.random_suffix)
        .allow_overwrite(!args.no_overwrite)
        .verbose(args.verbose);
    if let Some(content_type) = &args.content_type {
        options = options.content_type(content_type);
    }
    if let Some(seconds) = args.cache_max_age {
        options = options.cache_control_max_age(seconds.to_string());
    }
    options
}

/// The explicit pathname, else the file's own name
fn destination_pathname(file: &Path, pathname: Option<&str>) -> Result<String, String> {
    if let Some(pathname) = pathname {
        return Ok(pathname.to_string());
    }
    file.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| format!("Cannot derive a pathname from '{}'", file.display()))
}
