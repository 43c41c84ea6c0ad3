//! cp command - Copy a blob to a new pathname
//!
//! The copy happens on the server; no data passes through this machine.

use clap::Args;
use vblob_core::CopyOptions;

use super::{Context, fail};
use crate::exit_code::ExitCode;

/// Copy a blob to a new pathname
#[derive(Args, Debug)]
pub struct CpArgs {
    /// URL of the blob to copy
    pub from_url: String,

    /// Destination pathname
    pub to_pathname: String,

    /// Append a random suffix to the destination pathname
    #[arg(long)]
    pub random_suffix: bool,

    /// Fail instead of overwriting an existing blob
    #[arg(long)]
    pub no_overwrite: bool,

    /// Content type (inferred from the source URL by default)
    #[arg(long)]
    pub content_type: Option<String>,
}

/// Execute the cp command
pub async fn execute(args: CpArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    let client = match ctx.client() {
        Ok(c) => c,
        Err(e) => return fail(&formatter, "Failed to create client", &e),
    };

    let mut options = CopyOptions::new()
        .add_random_suffix(args.random_suffix)
        .allow_overwrite(!args.no_overwrite);
    if let Some(content_type) = &args.content_type {
        options = options.content_type(content_type);
    }

    match client.copy(&args.from_url, &args.to_pathname, options).await {
        Ok(blob) => {
            if formatter.is_json() {
                formatter.json(&blob);
            } else {
                formatter.success(&format!("Copied to {}", blob.pathname));
                formatter.println(&formatter.style_url(&blob.url));
            }
            ExitCode::Success
        }
        Err(e) => fail(&formatter, "Copy failed", &e),
    }
}
