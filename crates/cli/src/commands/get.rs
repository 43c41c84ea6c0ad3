//! get command - Download a blob

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use super::{Context, fail};
use crate::exit_code::ExitCode;

/// Download a blob
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Blob URL
    pub url: String,

    /// Directory to write into (must exist)
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

#[derive(Debug, Serialize)]
struct GetOutput {
    url: String,
    path: String,
}

/// Execute the get command
pub async fn execute(args: GetArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    let client = match ctx.client() {
        Ok(c) => c,
        Err(e) => return fail(&formatter, "Failed to create client", &e),
    };

    match client.download(&args.url, &args.dir).await {
        Ok(path) => {
            if formatter.is_json() {
                formatter.json(&GetOutput {
                    url: args.url,
                    path: path.display().to_string(),
                });
            } else {
                formatter.success(&format!("Saved {}", path.display()));
            }
            ExitCode::Success
        }
        Err(e) => fail(&formatter, "Download failed", &e),
    }
}
