//! rm command - Delete blobs

use clap::Args;
use serde::Serialize;

use super::{Context, fail};
use crate::exit_code::ExitCode;

/// Delete blobs
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Blob URLs to delete
    #[arg(required = true, num_args = 1..)]
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RmOutput {
    deleted: Vec<String>,
    count: usize,
}

/// Execute the rm command
pub async fn execute(args: RmArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    let client = match ctx.client() {
        Ok(c) => c,
        Err(e) => return fail(&formatter, "Failed to create client", &e),
    };

    match client.delete(&args.urls, None).await {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&RmOutput {
                    count: args.urls.len(),
                    deleted: args.urls,
                });
            } else {
                for url in &args.urls {
                    formatter.println(&format!("Removed: {}", formatter.style_url(url)));
                }
                formatter.success(&format!("Deleted {} blob(s)", args.urls.len()));
            }
            ExitCode::Success
        }
        Err(e) => fail(&formatter, "Failed to delete blobs", &e),
    }
}
