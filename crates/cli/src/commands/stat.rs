//! stat command - Show blob metadata

use clap::Args;
use vblob_core::HeadResult;

use super::{Context, fail};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Show blob metadata
#[derive(Args, Debug)]
pub struct StatArgs {
    /// Blob URL
    pub url: String,
}

/// Execute the stat command
pub async fn execute(args: StatArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    let client = match ctx.client() {
        Ok(c) => c,
        Err(e) => return fail(&formatter, "Failed to create client", &e),
    };

    match client.head(&args.url, None).await {
        Ok(head) => {
            if formatter.is_json() {
                formatter.json(&head);
            } else {
                for (key, value) in fields(&formatter, &head) {
                    formatter.println(&format!("{} {value}", formatter.style_key(&format!("{key:<13}"))));
                }
            }
            ExitCode::Success
        }
        Err(e) => fail(&formatter, "Failed to stat blob", &e),
    }
}

fn fields(formatter: &Formatter, head: &HeadResult) -> Vec<(&'static str, String)> {
    vec![
        ("Pathname:", head.pathname.clone()),
        ("URL:", formatter.style_url(&head.url)),
        ("Download URL:", formatter.style_url(&head.download_url)),
        (
            "Size:",
            formatter.style_size(&format!(
                "{} ({} bytes)",
                humansize::format_size(head.size, humansize::DECIMAL),
                head.size
            )),
        ),
        ("Uploaded:", formatter.style_date(&head.uploaded_at.to_string())),
        ("Content-Type:", head.content_type.clone()),
        ("Disposition:", head.content_disposition.clone()),
        ("Cache:", head.cache_control.clone()),
    ]
}
