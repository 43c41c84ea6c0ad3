//! ls command - List blobs
//!
//! Lists one page by default; `--all` follows the cursor until the listing is
//! exhausted.

use clap::Args;
use comfy_table::{Table, presets};
use serde::Serialize;
use vblob_core::{BlobStore, ListBlob, ListMode, ListOptions, Result};

use super::{Context, fail};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// List blobs
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Only list pathnames starting with this prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Page size
    #[arg(short = 'n', long, default_value = "1000")]
    pub limit: u32,

    /// Continue from a cursor returned by a previous listing
    #[arg(long)]
    pub cursor: Option<String>,

    /// Collapse nested pathnames into folders
    #[arg(long)]
    pub folded: bool,

    /// Fetch every page
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Serialize)]
struct LsOutput {
    blobs: Vec<BlobEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    folders: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<String>,
    has_more: bool,
}

#[derive(Debug, Serialize)]
struct BlobEntry {
    pathname: String,
    url: String,
    size_bytes: u64,
    size_human: String,
    uploaded_at: jiff::Timestamp,
}

impl From<ListBlob> for BlobEntry {
    fn from(blob: ListBlob) -> Self {
        Self {
            size_human: humansize::format_size(blob.size, humansize::DECIMAL),
            uploaded_at: blob.uploaded_at,
            pathname: blob.pathname,
            url: blob.url,
            size_bytes: blob.size,
        }
    }
}

/// Execute the ls command
pub async fn execute(args: LsArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    let client = match ctx.client() {
        Ok(c) => c,
        Err(e) => return fail(&formatter, "Failed to create client", &e),
    };

    match collect(&client, &args).await {
        Ok(output) => {
            print(&formatter, &output);
            ExitCode::Success
        }
        Err(e) => fail(&formatter, "Failed to list blobs", &e),
    }
}

async fn collect(store: &dyn BlobStore, args: &LsArgs) -> Result<LsOutput> {
    let mut options = ListOptions {
        limit: args.limit,
        prefix: args.prefix.clone(),
        cursor: args.cursor.clone(),
        mode: if args.folded {
            ListMode::Folded
        } else {
            ListMode::Expanded
        },
        token: None,
    };

    let mut output = LsOutput {
        blobs: Vec::new(),
        folders: Vec::new(),
        cursor: None,
        has_more: false,
    };

    loop {
        let page = store.list(options.clone()).await?;
        let stalled = page.cursor.is_some() && page.cursor == options.cursor;
        output.blobs.extend(page.blobs.into_iter().map(BlobEntry::from));
        output.folders.extend(page.folders);
        output.cursor = page.cursor;
        output.has_more = page.has_more;

        if !args.all || !output.has_more || output.cursor.is_none() {
            break;
        }
        if stalled {
            tracing::warn!(cursor = ?output.cursor, "Listing cursor did not advance; stopping");
            break;
        }
        options.cursor = output.cursor.clone();
    }

    Ok(output)
}

fn print(formatter: &Formatter, output: &LsOutput) {
    if formatter.is_json() {
        formatter.json(output);
        return;
    }

    if output.blobs.is_empty() && output.folders.is_empty() {
        formatter.println("No blobs found.");
        return;
    }

    for folder in &output.folders {
        formatter.println(&formatter.style_folder(folder));
    }

    if !output.blobs.is_empty() {
        let mut table = Table::new();
        table.load_preset(presets::NOTHING);
        table.set_header(vec!["SIZE", "UPLOADED", "PATHNAME"]);
        for blob in &output.blobs {
            table.add_row(vec![
                blob.size_human.clone(),
                blob.uploaded_at.strftime("%Y-%m-%d %H:%M:%S").to_string(),
                blob.pathname.clone(),
            ]);
        }
        formatter.println(&table.to_string());
    }

    if output.has_more
        && let Some(cursor) = &output.cursor
    {
        formatter.println(&format!("\nMore results: --cursor {cursor}"));
    }
}
