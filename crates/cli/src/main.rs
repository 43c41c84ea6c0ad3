//! vb - command-line client for Vercel Blob storage
//!
//! Upload, list, inspect, copy, download and delete blobs. Every command
//! supports `--json` for scripting; exit codes are stable (see `exit_code`).

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_code;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;

    let code = commands::execute(cli).await;
    std::process::exit(code.as_i32());
}

/// Log to stderr. `RUST_LOG` wins over `--debug`.
fn init_tracing(debug: bool) -> Result<()> {
    let default = if debug {
        "vblob_core=debug,vblob_client=debug,vb=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))?;
    Ok(())
}
