//! Command definitions and dispatch

use clap::{Parser, Subcommand};
use vblob_client::BlobClient;
use vblob_core::{ConfigManager, Error};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

pub mod completions;
pub mod cp;
pub mod get;
pub mod ls;
pub mod put;
pub mod rm;
pub mod stat;

/// vb - command-line client for Vercel Blob storage
#[derive(Parser, Debug)]
#[command(name = "vb", version, about, long_about = None)]
pub struct Cli {
    /// Output JSON instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress everything except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Read/write token for the blob store
    #[arg(long, global = true, env = "BLOB_READ_WRITE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a file
    Put(put::PutArgs),

    /// List blobs
    Ls(ls::LsArgs),

    /// Show blob metadata
    Stat(stat::StatArgs),

    /// Delete blobs
    Rm(rm::RmArgs),

    /// Copy a blob to a new pathname
    Cp(cp::CpArgs),

    /// Download a blob
    Get(get::GetArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Settings every command receives
#[derive(Debug, Clone)]
pub struct Context {
    pub output: OutputConfig,
    pub token: Option<String>,
}

impl Context {
    /// Load the configuration file and build a client from it
    pub fn client(&self) -> Result<BlobClient, Error> {
        let mut config = ConfigManager::new()?.load()?;
        if let Some(token) = self.token.as_ref().filter(|t| !t.is_empty()) {
            config.token = Some(token.clone());
        }
        BlobClient::new(config)
    }

    pub fn formatter(&self) -> Formatter {
        Formatter::new(self.output)
    }
}

/// Run the selected command
pub async fn execute(cli: Cli) -> ExitCode {
    let ctx = Context {
        output: OutputConfig {
            json: cli.json,
            no_color: cli.no_color,
            quiet: cli.quiet,
        },
        token: cli.token,
    };

    match cli.command {
        Commands::Put(args) => put::execute(args, &ctx).await,
        Commands::Ls(args) => ls::execute(args, &ctx).await,
        Commands::Stat(args) => stat::execute(args, &ctx).await,
        Commands::Rm(args) => rm::execute(args, &ctx).await,
        Commands::Cp(args) => cp::execute(args, &ctx).await,
        Commands::Get(args) => get::execute(args, &ctx).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

/// Report `error` and pick the matching exit code
pub(crate) fn fail(formatter: &Formatter, context: &str, error: &Error) -> ExitCode {
    tracing::debug!(?error, "{context}");
    formatter.error(&format!("{context}: {error}"));
    ExitCode::from(error)
}
