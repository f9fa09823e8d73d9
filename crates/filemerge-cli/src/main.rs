//! Filemerge CLI - Command-line interface for filemerge
//!
//! Provides commands for:
//! - Running a merge over the configured dataset roots
//! - Viewing and validating configuration
//! - Generating shell completions

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    completions::CompletionsCommand, config::ConfigCommand, run::RunCommand,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "filemerge", version, about = "Consolidate dataset directories by majority vote")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Merge all datasets into the output directory
    Run(RunCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let filter = match (cli.quiet, cli.verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    let config_path = cli.config.as_deref().map(std::path::PathBuf::from);

    match cli.command {
        Commands::Run(cmd) => cmd.execute(format, config_path.as_deref()).await,
        Commands::Config(cmd) => cmd.execute(format, config_path.as_deref()).await,
        Commands::Completions(cmd) => cmd.execute(format).await,
    }
}
