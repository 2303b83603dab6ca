mod commands;
mod config;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "eventbuddy")]
#[command(about = "Sync your event feed and back up your events and friends")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the remote feed into the local store
    Sync {
        /// Feed document to sync from (overrides the configured feed)
        #[arg(short, long)]
        feed: Option<PathBuf>,
    },
    /// Export everything into a portable backup package
    Export {
        /// Directory to create the package in (defaults to the current directory)
        #[arg(short, long)]
        to: Option<PathBuf>,
    },
    /// Restore a backup package (or its JSON file)
    Import {
        /// Package directory or eventbuddy_backup.json path
        source: PathBuf,
    },
    /// Show store contents, seed state and upcoming events
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = config::Config::load()?;

    match cli.command {
        Commands::Sync { feed } => commands::sync::run(&config, feed).await,
        Commands::Export { to } => commands::export::run(&config, to),
        Commands::Import { source } => commands::import::run(&config, &source),
        Commands::Status => commands::status::run(&config),
    }
}
