mod commands;
mod logging;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "duesync")]
#[command(about = "Mirror deadlines from calendar feeds into a Notion database")]
struct Cli {
    /// Config file to load on top of ~/.config/duesync/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log per-event decisions (debug level)
    #[arg(short = 'v', long = "debug", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and update database records from the feeds
    Sync {
        /// Show what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Compare records due from this date (YYYY-MM-DD, default today)
        #[arg(long)]
        from: Option<String>,
    },
    /// Show pending changes without writing
    Status {
        /// Compare records due from this date (YYYY-MM-DD, default today)
        #[arg(long)]
        from: Option<String>,

        /// List every event instead of counts
        #[arg(long)]
        verbose: bool,
    },
    /// Show config paths and resolved settings
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug);

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Sync { dry_run, from } => {
            commands::sync::run(config_path, from.as_deref(), dry_run).await
        }
        Commands::Status { from, verbose } => {
            commands::status::run(config_path, from.as_deref(), verbose).await
        }
        Commands::Config => commands::config::run(config_path),
    }
}
