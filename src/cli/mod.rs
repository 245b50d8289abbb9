//! Command-line interface: parser and dispatch.

mod changes_cmd;
mod probe;
mod run_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "cvmt")]
#[command(about = "CVM public-offering tracker")]
#[command(version)]
pub struct Cli {
    /// Data directory or table file (overrides the config file).
    /// A .csv path selects the table file directly.
    #[arg(long, short = 'd', global = true)]
    data: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from the current working directory instead of the config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh the tracking table from the feeds and detail pages
    Run {
        /// Limit the number of changed records processed this run
        #[arg(short, long)]
        limit: Option<usize>,

        /// Skip detail pages and refresh feed-sourced columns only
        #[arg(long)]
        no_scrape: bool,

        /// Reference feed CSV to reconcile against
        #[arg(short, long)]
        reference: Option<PathBuf>,

        /// Run the browser with a visible window
        #[arg(long)]
        headed: bool,
    },

    /// Show what a run would process, without touching anything
    Changes,

    /// Scrape one record and print what its page yields
    Probe {
        /// Record key to fetch
        key: u32,

        /// Run the browser with a visible window
        #[arg(long)]
        headed: bool,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
        data: cli.data,
    };
    let (mut settings, _config) = load_settings_with_options(options).await;

    match cli.command {
        Commands::Run {
            limit,
            no_scrape,
            reference,
            headed,
        } => {
            if headed {
                settings.browser.headless = false;
            }
            run_cmd::cmd_run(&settings, limit, no_scrape, reference).await
        }
        Commands::Changes => changes_cmd::cmd_changes(&settings).await,
        Commands::Probe { key, headed } => {
            if headed {
                settings.browser.headless = false;
            }
            probe::cmd_probe(&settings, key).await
        }
    }
}
