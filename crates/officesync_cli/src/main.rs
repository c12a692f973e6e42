//! OfficeSync CLI
//!
//! Command-line tools driving the sync engine. Commands run against the
//! hosted REST backend when `OFFICESYNC_URL` and `OFFICESYNC_API_KEY` are
//! set, and against a local JSON file otherwise.
//!
//! # Commands
//!
//! - `seed` - Load the backend, or write the starter office if it is empty
//! - `load` - Show what startup would hydrate
//! - `inspect` - Display per-table row counts
//! - `simulate-drag` - Drag an avatar and report the resulting writes

mod commands;
mod file_backend;
mod http_client;

use clap::{Parser, Subcommand};
use commands::simulate_drag::DragOptions;
use commands::{CommandResult, Format};
use file_backend::FileBackend;
use http_client::ReqwestClient;
use officesync_engine::{Backend, RestBackend, RestConfig, SyncConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// OfficeSync command-line tools.
#[derive(Parser)]
#[command(name = "officesync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the backend JSON file, used when no REST backend is configured
    #[arg(global = true, short, long, default_value = "officesync.json")]
    path: PathBuf,

    /// Run without a backend: nothing is read or written
    #[arg(global = true, long)]
    offline: bool,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the backend, or seed it with the starter office
    Seed {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show what startup would hydrate
    Load {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Display per-table row counts
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Drag an avatar and report the resulting writes
    SimulateDrag {
        /// Avatar id (defaults to the first avatar)
        #[arg(short, long)]
        avatar: Option<String>,

        /// Number of moves
        #[arg(short, long, default_value = "50")]
        steps: usize,

        /// Milliseconds between moves
        #[arg(short, long, default_value = "38")]
        interval_ms: u64,

        /// Position tier settle window in milliseconds
        #[arg(long, default_value = "2000")]
        window_ms: u64,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if matches!(cli.command, Commands::Version) {
        println!("{}", version());
        return Ok(());
    }

    let config = if cli.offline {
        SyncConfig::disabled()
    } else {
        SyncConfig::new()
    };

    let output = match RestConfig::from_env().filter(|_| !cli.offline) {
        Some(rest) => {
            info!(url = %rest.base_url, "using REST backend");
            let backend = Arc::new(RestBackend::new(rest, ReqwestClient::new()?));
            execute(cli.command, backend, config, None).await?
        }
        None => {
            let backend = Arc::new(FileBackend::open(&cli.path)?);
            execute(cli.command, Arc::clone(&backend), config, Some(backend.as_ref())).await?
        }
    };

    println!("{output}");
    Ok(())
}

fn version() -> String {
    format!("OfficeSync CLI v{}", env!("CARGO_PKG_VERSION"))
}

/// Runs a command against `backend`. `file` is set when the backend is
/// the local JSON file.
async fn execute<B: Backend>(
    command: Commands,
    backend: Arc<B>,
    config: SyncConfig,
    file: Option<&FileBackend>,
) -> CommandResult<String> {
    match command {
        Commands::Seed { format } => {
            commands::seed::run(backend.as_ref(), &config, Format::parse(&format)?).await
        }
        Commands::Load { format } => {
            commands::load::run(backend.as_ref(), &config, Format::parse(&format)?).await
        }
        Commands::Inspect { format } => {
            let file = file.ok_or("inspect reads the backend file; unset OFFICESYNC_URL")?;
            commands::inspect::run(file, Format::parse(&format)?)
        }
        Commands::SimulateDrag {
            avatar,
            steps,
            interval_ms,
            window_ms,
            format,
        } => {
            let options = DragOptions {
                avatar,
                steps,
                interval: Duration::from_millis(interval_ms),
                ..DragOptions::default()
            };
            let config = config.with_position_window(Duration::from_millis(window_ms));
            commands::simulate_drag::run(backend, config, &options, Format::parse(&format)?).await
        }
        Commands::Version => Ok(version()),
    }
}
