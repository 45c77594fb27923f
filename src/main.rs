//! Redis Viewer CLI

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

use redis_viewer::{logging, tui, Config, Connection, FixSuggestion, Settings, ViewerError};

#[derive(Parser)]
#[command(name = "redis-viewer")]
#[command(about = "Redis Viewer - view redis data in terminal")]
#[command(version)]
struct Cli {
    /// Config file (default is $HOME/.redis-viewer.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log file (default is <cache dir>/redis-viewer/redis-viewer.log)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(logging::default_log_path);
    let log_guard = match logging::init(&log_path) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("{} {}", "Warning:".yellow(), e);
            None
        }
    };

    let result = run(cli).await;

    if let Err(e) = result {
        tracing::error!(error = %e, "exiting");
        drop(log_guard);
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), ViewerError> {
    let config = Config::load(cli.config.as_deref())?;
    let settings = Settings::from_env(&config);
    tracing::info!(
        addrs = ?settings.addrs,
        db = settings.db,
        topology = ?settings.topology(),
        "starting"
    );

    let connection = Connection::open(&settings).await?;
    tui::run(connection, &settings).await
}
