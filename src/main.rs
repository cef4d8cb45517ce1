//! tuidash - terminal dashboard
//!
//! Usage:
//!   tuidash [OPTIONS]
//!
//! Examples:
//!   tuidash                              # Defaults plus ./tuidash.toml if present
//!   tuidash --config ~/dash.toml
//!   tuidash --columns 3 --log-level debug
//!
//! Logs go to a file (the terminal is owned by the dashboard).

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;
use tuidash_core::{
    config::DashboardConfig,
    tui::{run_app, spawn_input_pump, Dashboard, Scheduler, TerminalConfig, TerminalManager},
};

/// How often the input thread wakes up to notice shutdown
const INPUT_POLL: Duration = Duration::from_millis(250);

/// Dashboard CLI arguments
#[derive(Parser, Debug)]
#[command(name = "tuidash")]
#[command(about = "Terminal dashboard of independently refreshing panels")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = "TUIDASH_CONFIG")]
    config: Option<PathBuf>,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Column count on wide terminals
    #[arg(long)]
    columns: Option<u16>,
}

fn default_log_file() -> PathBuf {
    std::env::temp_dir().join("tuidash.log")
}

/// File logging; `RUST_LOG` wins over `--log-level`
fn init_logging(args: &Args) -> Result<()> {
    let path = args.log_file.clone().unwrap_or_else(default_log_file);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let level = match args.log_level.to_lowercase().as_str() {
        level @ ("trace" | "debug" | "info" | "warn" | "error") => level.to_string(),
        _ => "info".to_string(),
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tuidash={level},tuidash_core={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    debug!("tuidash v{} starting", env!("CARGO_PKG_VERSION"));

    let mut cfg =
        DashboardConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(columns) = args.columns {
        cfg.layout.columns = columns.max(1);
    }
    debug!("Configuration: {:?}", cfg);

    let mut dashboard = Dashboard::from_config(&cfg, |key| std::env::var(key).ok());
    let (scheduler, mut rx) = Scheduler::channel();

    let mut session = TerminalManager::new(TerminalConfig::default())
        .context("failed to start terminal session")?;
    spawn_input_pump(scheduler.sender(), INPUT_POLL);

    let result = run_app(session.terminal_mut(), &mut dashboard, &scheduler, &mut rx).await;

    session.restore().context("failed to restore terminal")?;

    match result {
        Ok(exit) => {
            debug!("Dashboard exiting cleanly ({:?})", exit);
            Ok(())
        }
        Err(err) => {
            error!("Dashboard failed: {}", err);
            Err(err.into())
        }
    }
}
