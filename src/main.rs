//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `blacklist_monitor` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Ctrl-C handling
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;

use blacklist_monitor::{init_logger_with, run_cli, spawn_ctrl_c_handler, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // This allows setting BLACKLIST_API_URL / BLACKLIST_API_KEY in .env
    // Try loading from current directory first, then from the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();

    let log_level = cli.global.log_level.clone();
    let log_format = cli.global.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    let cancel = CancellationToken::new();
    let ctrl_c = spawn_ctrl_c_handler(cancel.clone());

    let result = run_cli(cli, cancel).await;
    ctrl_c.abort();

    if let Err(e) = result {
        eprintln!("blacklist_monitor error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
