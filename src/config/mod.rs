//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, batch sizes, poll intervals)
//! - The library `Config` struct and logging option types
//! - The command-line interface definition

mod cli;
mod constants;
mod types;

// Re-export all constants
pub use cli::{AddArgs, CheckAllArgs, Cli, Command, GlobalOpts, ImportArgs, ListArgs};
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel};
