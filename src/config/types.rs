//! Configuration types.
//!
//! This module defines the logging enums shared by the CLI and the library,
//! and the library-level `Config` struct.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    DEFAULT_API_URL, DEFAULT_CREDENTIALS_PATH, IMPORT_BATCH_DELAY_MS, IMPORT_BATCH_SIZE,
    JOB_POLL_INTERVAL_MS, REQUEST_TIMEOUT_SECS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use blacklist_monitor::Config;
///
/// let config = Config {
///     api_url: "http://localhost:8000/api/v1".to_string(),
///     import_batch_size: 50,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL, including the `/api/v1` prefix
    pub api_url: String,

    /// Where the API key is persisted between runs
    pub credentials_path: PathBuf,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// Addresses per bulk-add request
    pub import_batch_size: usize,

    /// Pause between import batches in milliseconds
    pub import_batch_delay_ms: u64,

    /// Interval between check-all status polls in milliseconds
    pub poll_interval_ms: u64,

    /// Local status server port (optional, disabled by default)
    pub status_port: Option<u16>,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            timeout_seconds: REQUEST_TIMEOUT_SECS,
            import_batch_size: IMPORT_BATCH_SIZE,
            import_batch_delay_ms: IMPORT_BATCH_DELAY_MS,
            poll_interval_ms: JOB_POLL_INTERVAL_MS,
            status_port: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn import_batch_delay(&self) -> Duration {
        Duration::from_millis(self.import_batch_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.api_url, "https://blacklistapi.atoztester.com/api/v1");
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.import_batch_size, 100);
        assert_eq!(config.import_batch_delay(), Duration::from_millis(100));
        assert_eq!(config.poll_interval(), Duration::from_millis(1000));
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.status_port.is_none());
        assert_eq!(
            config.credentials_path,
            PathBuf::from("./.blacklist_monitor_key")
        );
    }
}
