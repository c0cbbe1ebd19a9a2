//! Logger initialization.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::{Level, LevelFilter, Record};

/// Crates whose debug output drowns out ours.
const QUIET_MODULES: [(&str, LevelFilter); 5] = [
    ("reqwest", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
    ("hyper_util", LevelFilter::Info),
    ("rustls", LevelFilter::Warn),
    ("tower_http", LevelFilter::Info),
];

/// Initializes `env_logger` with the given level and output format.
///
/// `RUST_LOG` is read first, so per-module directives keep working, but
/// `level` wins for this crate and as the global default:
///
/// ```bash
/// RUST_LOG=blacklist_monitor::job=debug blacklist_monitor check-all
/// ```
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for (module, filter) in QUIET_MODULES {
        builder.filter_module(module, filter);
    }
    builder.filter_module("blacklist_monitor", level);

    match format {
        LogFormat::Json => builder.format(|buf, record| {
            writeln!(
                buf,
                "{}",
                json_line(chrono::Utc::now().timestamp_millis(), record)
            )
        }),
        LogFormat::Plain => builder.format(|buf, record| writeln!(buf, "{}", plain_line(record))),
    };

    builder.try_init().map_err(InitializationError::from)?;
    Ok(())
}

/// One log record as a single-line JSON object.
fn json_line(ts_millis: i64, record: &Record) -> String {
    serde_json::json!({
        "ts": ts_millis,
        "level": record.level().as_str(),
        "target": record.target(),
        "msg": record.args().to_string(),
    })
    .to_string()
}

fn plain_line(record: &Record) -> String {
    let level = record.level();
    let (marker, painted) = match level {
        Level::Error => ("❌", level.as_str().red()),
        Level::Warn => ("⚠️", level.as_str().yellow()),
        Level::Info => ("✔️", level.as_str().green()),
        Level::Debug => ("🔍", level.as_str().blue()),
        Level::Trace => ("🔬", level.as_str().purple()),
    };
    format!(
        "{} {} [{}] {}",
        marker,
        record.target().cyan(),
        painted,
        record.args()
    )
}
