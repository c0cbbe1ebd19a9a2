//! Command-line interface definition.
//!
//! The CLI is parsed by `clap` from the field attributes below. Global options
//! configure the connection and logging; each subcommand maps onto one backend
//! operation or workflow.
//!
//! # Examples
//!
//! ```bash
//! # Store and verify an API key
//! blacklist_monitor login sk_live_123
//!
//! # Import addresses from a CSV file, tagging all of them
//! blacklist_monitor import ips.csv --tag production --tag mail
//!
//! # Start a check-all job and follow it to completion
//! blacklist_monitor check-all
//!
//! # Re-attach to a job started elsewhere
//! blacklist_monitor check-all --resume
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::constants::{
    API_KEY_ENV, API_URL_ENV, DEFAULT_API_URL, DEFAULT_CREDENTIALS_PATH, DEFAULT_PAGE_SIZE,
    HOSTNAMES_PAGE_SIZE, IMPORT_BATCH_DELAY_MS, IMPORT_BATCH_SIZE, JOB_POLL_INTERVAL_MS,
    MIN_POLL_INTERVAL_MS, REQUEST_TIMEOUT_SECS,
};
use crate::config::types::{Config, LogFormat, LogLevel};

#[derive(Debug, Parser)]
#[command(
    name = "blacklist_monitor",
    about = "Manage monitored IP addresses and DNSBL checks on an IP Blacklist Monitor backend.",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend base URL (including /api/v1)
    #[arg(long, global = true, env = API_URL_ENV, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// API key; overrides the stored credential for this invocation
    #[arg(long, global = true, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// File the API key is stored in after `login`
    #[arg(long, global = true, default_value = DEFAULT_CREDENTIALS_PATH)]
    pub credentials_file: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = REQUEST_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Serve live import/job progress as JSON on 127.0.0.1:<port>/status
    #[arg(long, global = true)]
    pub status_port: Option<u16>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store an API key and verify it against the backend
    Login {
        /// API key (read from stdin when omitted)
        api_key: Option<String>,
    },
    /// Forget the stored API key
    Logout,
    /// Backend liveness check
    Health,
    /// List monitored addresses
    List(ListArgs),
    /// List addresses with their ISP and reverse DNS name
    Hostnames {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = HOSTNAMES_PAGE_SIZE)]
        limit: u32,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one address
    Show { ip: String },
    /// Add one address
    Add(AddArgs),
    /// Update name, description or tags of an address
    Update(AddArgs),
    /// Stop monitoring an address
    Delete { ip: String },
    /// Run an immediate DNSBL check for one address
    Check { ip: String },
    /// Run immediate DNSBL checks for several addresses
    BulkCheck {
        #[arg(required = true)]
        ips: Vec<String>,
    },
    /// Show check history of an address
    History {
        ip: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: u32,
    },
    /// Mute notifications for an address
    Mute { ip: String },
    /// Unmute notifications for an address
    Unmute { ip: String },
    /// Bulk-import addresses from a text/CSV file ("-" for stdin)
    Import(ImportArgs),
    /// Start (or resume, or cancel) a background check of all addresses
    CheckAll(CheckAllArgs),
    /// Show the currently active check-all job, if any
    Job,
    /// Aggregate statistics
    Stats {
        /// Write the statistics as CSV to this file (or a dated file inside this directory)
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Recent activity feed
    Activity {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Send a test notification through the configured webhook
    WebhookTest,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub limit: u32,
    /// Free-text search on address, name and description
    #[arg(long)]
    pub search: Option<String>,
    /// clean|blacklisted|pending
    #[arg(long)]
    pub status: Option<String>,
    /// Only addresses carrying this tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    #[arg(long)]
    pub sort_by: Option<String>,
    /// asc|desc
    #[arg(long)]
    pub sort_order: Option<String>,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    pub ip: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Tag to attach (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Input file: one address per line or `;`-separated, optionally `ip,name,description`
    pub file: PathBuf,
    /// Tag applied to every imported address (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Addresses per request
    #[arg(long, default_value_t = IMPORT_BATCH_SIZE)]
    pub batch_size: usize,
    /// Pause between requests in milliseconds
    #[arg(long, default_value_t = IMPORT_BATCH_DELAY_MS)]
    pub batch_delay_ms: u64,
    /// Only parse and report what would be imported
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct CheckAllArgs {
    /// Follow a job that is already running instead of starting one
    #[arg(long, conflicts_with = "cancel")]
    pub resume: bool,
    /// Cancel the currently running job
    #[arg(long)]
    pub cancel: bool,
    /// Start the job and return without waiting for completion
    #[arg(long, conflicts_with_all = ["resume", "cancel"])]
    pub no_wait: bool,
    /// Interval between status polls in milliseconds
    #[arg(
        long,
        default_value_t = JOB_POLL_INTERVAL_MS,
        value_parser = clap::value_parser!(u64).range(MIN_POLL_INTERVAL_MS..)
    )]
    pub poll_interval_ms: u64,
}

impl Cli {
    /// Builds the library configuration from the parsed arguments.
    pub fn to_config(&self) -> Config {
        let mut config = Config {
            api_url: self.global.api_url.clone(),
            credentials_path: self.global.credentials_file.clone(),
            timeout_seconds: self.global.timeout_seconds,
            status_port: self.global.status_port,
            log_level: self.global.log_level.clone(),
            log_format: self.global.log_format.clone(),
            ..Default::default()
        };
        match &self.command {
            Command::Import(args) => {
                config.import_batch_size = args.batch_size;
                config.import_batch_delay_ms = args.batch_delay_ms;
            }
            Command::CheckAll(args) => {
                config.poll_interval_ms = args.poll_interval_ms;
            }
            _ => {}
        }
        config
    }
}
