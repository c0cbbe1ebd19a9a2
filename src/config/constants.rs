//! Configuration constants.
//!
//! Timeouts, batch sizes, poll intervals and the backend wire constants used
//! throughout the client.

use std::time::Duration;

/// Default backend base URL (production).
pub const DEFAULT_API_URL: &str = "https://blacklistapi.atoztester.com/api/v1";

/// Environment variable carrying the backend base URL.
pub const API_URL_ENV: &str = "BLACKLIST_API_URL";

/// Environment variable carrying the API key (overrides the credential file).
pub const API_KEY_ENV: &str = "BLACKLIST_API_KEY";

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Default location of the persisted API key.
pub const DEFAULT_CREDENTIALS_PATH: &str = "./.blacklist_monitor_key";

/// Client-side timeout applied to every HTTP call (30 seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

// Bulk import
/// Number of addresses submitted per `POST /ips/bulk` request.
pub const IMPORT_BATCH_SIZE: usize = 100;
/// Pause between consecutive import batches, in milliseconds.
/// Not applied after the last batch.
pub const IMPORT_BATCH_DELAY_MS: u64 = 100;

// Check-all job polling
/// Interval between job status polls, in milliseconds.
pub const JOB_POLL_INTERVAL_MS: u64 = 1000;
/// Shortest poll interval accepted on the command line.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Interval between progress log lines while a workflow is running.
pub const PROGRESS_LOG_INTERVAL: Duration = Duration::from_secs(5);

// Input validation limits
/// Maximum length of an address name.
pub const MAX_NAME_LENGTH: usize = 100;
/// Maximum length of an address description.
pub const MAX_DESCRIPTION_LENGTH: usize = 255;
/// Maximum number of tags on one address.
pub const MAX_TAGS: usize = 20;
/// Maximum length of a single tag.
pub const MAX_TAG_LENGTH: usize = 50;

/// Page size used by `list` when none is given.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Page size used by `hostnames` when none is given.
pub const HOSTNAMES_PAGE_SIZE: u32 = 50;

// HTTP status codes (for clarity and consistency)
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
