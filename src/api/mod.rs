//! Backend API access.

mod client;
mod endpoints;
pub mod models;
mod query;

pub use client::{unwrap_envelope, ApiClient};
pub use models::{
    Ack, ActivityEntry, ActivityFeed, BulkAddRequest, BulkAddResponse, BulkAddResult,
    BulkCheckResponse, BulkIpEntry, CheckJob, CheckResult, HealthStatus, HistoryEntry,
    HistoryPage, IpListPage, IpRecord, IpStatus, IpUpdate, JobStatus, NewIp, ProviderListing,
    StartJobResponse, Stats, StatsHistoryPoint,
};
pub use query::{IpListParams, PageParams, QueryPairs, ToQuery};
