//! Backend request and response types.
//!
//! One canonical schema per resource. Where the backend has been seen to use
//! different field names for the same value (`ips`/`items`, `created`/`added`,
//! `provider`/`name`, ...), the alternatives are accepted here through serde
//! aliases so that call sites only ever see the canonical field.

use serde::{Deserialize, Deserializer, Serialize};

use crate::parse::CandidateRecord;

/// Deserializes `null` as the type's default instead of failing.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A blacklist listing is sent either as a bare provider name or as an
/// object carrying one.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListingRepr {
    Name(String),
    Object {
        #[serde(alias = "name")]
        provider: String,
    },
}

/// The check interval is reported either as text (`"6h"`) or as a number of
/// seconds.
#[derive(Deserialize)]
#[serde(untagged)]
enum IntervalRepr {
    Text(String),
    Seconds(u64),
}

fn deserialize_interval<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<IntervalRepr> = Option::deserialize(deserializer)?;
    Ok(raw.map(|r| match r {
        IntervalRepr::Text(text) => text,
        IntervalRepr::Seconds(secs) => format!("{}s", secs),
    }))
}

fn deserialize_listings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<ListingRepr>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|l| match l {
            ListingRepr::Name(name) => name,
            ListingRepr::Object { provider } => provider,
        })
        .collect())
}

/// Blacklist status of a monitored address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpStatus {
    Clean,
    Blacklisted,
    #[default]
    Pending,
    #[serde(other)]
    Unknown,
}

impl IpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IpStatus::Clean => "clean",
            IpStatus::Blacklisted => "blacklisted",
            IpStatus::Pending => "pending",
            IpStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for IpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// A monitored address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpRecord {
    pub ip_address: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: IpStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub last_checked: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub check_count: u64,
    #[serde(default, alias = "listings", deserialize_with = "null_as_default")]
    pub blacklist_count: u64,
    #[serde(
        default,
        alias = "blacklist_sources",
        deserialize_with = "deserialize_listings"
    )]
    pub blacklists: Vec<String>,
    #[serde(default, alias = "muted", deserialize_with = "null_as_default")]
    pub notifications_muted: bool,
    /// Reverse DNS (PTR) name, when the backend resolved one.
    #[serde(default, alias = "ptr")]
    pub hostname: Option<String>,
    #[serde(default)]
    pub isp: Option<String>,
    #[serde(default, alias = "organization")]
    pub org: Option<String>,
    #[serde(default, alias = "country")]
    pub country_code: Option<String>,
}

impl IpRecord {
    /// ISP with the country code appended, e.g. `Hetzner Online GmbH (DE)`.
    pub fn network_label(&self) -> Option<String> {
        let isp = self.isp.as_deref()?;
        Some(match self.country_code.as_deref() {
            Some(cc) if !cc.is_empty() => format!("{} ({})", isp, cc),
            _ => isp.to_string(),
        })
    }
}

/// One page of `GET /ips`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpListPage {
    #[serde(alias = "ips", default, deserialize_with = "null_as_default")]
    pub items: Vec<IpRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl IpListPage {
    /// Number of pages for the given page size.
    pub fn total_pages(&self, page_size: u32) -> u64 {
        if page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(page_size))
    }
}

/// `POST /ips`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewIp {
    pub ip_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
}

/// `PATCH /ips/{address}`; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IpUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl IpUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.tags.is_none()
    }
}

/// One address inside a bulk-add batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BulkIpEntry {
    pub ip_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&CandidateRecord> for BulkIpEntry {
    fn from(record: &CandidateRecord) -> Self {
        Self {
            ip_address: record.address.clone(),
            name: record.name.clone(),
            description: record.description.clone(),
        }
    }
}

/// `POST /ips/bulk` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BulkAddRequest {
    pub ips: Vec<BulkIpEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Per-address outcome inside a bulk-add response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkAddResult {
    pub ip_address: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, alias = "error")]
    pub message: Option<String>,
}

/// `POST /ips/bulk` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkAddResponse {
    #[serde(default, alias = "created", deserialize_with = "null_as_default")]
    pub added: usize,
    #[serde(default, alias = "duplicates", deserialize_with = "null_as_default")]
    pub skipped: usize,
    #[serde(default, alias = "invalid", deserialize_with = "null_as_default")]
    pub failed: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<BulkAddResult>,
}

/// Outcome of an immediate DNSBL check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub ip_address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: IpStatus,
    #[serde(default, alias = "listings", deserialize_with = "null_as_default")]
    pub blacklist_count: u64,
    #[serde(default, deserialize_with = "deserialize_listings")]
    pub blacklists: Vec<String>,
    #[serde(default, alias = "created_at")]
    pub checked_at: Option<String>,
}

/// `POST /ips/bulk-check` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkCheckResponse {
    #[serde(default, alias = "items", deserialize_with = "null_as_default")]
    pub results: Vec<CheckResult>,
}

/// One past check of an address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: IpStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub blacklist_count: u64,
    #[serde(default, deserialize_with = "deserialize_listings")]
    pub blacklists: Vec<String>,
    #[serde(default, alias = "created_at")]
    pub checked_at: Option<String>,
}

impl HistoryEntry {
    /// Listing count, falling back to the listing names when the count is absent.
    pub fn listing_count(&self) -> u64 {
        if self.blacklist_count > 0 {
            self.blacklist_count
        } else {
            self.blacklists.len() as u64
        }
    }
}

/// `GET /ips/{address}/history`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryPage {
    #[serde(default, alias = "history", deserialize_with = "null_as_default")]
    pub items: Vec<HistoryEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
}

/// Listing count for one DNSBL provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderListing {
    #[serde(alias = "provider")]
    pub name: String,
    #[serde(
        default,
        alias = "listings",
        alias = "listed_count",
        deserialize_with = "null_as_default"
    )]
    pub count: u64,
}

/// `GET /stats`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default, alias = "total_ips", deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub clean: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub blacklisted: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pending: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub providers: Vec<ProviderListing>,
    #[serde(default)]
    pub last_check_run: Option<String>,
    #[serde(default)]
    pub next_check_run: Option<String>,
    #[serde(default, deserialize_with = "deserialize_interval")]
    pub check_interval: Option<String>,
    #[serde(default)]
    pub active_providers: Option<u64>,
    /// Daily clean/blacklisted counts, oldest first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<StatsHistoryPoint>,
}

/// One day of the stats history.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatsHistoryPoint {
    #[serde(alias = "day")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub clean: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub blacklisted: u64,
}

/// One entry of `GET /activity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    #[serde(default, rename = "type", alias = "action")]
    pub kind: Option<String>,
    #[serde(default, alias = "description")]
    pub message: Option<String>,
    #[serde(default, alias = "ip_address")]
    pub ip: Option<String>,
    #[serde(default, alias = "timestamp")]
    pub created_at: Option<String>,
}

/// `GET /activity`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityFeed {
    #[serde(default, alias = "activities", deserialize_with = "null_as_default")]
    pub items: Vec<ActivityEntry>,
}

/// Generic `{ message }` acknowledgement (delete, mute, webhook test, cancel).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
}

/// Lifecycle status of a server-side check-all job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl JobStatus {
    /// Terminal statuses never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Cancelled | JobStatus::Failed
        )
    }

    /// Statuses a resumed poller should attach to.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a check-all job as reported by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CheckJob {
    pub job_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: JobStatus,
    /// Percent complete, 0-100.
    #[serde(default, deserialize_with = "null_as_default")]
    pub progress: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub checked: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub remaining: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub clean: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub blacklisted: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: u64,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
}

/// `POST /ips/check-all` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartJobResponse {
    pub job_id: String,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ip_list_page_accepts_ips_alias() {
        let page: IpListPage = serde_json::from_value(json!({
            "ips": [{"ip_address": "1.2.3.4", "status": "blacklisted", "listings": 2}],
            "total": 41
        }))
        .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].status, IpStatus::Blacklisted);
        assert_eq!(page.items[0].blacklist_count, 2);
        assert_eq!(page.total_pages(20), 3);
    }

    #[test]
    fn test_ip_record_tolerates_nulls_and_unknown_status() {
        let record: IpRecord = serde_json::from_value(json!({
            "ip_address": "2001:db8::1",
            "tags": null,
            "status": "checking",
            "check_count": null,
            "blacklists": ["zen.spamhaus.org", {"provider": "bl.spamcop.net"}]
        }))
        .unwrap();
        assert!(record.tags.is_empty());
        assert_eq!(record.status, IpStatus::Unknown);
        assert_eq!(record.check_count, 0);
        assert_eq!(
            record.blacklists,
            vec!["zen.spamhaus.org".to_string(), "bl.spamcop.net".to_string()]
        );
    }

    #[test]
    fn test_ip_record_network_fields() {
        let record: IpRecord = serde_json::from_value(json!({
            "ip_address": "203.0.113.7",
            "hostname": "mail.example.net",
            "isp": "Example Hosting",
            "org": "Example Org",
            "country_code": "DE"
        }))
        .unwrap();
        assert_eq!(record.hostname.as_deref(), Some("mail.example.net"));
        assert_eq!(record.org.as_deref(), Some("Example Org"));
        assert_eq!(
            record.network_label().as_deref(),
            Some("Example Hosting (DE)")
        );

        let bare: IpRecord = serde_json::from_value(json!({"ip_address": "10.0.0.1"})).unwrap();
        assert!(bare.hostname.is_none());
        assert!(bare.network_label().is_none());
    }

    #[test]
    fn test_bulk_add_response_aliases() {
        let resp: BulkAddResponse =
            serde_json::from_value(json!({"created": 7, "duplicates": 3})).unwrap();
        assert_eq!(resp.added, 7);
        assert_eq!(resp.skipped, 3);
        assert_eq!(resp.failed, 0);
        assert!(resp.results.is_empty());
    }

    #[test]
    fn test_bulk_add_request_omits_absent_fields() {
        let request = BulkAddRequest {
            ips: vec![BulkIpEntry {
                ip_address: "10.0.0.1".to_string(),
                name: None,
                description: Some("edge".to_string()),
            }],
            tags: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"ips": [{"ip_address": "10.0.0.1", "description": "edge"}]})
        );
    }

    #[test]
    fn test_stats_provider_aliases() {
        let stats: Stats = serde_json::from_value(json!({
            "total": 10, "clean": 8, "blacklisted": 2,
            "providers": [{"provider": "zen.spamhaus.org", "listings": 2}]
        }))
        .unwrap();
        assert_eq!(stats.pending, 0);
        assert_eq!(
            stats.providers,
            vec![ProviderListing {
                name: "zen.spamhaus.org".to_string(),
                count: 2
            }]
        );
    }

    #[test]
    fn test_stats_dashboard_fields() {
        let stats: Stats = serde_json::from_value(json!({
            "total": 3,
            "check_interval": 21600,
            "active_providers": 12,
            "history": [
                {"date": "2024-05-01", "clean": 3, "blacklisted": 0},
                {"date": "2024-05-02", "clean": 2, "blacklisted": null}
            ]
        }))
        .unwrap();
        assert_eq!(stats.check_interval.as_deref(), Some("21600s"));
        assert_eq!(stats.active_providers, Some(12));
        assert_eq!(stats.history.len(), 2);
        assert_eq!(stats.history[1].blacklisted, 0);

        let stats: Stats =
            serde_json::from_value(json!({"check_interval": "6h", "history": null})).unwrap();
        assert_eq!(stats.check_interval.as_deref(), Some("6h"));
        assert!(stats.history.is_empty());
        assert!(stats.active_providers.is_none());
    }

    #[test]
    fn test_history_listing_count_fallback() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "status": "blacklisted",
            "blacklists": ["a", "b"],
            "created_at": "2024-05-01T10:00:00"
        }))
        .unwrap();
        assert_eq!(entry.listing_count(), 2);
        assert_eq!(entry.checked_at.as_deref(), Some("2024-05-01T10:00:00"));
    }

    #[test]
    fn test_job_status_terminal() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Running.is_active());
    }

    #[test]
    fn test_check_job_deserialize() {
        let job: CheckJob = serde_json::from_value(json!({
            "job_id": "job-1",
            "status": "running",
            "progress": 40.0,
            "checked": 40,
            "total": 100,
            "remaining": 60,
            "clean": 38,
            "blacklisted": 2,
            "errors": 0,
            "duration_seconds": null
        }))
        .unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.remaining, 60);
        assert_eq!(job.duration_seconds, None);
    }

    #[test]
    fn test_ip_update_is_empty() {
        assert!(IpUpdate::default().is_empty());
        let update = IpUpdate {
            tags: Some(vec![]),
            ..Default::default()
        };
        assert!(!update.is_empty());
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"tags": []}));
    }
}
