//! Client-side query cache.
//!
//! Read results are cached per resource family (`CacheKey`) and per request
//! variant (query string, page). Workflows never write into the cache; they
//! only invalidate whole families once they finish, and `CachedApi`
//! repopulates on the next read.
//!
//! Every invalidation bumps a generation counter. A read-through fetch that
//! was in flight across an invalidation returns its result but does not
//! store it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{
    Ack, ActivityFeed, ApiClient, BulkCheckResponse, CheckResult, HistoryPage, IpListPage,
    IpListParams, IpRecord, IpUpdate, NewIp, PageParams, Stats, ToQuery,
};
use crate::error_handling::ApiError;

/// Resource family a cached read belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Ips,
    Stats,
    Activity,
    Ip(String),
    IpHistory(String),
}

impl CacheKey {
    /// The families refreshed after any bulk change to the address list.
    pub const LIST_FAMILIES: [CacheKey; 3] = [CacheKey::Ips, CacheKey::Stats, CacheKey::Activity];

    /// Entries older than this are treated as missing.
    pub fn max_age(&self) -> Option<Duration> {
        match self {
            CacheKey::Stats => Some(Duration::from_secs(60)),
            CacheKey::Activity => Some(Duration::from_secs(30)),
            _ => None,
        }
    }

    fn is_per_address(&self) -> bool {
        matches!(self, CacheKey::Ip(_) | CacheKey::IpHistory(_))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Ips => f.write_str("ips"),
            CacheKey::Stats => f.write_str("stats"),
            CacheKey::Activity => f.write_str("activity"),
            CacheKey::Ip(addr) => write!(f, "ip:{}", addr),
            CacheKey::IpHistory(addr) => write!(f, "ip-history:{}", addr),
        }
    }
}

#[derive(Debug)]
struct Entry {
    value: serde_json::Value,
    stored_at: Instant,
}

impl Entry {
    fn is_expired(&self, key: &CacheKey) -> bool {
        key.max_age()
            .is_some_and(|max_age| self.stored_at.elapsed() > max_age)
    }
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<(CacheKey, String), Entry>,
    /// Shared families only; per-address keys are not counted.
    invalidations: HashMap<CacheKey, usize>,
    generation: u64,
}

impl Inner {
    fn insert(&mut self, key: CacheKey, variant: &str, value: serde_json::Value) {
        self.entries.retain(|(k, _), entry| !entry.is_expired(k));
        self.entries.insert(
            (key, variant.to_string()),
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }
}

/// Shared cache of backend reads. Cheap to share behind an `Arc`.
#[derive(Debug, Default)]
pub struct QueryCache {
    inner: RwLock<Inner>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`/`variant` if present and fresh.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey, variant: &str) -> Option<T> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let entry = inner.entries.get(&(key.clone(), variant.to_string()))?;
        if entry.is_expired(key) {
            return None;
        }
        serde_json::from_value(entry.value.clone()).ok()
    }

    pub fn put<T: Serialize>(&self, key: CacheKey, variant: &str, value: &T) {
        let Ok(value) = serde_json::to_value(value) else {
            return;
        };
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.insert(key, variant, value);
    }

    /// Current invalidation generation.
    pub fn generation(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// Stores `value` only if nothing was invalidated since `generation` was
    /// read. Returns whether it was stored.
    pub fn put_if_current<T: Serialize>(
        &self,
        key: CacheKey,
        variant: &str,
        value: &T,
        generation: u64,
    ) -> bool {
        let Ok(value) = serde_json::to_value(value) else {
            return false;
        };
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.generation != generation {
            return false;
        }
        inner.insert(key, variant, value);
        true
    }

    /// Drops every entry of the family `key`.
    pub fn invalidate(&self, key: &CacheKey) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.entries.retain(|(k, _), _| k != key);
        inner.generation += 1;
        if !key.is_per_address() {
            *inner.invalidations.entry(key.clone()).or_insert(0) += 1;
        }
        debug!("Invalidated cache family '{}'", key);
    }

    pub fn invalidate_many(&self, keys: &[CacheKey]) {
        for key in keys {
            self.invalidate(key);
        }
    }

    /// How many times the shared family `key` has been invalidated over the
    /// cache's lifetime. Always 0 for per-address keys.
    pub fn invalidation_count(&self, key: &CacheKey) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.invalidations.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn variant_of(query: &impl ToQuery) -> String {
    query
        .to_query()
        .as_slice()
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Read-through fetch layer: reads consult the cache, mutations invalidate
/// the families they affect.
#[derive(Debug, Clone)]
pub struct CachedApi {
    api: Arc<ApiClient>,
    cache: Arc<QueryCache>,
}

impl CachedApi {
    pub fn new(api: Arc<ApiClient>, cache: Arc<QueryCache>) -> Self {
        Self { api, cache }
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    async fn read_through<T, F>(&self, key: CacheKey, variant: String, fetch: F) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: std::future::Future<Output = Result<T, ApiError>>,
    {
        if let Some(hit) = self.cache.get(&key, &variant) {
            debug!("Cache hit: {} [{}]", key, variant);
            return Ok(hit);
        }
        let generation = self.cache.generation();
        let value = fetch.await?;
        if !self.cache.put_if_current(key.clone(), &variant, &value, generation) {
            debug!("Not caching {} [{}]: invalidated during fetch", key, variant);
        }
        Ok(value)
    }

    pub async fn list_ips(&self, params: &IpListParams) -> Result<IpListPage, ApiError> {
        self.read_through(CacheKey::Ips, variant_of(params), self.api.list_ips(params))
            .await
    }

    pub async fn get_ip(&self, ip: &str) -> Result<IpRecord, ApiError> {
        self.read_through(CacheKey::Ip(ip.to_string()), String::new(), self.api.get_ip(ip))
            .await
    }

    pub async fn ip_history(&self, ip: &str, page: PageParams) -> Result<HistoryPage, ApiError> {
        self.read_through(
            CacheKey::IpHistory(ip.to_string()),
            variant_of(&page),
            self.api.ip_history(ip, page),
        )
        .await
    }

    pub async fn stats(&self) -> Result<Stats, ApiError> {
        self.read_through(CacheKey::Stats, String::new(), self.api.stats())
            .await
    }

    pub async fn activity(&self, page: PageParams) -> Result<ActivityFeed, ApiError> {
        self.read_through(CacheKey::Activity, variant_of(&page), self.api.activity(page))
            .await
    }

    pub async fn add_ip(&self, ip: &NewIp) -> Result<IpRecord, ApiError> {
        let record = self.api.add_ip(ip).await?;
        self.cache.invalidate_many(&CacheKey::LIST_FAMILIES);
        Ok(record)
    }

    pub async fn update_ip(&self, ip: &str, update: &IpUpdate) -> Result<IpRecord, ApiError> {
        let record = self.api.update_ip(ip, update).await?;
        self.cache.invalidate_many(&[
            CacheKey::Ips,
            CacheKey::Ip(ip.to_string()),
            CacheKey::Activity,
        ]);
        Ok(record)
    }

    pub async fn delete_ip(&self, ip: &str) -> Result<Ack, ApiError> {
        let ack = self.api.delete_ip(ip).await?;
        self.cache.invalidate_many(&CacheKey::LIST_FAMILIES);
        self.cache.invalidate(&CacheKey::Ip(ip.to_string()));
        Ok(ack)
    }

    /// Checks one address and refreshes everything that shows its status.
    pub async fn check_ip(&self, ip: &str) -> Result<CheckResult, ApiError> {
        let result = self.api.check_ip(ip).await?;
        self.cache.invalidate_many(&[
            CacheKey::Ip(ip.to_string()),
            CacheKey::IpHistory(ip.to_string()),
            CacheKey::Ips,
            CacheKey::Stats,
            CacheKey::Activity,
        ]);
        Ok(result)
    }

    pub async fn bulk_check(&self, ips: &[String]) -> Result<BulkCheckResponse, ApiError> {
        let result = self.api.bulk_check(ips).await?;
        self.cache.invalidate_many(&CacheKey::LIST_FAMILIES);
        for ip in ips {
            self.cache.invalidate(&CacheKey::Ip(ip.clone()));
            self.cache.invalidate(&CacheKey::IpHistory(ip.clone()));
        }
        Ok(result)
    }

    pub async fn mute_ip(&self, ip: &str) -> Result<Ack, ApiError> {
        let ack = self.api.mute_ip(ip).await?;
        self.cache
            .invalidate_many(&[CacheKey::Ip(ip.to_string()), CacheKey::Ips]);
        Ok(ack)
    }

    pub async fn unmute_ip(&self, ip: &str) -> Result<Ack, ApiError> {
        let ack = self.api.unmute_ip(ip).await?;
        self.cache
            .invalidate_many(&[CacheKey::Ip(ip.to_string()), CacheKey::Ips]);
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display() {
        assert_eq!(CacheKey::Ips.to_string(), "ips");
        assert_eq!(CacheKey::Ip("1.2.3.4".into()).to_string(), "ip:1.2.3.4");
        assert_eq!(
            CacheKey::IpHistory("::1".into()).to_string(),
            "ip-history:::1"
        );
    }

    #[test]
    fn test_put_get_and_invalidate_family() {
        let cache = QueryCache::new();
        cache.put(CacheKey::Ips, "page=1", &vec![1, 2, 3]);
        cache.put(CacheKey::Ips, "page=2", &vec![4]);
        cache.put(CacheKey::Stats, "", &42u32);

        assert_eq!(cache.get::<Vec<i32>>(&CacheKey::Ips, "page=1"), Some(vec![1, 2, 3]));
        assert_eq!(cache.get::<Vec<i32>>(&CacheKey::Ips, "page=3"), None);
        assert_eq!(cache.len(), 3);

        cache.invalidate(&CacheKey::Ips);
        assert_eq!(cache.get::<Vec<i32>>(&CacheKey::Ips, "page=1"), None);
        assert_eq!(cache.get::<Vec<i32>>(&CacheKey::Ips, "page=2"), None);
        assert_eq!(cache.get::<u32>(&CacheKey::Stats, ""), Some(42));
        assert_eq!(cache.invalidation_count(&CacheKey::Ips), 1);
        assert_eq!(cache.invalidation_count(&CacheKey::Stats), 0);
    }

    #[test]
    fn test_invalidate_many_counts_each_family_once() {
        let cache = QueryCache::new();
        cache.invalidate_many(&CacheKey::LIST_FAMILIES);
        for key in CacheKey::LIST_FAMILIES.iter() {
            assert_eq!(cache.invalidation_count(key), 1);
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn test_read_across_invalidation_is_not_stored() {
        let cache = QueryCache::new();
        let generation = cache.generation();
        cache.invalidate(&CacheKey::Ip("10.0.0.1".into()));

        assert!(!cache.put_if_current(CacheKey::Ips, "page=1", &vec![1], generation));
        assert!(cache.is_empty());

        assert!(cache.put_if_current(CacheKey::Ips, "page=1", &vec![1], cache.generation()));
        assert_eq!(cache.get::<Vec<i32>>(&CacheKey::Ips, "page=1"), Some(vec![1]));
    }

    #[test]
    fn test_expired_entries_are_pruned_on_insert() {
        let cache = QueryCache::new();
        let Some(long_ago) = Instant::now().checked_sub(Duration::from_secs(120)) else {
            return;
        };
        {
            let mut inner = cache.inner.write().unwrap();
            for variant in ["page=1", "page=2"] {
                inner.entries.insert(
                    (CacheKey::Activity, variant.to_string()),
                    Entry {
                        value: serde_json::json!([]),
                        stored_at: long_ago,
                    },
                );
            }
        }
        assert_eq!(cache.len(), 2);

        cache.put(CacheKey::Ip("10.0.0.1".into()), "", &"a");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_per_address_invalidations_are_not_counted() {
        let cache = QueryCache::new();
        for n in 0..50 {
            cache.invalidate(&CacheKey::Ip(format!("10.0.0.{}", n)));
        }
        assert_eq!(cache.invalidation_count(&CacheKey::Ip("10.0.0.1".into())), 0);
        assert_eq!(cache.generation(), 50);
        assert!(cache.inner.read().unwrap().invalidations.is_empty());
    }

    #[test]
    fn test_per_address_keys_are_independent() {
        let cache = QueryCache::new();
        cache.put(CacheKey::Ip("10.0.0.1".into()), "", &"a");
        cache.put(CacheKey::Ip("10.0.0.2".into()), "", &"b");
        cache.invalidate(&CacheKey::Ip("10.0.0.1".into()));
        assert_eq!(cache.get::<String>(&CacheKey::Ip("10.0.0.1".into()), ""), None);
        assert_eq!(
            cache.get::<String>(&CacheKey::Ip("10.0.0.2".into()), ""),
            Some("b".to_string())
        );
    }
}
