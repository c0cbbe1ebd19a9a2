//! Query-string construction.
//!
//! The backend expects list-valued parameters as repeated keys
//! (`ip_addresses=a&ip_addresses=b`), never bracket-indexed
//! (`ip_addresses[0]=a`). `QueryPairs` builds the flat pair list that
//! `reqwest::RequestBuilder::query` then encodes.

/// Ordered list of query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPairs(Vec<(String, String)>);

impl QueryPairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `key=value`.
    pub fn push(&mut self, key: &str, value: impl ToString) -> &mut Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    /// Appends `key=value` when a value is present; blank strings are skipped.
    pub fn push_opt<V: ToString>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            let v = v.to_string();
            if !v.trim().is_empty() {
                self.0.push((key.to_string(), v));
            }
        }
        self
    }

    /// Appends one `key=value` pair per element.
    pub fn push_all<I, V>(&mut self, key: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        for v in values {
            self.0.push((key.to_string(), v.to_string()));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }
}

/// Types that can be sent as query parameters.
pub trait ToQuery {
    fn to_query(&self) -> QueryPairs;
}

/// Filters, sort and pagination for `GET /ips`.
#[derive(Debug, Clone, Default)]
pub struct IpListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub tags: Vec<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ToQuery for IpListParams {
    fn to_query(&self) -> QueryPairs {
        let mut q = QueryPairs::new();
        q.push_opt("page", self.page)
            .push_opt("limit", self.limit)
            .push_opt("search", self.search.as_deref())
            .push_opt("status", self.status.as_deref())
            .push_all("tag", &self.tags)
            .push_opt("sort_by", self.sort_by.as_deref())
            .push_opt("sort_order", self.sort_order.as_deref());
        q
    }
}

/// Pagination for history and activity feeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ToQuery for PageParams {
    fn to_query(&self) -> QueryPairs {
        let mut q = QueryPairs::new();
        q.push_opt("page", self.page).push_opt("limit", self.limit);
        q
    }
}
