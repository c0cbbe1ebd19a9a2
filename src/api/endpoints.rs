//! Typed methods for every backend endpoint.

use reqwest::Method;

use super::client::ApiClient;
use super::models::{
    Ack, ActivityFeed, BulkAddRequest, BulkAddResponse, BulkCheckResponse, CheckJob, CheckResult,
    HealthStatus, HistoryPage, IpListPage, IpRecord, IpUpdate, NewIp, StartJobResponse, Stats,
};
use super::query::{IpListParams, PageParams, QueryPairs, ToQuery};
use crate::error_handling::ApiError;

impl ApiClient {
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        segments: &[&str],
        query: Option<&QueryPairs>,
    ) -> Result<T, ApiError> {
        self.request(Method::GET, segments, query, None).await
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        segments: &[&str],
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        self.request(Method::POST, segments, None, body).await
    }

    /// Acknowledgement endpoints may answer with an empty body.
    async fn send_ack(&self, method: Method, segments: &[&str]) -> Result<Ack, ApiError> {
        let ack: Option<Ack> = self.request(method, segments, None, None).await?;
        Ok(ack.unwrap_or_default())
    }

    // Health

    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get(&["health"], None).await
    }

    // Addresses

    pub async fn list_ips(&self, params: &IpListParams) -> Result<IpListPage, ApiError> {
        self.get(&["ips"], Some(&params.to_query())).await
    }

    pub async fn add_ip(&self, ip: &NewIp) -> Result<IpRecord, ApiError> {
        self.post(&["ips"], Some(serde_json::to_value(ip)?)).await
    }

    /// Submits one bulk-add batch.
    pub async fn add_bulk(&self, request: &BulkAddRequest) -> Result<BulkAddResponse, ApiError> {
        let resp: Option<BulkAddResponse> = self
            .post(&["ips", "bulk"], Some(serde_json::to_value(request)?))
            .await?;
        Ok(resp.unwrap_or_default())
    }

    pub async fn get_ip(&self, ip: &str) -> Result<IpRecord, ApiError> {
        self.get(&["ips", ip], None).await
    }

    pub async fn update_ip(&self, ip: &str, update: &IpUpdate) -> Result<IpRecord, ApiError> {
        self.request(
            Method::PATCH,
            &["ips", ip],
            None,
            Some(serde_json::to_value(update)?),
        )
        .await
    }

    pub async fn delete_ip(&self, ip: &str) -> Result<Ack, ApiError> {
        self.send_ack(Method::DELETE, &["ips", ip]).await
    }

    // Checks

    pub async fn check_ip(&self, ip: &str) -> Result<CheckResult, ApiError> {
        self.post(&["ips", ip, "check"], None).await
    }

    /// Checks several addresses at once; sent as repeated `ip_addresses` keys.
    pub async fn bulk_check(&self, ips: &[String]) -> Result<BulkCheckResponse, ApiError> {
        let mut query = QueryPairs::new();
        query.push_all("ip_addresses", ips);
        let resp: Option<BulkCheckResponse> = self
            .request(Method::POST, &["ips", "bulk-check"], Some(&query), None)
            .await?;
        Ok(resp.unwrap_or_default())
    }

    pub async fn ip_history(&self, ip: &str, page: PageParams) -> Result<HistoryPage, ApiError> {
        let resp: Option<HistoryPage> = self
            .get(&["ips", ip, "history"], Some(&page.to_query()))
            .await?;
        Ok(resp.unwrap_or_default())
    }

    pub async fn mute_ip(&self, ip: &str) -> Result<Ack, ApiError> {
        self.send_ack(Method::POST, &["ips", ip, "mute"]).await
    }

    pub async fn unmute_ip(&self, ip: &str) -> Result<Ack, ApiError> {
        self.send_ack(Method::POST, &["ips", ip, "unmute"]).await
    }

    // Check-all jobs

    pub async fn start_check_all(&self) -> Result<StartJobResponse, ApiError> {
        self.post(&["ips", "check-all"], None).await
    }

    /// The job currently pending or running on the server, if any.
    ///
    /// Both a `null` payload and a 404 mean "no job".
    pub async fn current_check_job(&self) -> Result<Option<CheckJob>, ApiError> {
        match self.get(&["ips", "check-all", "current"], None).await {
            Ok(job) => Ok(job),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn check_all_status(&self, job_id: &str) -> Result<CheckJob, ApiError> {
        self.get(&["ips", "check-all", job_id, "status"], None)
            .await
    }

    pub async fn cancel_check_all(&self, job_id: &str) -> Result<Ack, ApiError> {
        self.send_ack(Method::POST, &["ips", "check-all", job_id, "cancel"])
            .await
    }

    // Statistics

    pub async fn stats(&self) -> Result<Stats, ApiError> {
        self.get(&["stats"], None).await
    }

    pub async fn activity(&self, page: PageParams) -> Result<ActivityFeed, ApiError> {
        let resp: Option<ActivityFeed> = self.get(&["activity"], Some(&page.to_query())).await?;
        Ok(resp.unwrap_or_default())
    }

    // Notifications

    pub async fn test_webhook(&self) -> Result<Ack, ApiError> {
        self.send_ack(Method::POST, &["webhook", "test"]).await
    }
}
