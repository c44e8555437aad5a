use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use nonzero_ext::nonzero;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::metrics::RequestMetrics;
use super::types::{AccountDto, MatchDto, SourceError, SourceResult};
use super::MatchSource;

// Regional routing host shared by Account-v1 and Match-v5.
const REGIONAL_ROUTE: &str = "https://americas.api.riotgames.com";

/// One slow upstream call must not stall the rest of a poll cycle.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the Riot API endpoints the bot consumes.
#[derive(Debug)]
pub struct RiotClient {
    client: reqwest::Client,
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    /// Riot API Key
    key: String,
    base_url: String,
    metrics: Arc<RequestMetrics>,
}

impl RiotClient {
    pub fn new(api_key: String, rate_limit_per_minute: NonZeroU32) -> Self {
        Self::with_base_url(api_key, rate_limit_per_minute, REGIONAL_ROUTE.to_string())
    }

    fn with_base_url(api_key: String, rate_limit_per_minute: NonZeroU32, base_url: String) -> Self {
        let q = Quota::per_minute(rate_limit_per_minute).allow_burst(nonzero!(20_u32));

        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("HTTP client creation should succeed"),
            limiter: RateLimiter::direct(q),
            key: api_key,
            base_url,
            metrics: RequestMetrics::new(),
        }
    }

    /// Spawn a task logging periodic metrics about requests.
    pub fn start_metrics_logging(&self) {
        let metrics = self.metrics.clone();
        tokio::spawn(async move { metrics.log_loop().await });
    }

    async fn request<T: DeserializeOwned>(&self, path: String) -> SourceResult<T> {
        // Ensure we do not breach the Riot API rate limits before doing any request
        self.limiter.until_ready().await;
        self.metrics.inc();

        let res = self
            .client
            .get(path)
            .header("X-Riot-Token", &self.key)
            .send()
            .await?;

        match res.status() {
            StatusCode::OK => {
                let body = res.bytes().await?;
                serde_json::from_slice(&body).map_err(SourceError::MalformedPayload)
            }
            StatusCode::NOT_FOUND => Err(SourceError::NotFound),
            StatusCode::TOO_MANY_REQUESTS => Err(SourceError::RateLimited),
            status => Err(SourceError::Status(status)),
        }
    }
}

#[async_trait]
impl MatchSource for RiotClient {
    // Account-v1 endpoint
    async fn get_account_by_riot_id(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> SourceResult<AccountDto> {
        tracing::trace!("get_account_by_riot_id {}#{}", game_name, tag_line);

        let path = format!(
            "{}/riot/account/v1/accounts/by-riot-id/{}/{}",
            self.base_url, game_name, tag_line
        );

        self.request(path).await
    }

    // Match-v5 endpoints
    async fn get_match_ids(&self, puuid: &str, count: u32) -> SourceResult<Vec<String>> {
        tracing::trace!("get_match_ids {} (count {})", puuid, count);

        let path = format!(
            "{}/lol/match/v5/matches/by-puuid/{}/ids?start=0&count={}",
            self.base_url, puuid, count
        );

        self.request(path).await
    }

    async fn get_match(&self, match_id: &str) -> SourceResult<MatchDto> {
        tracing::trace!("get_match {}", match_id);

        let path = format!("{}/lol/match/v5/matches/{}", self.base_url, match_id);

        self.request(path).await
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn client_for(server: &MockServer) -> RiotClient {
        RiotClient::with_base_url("TEST_KEY".into(), nonzero!(10_000_u32), server.base_url())
    }

    #[tokio::test]
    async fn get_match_ids_decodes_newest_first_list() {
        let server = MockServer::start_async().await;
        let mock = server.mock_async(|when, then| {
            when.method(GET)
                .path("/lol/match/v5/matches/by-puuid/abc/ids")
                .header("X-Riot-Token", "TEST_KEY");
            then.status(200)
                .json_body(json!(["NA1_5", "NA1_4", "NA1_3"]));
        })
        .await;

        let ids = client_for(&server).get_match_ids("abc", 5).await.unwrap();

        mock.assert_async().await;
        assert_eq!(ids, vec!["NA1_5", "NA1_4", "NA1_3"]);
    }

    #[tokio::test]
    async fn status_404_maps_to_not_found() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(GET);
            then.status(404);
        })
        .await;

        let res = client_for(&server)
            .get_account_by_riot_id("Nobody", "EUW")
            .await;

        assert!(matches!(res, Err(SourceError::NotFound)));
    }

    #[tokio::test]
    async fn status_429_maps_to_rate_limited() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(GET);
            then.status(429);
        })
        .await;

        let res = client_for(&server).get_match_ids("abc", 5).await;

        assert!(matches!(res, Err(SourceError::RateLimited)));
    }

    #[tokio::test]
    async fn schema_drift_maps_to_malformed_payload() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(GET);
            then.status(200).json_body(json!({ "unexpected": true }));
        })
        .await;

        let res = client_for(&server).get_match("NA1_1").await;

        assert!(matches!(res, Err(SourceError::MalformedPayload(_))));
    }
}
