use crate::config::SearchConfig;
use crate::model::{FetchError, SearchRequest, SearchResult};
use crate::source::traits::OfferSource;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
    product_id: &'a str,
    max_results: u32,
    force_refresh: bool,
}

/// Competitor search over the backend's HTTP API.
pub struct HttpOfferSource {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl HttpOfferSource {
    pub fn new(cfg: &SearchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent("PriceScout/0.1")
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .build()
            .map_err(|e| FetchError::ServerError(format!("client setup failed: {}", e)))?;

        Ok(Self {
            client,
            url: build_url(&cfg.base_url, &cfg.search_path),
            api_key: cfg.api_key.clone(),
        })
    }
}

fn build_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Maps a non-success HTTP status onto the caller-facing taxonomy.
pub fn map_status(status: StatusCode) -> Option<FetchError> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::NOT_FOUND => FetchError::NotFound,
        StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited,
        s => FetchError::ServerError(format!("status {}", s)),
    })
}

#[async_trait::async_trait]
impl OfferSource for HttpOfferSource {
    async fn search(&self, req: &SearchRequest) -> Result<SearchResult, FetchError> {
        info!(
            "🌐 Searching offers for {} (max {}, force {})",
            req.product_id, req.max_results, req.force_refresh
        );

        let body = SearchBody {
            product_id: &req.product_id,
            max_results: req.max_results,
            force_refresh: req.force_refresh,
        };
        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            warn!("❌ Search request failed: {:?}", e);
            if e.is_timeout() {
                FetchError::ServerError("timeout".to_string())
            } else {
                FetchError::ServerError(e.to_string())
            }
        })?;

        if let Some(err) = map_status(response.status()) {
            warn!("❌ Search API responded [{}] for {}", response.status(), req.product_id);
            return Err(err);
        }

        let mut result: SearchResult = response
            .json()
            .await
            .map_err(|e| FetchError::ServerError(format!("invalid response body: {}", e)))?;
        if result.product_id.is_empty() {
            result.product_id = req.product_id.clone();
        }
        Ok(result)
    }
}
