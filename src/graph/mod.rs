pub mod auth;
pub mod configuration_policies;

use crate::config::{ConfigManager, GraphSettings};
use crate::error::{CatalogError, Result};
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const GRAPH_API_BETA: &str = "https://graph.microsoft.com/beta";

/// Retry behaviour for transient Graph failures (429, 5xx, connection errors)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 1000,
            max_backoff_ms: 30000,
        }
    }
}

const JITTER_FACTOR: f64 = 0.3; // +/- 30% jitter

impl RetryPolicy {
    /// Exponential backoff with jitter
    fn backoff(&self, attempt: u32) -> Duration {
        let base_backoff = self
            .initial_backoff_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        let capped_backoff = base_backoff.min(self.max_backoff_ms);

        let jitter_range = (capped_backoff as f64 * JITTER_FACTOR) as u64;
        let jitter = if jitter_range > 0 {
            use std::hash::{Hash, Hasher};
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            std::time::SystemTime::now().hash(&mut hasher);
            (hasher.finish() % (jitter_range * 2)) as i64 - jitter_range as i64
        } else {
            0
        };

        let floor = self.initial_backoff_ms.min(100) as i64;
        Duration::from_millis((capped_backoff as i64 + jitter).max(floor) as u64)
    }
}

/// Graph API client with retry support
pub struct GraphClient {
    client: Client,
    access_token: String,
    base_url: String,
    retry: RetryPolicy,
}

impl GraphClient {
    pub fn new(access_token: String) -> Self {
        Self {
            client: Client::new(),
            access_token,
            base_url: GRAPH_API_BETA.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Point the client at another Graph root (national clouds, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_settings(self, settings: &GraphSettings) -> Self {
        let client = self.with_retry_policy(settings.retry_policy());
        match &settings.base_url {
            Some(base_url) => client.with_base_url(base_url.clone()),
            None => client,
        }
    }

    /// Create a GraphClient for a tenant, using its cached token and the configured Graph settings
    pub async fn from_config(config: &ConfigManager, tenant_name: &str) -> Result<Self> {
        let graph_auth = auth::GraphAuth::new(config.clone());
        let access_token = graph_auth.get_access_token(tenant_name).await?;
        let settings = config.load_config()?.graph;

        Ok(Self::new(access_token).with_settings(&settings))
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Send a request, retrying on 429, 5xx and connection errors. Returns the successful response.
    /// POST only retries on 429.
    async fn send_with_retry<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response> {
        let mut last_error = None;
        let idempotent = method != Method::POST;

        for attempt in 0..self.retry.max_retries {
            let mut request = self
                .client
                .request(method.clone(), url)
                .bearer_auth(&self.access_token);
            if let Some(body) = body {
                request = request.json(body);
            }

            tracing::debug!(%method, url, attempt, "graph request");

            match request.send().await {
                Ok(resp) => {
                    let status = resp.status();

                    if status == StatusCode::TOO_MANY_REQUESTS && attempt < self.retry.max_retries - 1
                    {
                        let retry_after = resp
                            .headers()
                            .get("Retry-After")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .map(Duration::from_secs)
                            .unwrap_or_else(|| self.retry.backoff(attempt));

                        tracing::warn!(
                            "Rate limited (429). Retrying in {:?}... (attempt {}/{})",
                            retry_after,
                            attempt + 1,
                            self.retry.max_retries
                        );
                        tokio::time::sleep(retry_after).await;
                        continue;
                    }

                    if status.is_server_error() && idempotent && attempt < self.retry.max_retries - 1
                    {
                        let wait_time = self.retry.backoff(attempt);
                        tracing::warn!(
                            "Server error ({}). Retrying in {:?}... (attempt {}/{})",
                            status,
                            wait_time,
                            attempt + 1,
                            self.retry.max_retries
                        );
                        tokio::time::sleep(wait_time).await;
                        continue;
                    }

                    if !status.is_success() {
                        let error_text = resp.text().await.unwrap_or_default();
                        let enhanced_error = crate::error::enhance_graph_error(&error_text);
                        return Err(CatalogError::GraphApiError(format!(
                            "HTTP {}: {}",
                            status, enhanced_error
                        )));
                    }

                    return Ok(resp);
                }
                Err(e) => {
                    if idempotent && attempt < self.retry.max_retries - 1 {
                        let wait_time = self.retry.backoff(attempt);
                        tracing::warn!(
                            "Connection error: {}. Retrying in {:?}... (attempt {}/{})",
                            e,
                            wait_time,
                            attempt + 1,
                            self.retry.max_retries
                        );
                        tokio::time::sleep(wait_time).await;
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(last_error.map(|e| e.into()).unwrap_or_else(|| {
            CatalogError::GraphApiError(format!(
                "{} {} failed after {} retries",
                method, url, self.retry.max_retries
            ))
        }))
    }

    /// GET and deserialize
    pub async fn get<T: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> Result<T> {
        let resp = self
            .send_with_retry::<()>(Method::GET, &self.url(endpoint), None)
            .await?;
        Ok(resp.json::<T>().await?)
    }

    /// POST a JSON body and deserialize the response
    pub async fn post<T: Serialize + ?Sized, R: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<R> {
        let resp = self
            .send_with_retry(Method::POST, &self.url(endpoint), Some(body))
            .await?;
        Ok(resp.json::<R>().await?)
    }

    /// POST a JSON body to an action that answers 204 No Content
    pub async fn post_no_content<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<()> {
        self.send_with_retry(Method::POST, &self.url(endpoint), Some(body))
            .await?;
        Ok(())
    }

    /// PATCH a JSON body. Graph answers 204 for most updates, so the body is discarded.
    pub async fn patch<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<()> {
        self.send_with_retry(Method::PATCH, &self.url(endpoint), Some(body))
            .await?;
        Ok(())
    }

    pub async fn delete(&self, endpoint: &str) -> Result<()> {
        self.send_with_retry::<()>(Method::DELETE, &self.url(endpoint), None)
            .await?;
        Ok(())
    }
}

// ============================================================================
// Pagination Helpers
// ============================================================================

/// Generic paginated response from Graph API
#[derive(Debug, Deserialize)]
pub struct PaginatedResponse<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

impl GraphClient {
    /// Fetch all pages of a paginated Graph API endpoint
    ///
    /// Follows `@odata.nextLink` until all pages are retrieved.
    pub async fn get_all_pages<T: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> Result<Vec<T>> {
        let mut all_items: Vec<T> = Vec::new();
        let mut current_url = self.url(endpoint);
        let mut page_count = 0;

        loop {
            let response: PaginatedResponse<T> = self.get(&current_url).await?;
            all_items.extend(response.value);
            page_count += 1;

            match response.next_link {
                Some(next) => current_url = next,
                None => break,
            }
        }

        tracing::debug!(endpoint, pages = page_count, items = all_items.len(), "fetched pages");
        Ok(all_items)
    }
}
