//! Solr HTTP client implementation

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::query::QueryBuilder;
use geosearch_documents::SearchResponse;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Response};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, Span};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// Something that can run a `select` URL and return its result payload.
///
/// [`SolrClient`] is the production implementation; the controller only
/// depends on this trait.
pub trait Transport: Send + Sync + 'static {
    /// Fetch and decode the result payload of `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = ApiResult<SearchResponse>> + Send;
}

/// Solr client with request correlation and retry of transient failures
#[derive(Clone)]
pub struct SolrClient {
    inner: Client,
    config: Arc<ClientConfig>,
    queries: QueryBuilder,
}

impl SolrClient {
    /// Create a new client with configuration from environment
    pub fn new() -> ApiResult<Self> {
        let config = ClientConfig::from_env()?;
        Self::with_config(config)
    }

    /// Create a new client with specific configuration
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("geosearch-client/", env!("CARGO_PKG_VERSION"))),
        );

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            inner,
            queries: QueryBuilder::new(&config)?,
            config: Arc::new(config),
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Query builder for this client's index
    #[must_use]
    pub fn queries(&self) -> &QueryBuilder {
        &self.queries
    }

    /// GET a `select` URL with retry of transient failures
    #[instrument(skip(self), fields(request_id))]
    pub async fn select(&self, url: &str) -> ApiResult<SearchResponse> {
        let request_id = Uuid::new_v4().to_string();
        Span::current().record("request_id", request_id.as_str());
        self.execute_with_retry(&request_id, url).await
    }

    /// Execute request with retry logic
    async fn execute_with_retry(&self, request_id: &str, url: &str) -> ApiResult<SearchResponse> {
        let retry_config = &self.config.retry;
        let max_attempts = retry_config.max_attempts.max(1);
        let mut last_error: Option<ApiError> = None;

        for attempt in 0..max_attempts {
            // Wait before retry (except first attempt)
            if attempt > 0 {
                let delay = retry_config.delay_for_attempt(attempt);
                debug!(
                    request_id = %request_id,
                    attempt = attempt,
                    delay_ms = delay.as_millis(),
                    "Retrying after delay"
                );
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();
            let result = self.execute_single_request(request_id, url).await;
            let elapsed = start.elapsed();

            match result {
                Ok(response) => {
                    debug!(
                        request_id = %request_id,
                        attempt = attempt + 1,
                        elapsed_ms = elapsed.as_millis(),
                        docs = response.docs.len(),
                        num_found = response.num_found,
                        "Request succeeded"
                    );
                    return Ok(response);
                }
                Err(e) if e.is_retryable() && attempt + 1 < max_attempts => {
                    debug!(
                        request_id = %request_id,
                        attempt = attempt + 1,
                        error = %e,
                        "Request failed, will retry"
                    );
                    last_error = Some(e);
                }
                Err(e) => {
                    debug!(
                        request_id = %request_id,
                        attempt = attempt + 1,
                        error = %e,
                        "Request failed, not retrying"
                    );
                    return Err(e);
                }
            }
        }

        Err(ApiError::RetriesExhausted {
            attempts: max_attempts,
            last_error: last_error.map_or_else(|| "Unknown error".to_string(), |e| e.to_string()),
        })
    }

    /// Execute a single request without retry
    async fn execute_single_request(&self, request_id: &str, url: &str) -> ApiResult<SearchResponse> {
        let response = self
            .inner
            .get(url)
            .header(X_REQUEST_ID, request_id)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Handle HTTP response and decode the payload
    async fn handle_response(response: Response) -> ApiResult<SearchResponse> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(SearchResponse::from_json(&body)?)
        } else {
            Err(ApiError::api_response(status.as_u16(), body))
        }
    }
}

impl Transport for SolrClient {
    async fn fetch(&self, url: &str) -> ApiResult<SearchResponse> {
        self.select(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SearchRequest;
    use std::time::Duration;

    #[test]
    fn test_client_creation() {
        let client = SolrClient::with_config(ClientConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ClientConfig::default().with_endpoint("ftp://solr");
        assert!(matches!(SolrClient::with_config(config), Err(ApiError::Config(_))));
    }

    #[test]
    fn test_queries_follow_config() {
        let config = ClientConfig::default()
            .with_endpoint("https://search.example.org/solr")
            .with_index("kartenforum");
        let client = SolrClient::with_config(config).unwrap();
        assert!(client
            .queries()
            .search_url(&SearchRequest::new(
                geosearch_geo::Extent::new(0.0, 0.0, 1.0, 1.0),
                Default::default(),
                Default::default(),
            ))
            .starts_with("https://search.example.org/solr/kartenforum/select?q="));
    }

    #[tokio::test]
    async fn test_unreachable_index_fails_after_retries() {
        let config = ClientConfig::default()
            .with_endpoint("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2))
            .with_retry(geosearch_core::retry::RetryConfig::no_retry());
        let client = SolrClient::with_config(config).unwrap();
        let err = client
            .fetch("http://127.0.0.1:9/solr/maps/select?q=*:*")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Request(_)));
    }
}
