//! Configuration for the search client
//!
//! Supports environment-based configuration with sensible defaults.

use crate::error::{ApiError, ApiResult};
use geosearch_core::config::IndexConfig;
use geosearch_core::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the Solr server
    pub endpoint: String,
    /// Core or collection name
    pub index: String,
    /// Field holding the document geometry
    pub geometry_field: String,
    /// `distErrPct` for containment queries
    pub dist_err_pct: f64,
    /// Maximum rows per search
    pub max_rows: u32,
    /// Filter query applied when only public documents are wanted
    pub visibility_filter: String,
    /// Request timeout
    #[serde(with = "secs")]
    pub timeout: Duration,
    /// Retry configuration for transient failures
    pub retry: RetryConfig,
}

mod secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_index_config(&IndexConfig::default())
    }
}

impl ClientConfig {
    /// Create configuration from the `[index]` section of a config file
    #[must_use]
    pub fn from_index_config(index: &IndexConfig) -> Self {
        Self {
            endpoint: index.endpoint.clone(),
            index: index.name.clone(),
            geometry_field: index.geometry_field.clone(),
            dist_err_pct: index.dist_err_pct,
            max_rows: index.max_rows,
            visibility_filter: index.visibility_filter.clone(),
            timeout: Duration::from_secs(index.timeout_secs),
            retry: index.retry.clone(),
        }
    }

    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables on top of the defaults:
    /// - `GEOSEARCH_SOLR_ENDPOINT`: Base URL of the Solr server
    /// - `GEOSEARCH_SOLR_INDEX`: Core or collection name
    /// - `GEOSEARCH_SOLR_GEOM_FIELD`: Geometry field name
    /// - `GEOSEARCH_SOLR_GEOM_ERROR`: `distErrPct` tolerance (unparseable values mean 0)
    /// - `GEOSEARCH_SOLR_MAXCOUNT`: Maximum rows per search
    /// - `GEOSEARCH_TIMEOUT_SECS`: Request timeout in seconds
    pub fn from_env() -> ApiResult<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply the `GEOSEARCH_*` environment variables to this configuration
    pub fn with_env_overrides(mut self) -> ApiResult<Self> {
        if let Ok(endpoint) = env::var("GEOSEARCH_SOLR_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Ok(index) = env::var("GEOSEARCH_SOLR_INDEX") {
            self.index = index;
        }
        if let Ok(field) = env::var("GEOSEARCH_SOLR_GEOM_FIELD") {
            self.geometry_field = field;
        }
        if let Ok(tolerance) = env::var("GEOSEARCH_SOLR_GEOM_ERROR") {
            self.dist_err_pct = tolerance.trim().parse().unwrap_or(0.0);
        }
        if let Ok(max) = env::var("GEOSEARCH_SOLR_MAXCOUNT") {
            self.max_rows = max.trim().parse().map_err(|_| {
                ApiError::config(format!("GEOSEARCH_SOLR_MAXCOUNT is not a number: {max}"))
            })?;
        }
        if let Some(timeout) = env::var("GEOSEARCH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
        {
            self.timeout = Duration::from_secs(timeout);
        }
        Ok(self)
    }

    /// Builder-style method to set the endpoint
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Builder-style method to set the index name
    #[must_use]
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    /// Builder-style method to set the geometry field
    #[must_use]
    pub fn with_geometry_field(mut self, field: impl Into<String>) -> Self {
        self.geometry_field = field.into();
        self
    }

    /// Builder-style method to set the containment tolerance
    #[must_use]
    pub fn with_dist_err_pct(mut self, tolerance: f64) -> Self {
        self.dist_err_pct = tolerance;
        self
    }

    /// Builder-style method to set the row cap
    #[must_use]
    pub fn with_max_rows(mut self, max_rows: u32) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set retry config
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Base URL of the `select` handler
    #[must_use]
    pub fn select_url(&self) -> String {
        format!("{}/{}/select", self.endpoint.trim_end_matches('/'), self.index)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.endpoint.is_empty() {
            return Err(ApiError::config("endpoint cannot be empty"));
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ApiError::config("endpoint must start with http:// or https://"));
        }

        if self.index.is_empty() || self.index.contains(['/', '?', '&']) {
            return Err(ApiError::config(format!("invalid index name \"{}\"", self.index)));
        }

        if self.geometry_field.is_empty() {
            return Err(ApiError::config("geometry_field cannot be empty"));
        }

        if self.max_rows == 0 {
            return Err(ApiError::config("max_rows must be positive"));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        Ok(())
    }
}
