//! Error types for the search client

use geosearch_core::{Error as CoreError, ErrorCode};
use geosearch_geo::GeoError;
use thiserror::Error;

/// Result type alias for client operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Search client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The index returned an error response
    #[error("Search index error ({status}): {message}")]
    ApiResponse {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Spatial predicate other than `within` or `intersects`
    #[error("The given method is not a valid spatial filter type: {0}")]
    InvalidSpatialMode(String),

    /// Bounding box that is not four numbers
    #[error("Invalid extent: {0}")]
    InvalidExtent(String),

    /// All retry attempts exhausted
    #[error("All {attempts} attempts failed: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Last error message
        last_error: String,
    },

    /// Endpoint and index do not form a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an API response error
    pub fn api_response(status: u16, message: impl Into<String>) -> Self {
        Self::ApiResponse {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_connect() || e.is_timeout(),
            Self::ApiResponse { status, .. } => *status >= 500 || *status == 429,
            Self::Json(_)
            | Self::Config(_)
            | Self::InvalidSpatialMode(_)
            | Self::InvalidExtent(_)
            | Self::RetriesExhausted { .. }
            | Self::InvalidUrl(_) => false,
        }
    }
}

impl From<GeoError> for ApiError {
    fn from(err: GeoError) -> Self {
        Self::InvalidExtent(err.to_string())
    }
}

impl From<ApiError> for CoreError {
    fn from(err: ApiError) -> Self {
        let code = match &err {
            ApiError::Request(e) if e.is_timeout() => ErrorCode::Timeout,
            ApiError::Request(_) | ApiError::RetriesExhausted { .. } => ErrorCode::IndexUnreachable,
            ApiError::ApiResponse { .. } | ApiError::Json(_) => ErrorCode::IndexResponseError,
            ApiError::Config(_) | ApiError::InvalidUrl(_) => {
                ErrorCode::InvalidConfigValue
            }
            ApiError::InvalidSpatialMode(_) => ErrorCode::InvalidSpatialMode,
            ApiError::InvalidExtent(_) => ErrorCode::InvalidExtent,
        };
        CoreError::new(code, err.to_string()).with_source(err)
    }
}
