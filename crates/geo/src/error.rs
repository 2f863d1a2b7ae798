//! Error types for the geo crate.

use crate::GeometryType;
use thiserror::Error;

/// Result type alias for geo operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors that can occur during geo operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Geometry type is outside what the operation supports
    #[error("The given geometry type (\"{0}\") is not supported by this operation")]
    UnsupportedGeometry(GeometryType),

    /// Bounding box without exactly four components
    #[error("Invalid extent: expected 4 components, got {0}")]
    InvalidExtent(usize),

    /// Invalid coordinate values
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Error code for integration with geosearch-core error handling.
/// Range: 10xxx for geo errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoErrorCode {
    /// Unsupported geometry type
    UnsupportedGeometry = 10001,
    /// Malformed extent
    InvalidExtent = 10002,
    /// Invalid coordinate values
    InvalidCoordinate = 10003,
    /// JSON parsing error
    JsonParsing = 10004,
}

impl GeoError {
    /// Returns the error code for this error.
    pub fn code(&self) -> GeoErrorCode {
        match self {
            GeoError::UnsupportedGeometry(_) => GeoErrorCode::UnsupportedGeometry,
            GeoError::InvalidExtent(_) => GeoErrorCode::InvalidExtent,
            GeoError::InvalidCoordinate(_) => GeoErrorCode::InvalidCoordinate,
            GeoError::JsonError(_) => GeoErrorCode::JsonParsing,
        }
    }
}
