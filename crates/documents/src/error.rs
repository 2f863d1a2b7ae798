//! Error types for the documents crate.

use geosearch_geo::GeoError;
use thiserror::Error;

/// Result type alias for document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Errors that can occur while parsing or reducing documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// A required field is absent
    #[error("Document is missing relevant \"{0}\" field")]
    MissingField(String),

    /// The geometry field could not be decoded
    #[error("Invalid geometry in document {id}: {reason}")]
    InvalidGeometry {
        /// Document id
        id: String,
        /// What went wrong
        reason: String,
    },

    /// Geometry operation failed
    #[error(transparent)]
    Geo(#[from] GeoError),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DocumentError {
    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Create an invalid geometry error
    pub fn invalid_geometry(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
