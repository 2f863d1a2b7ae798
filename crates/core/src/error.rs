//! Structured error handling with context and recovery suggestions
//!
//! This module provides structured error types with:
//! - Error codes for programmatic handling
//! - Detailed error context
//! - Recovery suggestions

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // General errors (1xxx)
    /// Cause not classified
    Unknown = 1000,
    /// Broken invariant inside geosearch
    Internal = 1001,
    /// The index did not answer in time
    Timeout = 1003,

    // IO errors (2xxx)
    /// Reading or writing a file failed
    IoError = 2000,
    /// A file does not exist
    FileNotFound = 2001,
    /// A file exists but may not be read or written
    PermissionDenied = 2002,

    // Configuration errors (3xxx)
    /// Configuration could not be loaded
    ConfigError = 3000,
    /// An explicitly given configuration file does not exist
    ConfigNotFound = 3001,
    /// Configuration file is not valid TOML or JSON
    ConfigParseError = 3002,
    /// Configuration sections contradict each other
    ConfigValidationError = 3003,
    /// A configuration value is out of range
    InvalidConfigValue = 3004,

    // Search index errors (4xxx)
    /// The search did not produce a result
    IndexError = 4000,
    /// The index could not be reached
    IndexUnreachable = 4001,
    /// The index answered with an error or an unreadable body
    IndexResponseError = 4002,
    /// Spatial predicate other than `within` or `intersects`
    InvalidSpatialMode = 4003,

    // Document errors (5xxx)
    /// A document could not be read
    DocumentError = 5000,
    /// A document lacks its id or geometry
    MissingField = 5001,
    /// A document geometry is not valid GeoJSON
    InvalidGeometry = 5002,

    // Geometry errors (6xxx)
    /// Geometry arithmetic failed
    GeometryError = 6000,
    /// Geometry type that cannot be reduced to a point
    UnsupportedGeometry = 6001,
    /// Extent that is not four numbers
    InvalidExtent = 6002,
    /// Coordinate outside the valid range
    InvalidCoordinate = 6003,

    // Validation errors (7xxx)
    /// Command line input could not be used
    ValidationError = 7000,
    /// A single input value is malformed
    InvalidInput = 7001,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            1 => "General",
            2 => "IO",
            3 => "Configuration",
            4 => "Search index",
            5 => "Document",
            6 => "Geometry",
            7 => "Validation",
            _ => "Unknown",
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self.code() / 1000 {
            3 => exit_codes::CONFIG_ERROR,
            4 => exit_codes::INDEX_ERROR,
            5 | 6 | 7 => exit_codes::VALIDATION_ERROR,
            _ if *self == Self::Timeout => exit_codes::TIMEOUT,
            _ => exit_codes::FAILURE,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {ctx}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {suggestion}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors

    /// Configuration could not be loaded
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// An explicitly given configuration file does not exist
    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a .geosearch.toml file or use --config to specify a path")
    }

    /// A configuration value is out of range
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfigValue, message)
    }

    /// The search did not produce a result
    pub fn index(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IndexError, message)
    }

    /// Command line input could not be used
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
pub mod exit_codes {
    /// Command completed
    pub const SUCCESS: i32 = 0;
    /// Any failure without a more specific code
    pub const FAILURE: i32 = 1;
    /// Bad command line input or unusable documents
    pub const VALIDATION_ERROR: i32 = 2;
    /// Configuration missing or invalid
    pub const CONFIG_ERROR: i32 = 3;
    /// The search index failed
    pub const INDEX_ERROR: i32 = 4;
    /// The index did not answer in time
    pub const TIMEOUT: i32 = 124;
}

// Implement From for common error types

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("JSON parse error: {err}")).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {err}")).with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Attach context to the error
    fn context(self, context: impl Into<String>) -> Result<T>;
    /// Attach a recovery suggestion to the error
    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_suggestion(suggestion))
    }
}
