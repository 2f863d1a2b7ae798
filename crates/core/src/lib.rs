//! Core utilities for the geosearch map search
//!
//! This crate provides functionality shared by the library crates and the CLI:
//!
//! - **Error handling**: Structured errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based configuration with defaults and validation
//! - **Retry policy**: Exponential backoff settings for transient failures
//!
//! # Example
//!
//! ```rust,no_run
//! use geosearch_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid configuration");
//! println!("Searching {}/{}", config.schema.index.endpoint, config.schema.index.name);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod retry;

pub use error::{exit_codes, Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema, IndexConfig, MapConfig, SearchConfig};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::retry::RetryConfig;
}
