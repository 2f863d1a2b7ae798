//! Search index client for the map search
//!
//! This crate provides a resilient HTTP client for a Solr `select` handler and
//! the scheduling around it.
//!
//! # Features
//!
//! - **Environment-based configuration**: Load endpoint, index and limits from environment variables
//! - **Spatial queries**: `IsWithin`/`Intersects` filters over a search rectangle plus full-text prefixes
//! - **Retry with exponential backoff**: Automatic retry for transient failures
//! - **Request correlation**: Track requests with unique IDs for debugging
//! - **Debounced search**: One pending request at a time, superseded requests never deliver
//!
//! # Example
//!
//! ```rust,no_run
//! use geosearch_client::{SearchController, SearchFilters, SearchRequest, SolrClient, SpatialMode};
//! use geosearch_geo::Extent;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SolrClient::new()?;
//!     let controller = SearchController::with_client(client, Duration::from_millis(50));
//!
//!     let request = SearchRequest::new(
//!         Extent::new(12.0, 50.0, 15.0, 52.0),
//!         SpatialMode::Within,
//!         SearchFilters::default(),
//!     );
//!     controller.search(&request, |_generation, response| {
//!         println!("{} documents found", response.num_found);
//!     });
//!
//!     tokio::time::sleep(Duration::from_secs(2)).await;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod query;

pub use client::{SolrClient, Transport};
pub use config::ClientConfig;
pub use controller::{Outcome, SearchController, Settled, SlotState, DEFAULT_DEBOUNCE};
pub use error::{ApiError, ApiResult};
pub use geosearch_documents::SearchResponse;
pub use query::{QueryBuilder, SearchFilters, SearchRequest, SpatialMode, MAP_TYPE_FILTER};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::{SolrClient, Transport};
    pub use crate::config::ClientConfig;
    pub use crate::controller::{Outcome, SearchController, Settled, SlotState};
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::query::{QueryBuilder, SearchFilters, SearchRequest, SpatialMode};
}
