//! Search index documents for the map search.
//!
//! This crate provides:
//! - Normalization of raw index records into canonical documents
//! - CSV export of document lists
//! - Projection to map features and reduction to display points
//! - The result set of a search and the sidebar ordering
//!
//! # Example
//!
//! ```
//! use geosearch_documents::{DocumentParser, ResultSet, SearchResponse};
//!
//! let body = r#"{"response": {"numFound": 1, "docs": [
//!     {"id": "d1", "title": ["Sheet"], "geom": ["{'type':'Feature','geometry':{'type':'Point','coordinates':[13.7,51.05]}}"]}
//! ]}}"#;
//! let response = SearchResponse::from_json(body).unwrap();
//! let results = ResultSet::from_response(response, &DocumentParser::default());
//! assert_eq!(results.len(), 1);
//! assert_eq!(results.features()[0].document.properties.title.as_deref(), Some("Sheet"));
//! ```

mod error;
mod export;
mod parser;
mod reduce;
mod result_set;
mod sort;

pub use error::{DocumentError, Result};
pub use export::{escape_field, to_csv, CSV_HEADER};
pub use parser::{
    scalar, CanonicalDocument, DocumentParser, DocumentProperties, RawRecord,
    ACCESS_CONDITION_FIELD, DEFAULT_GEOMETRY_FIELD, RESTRICTED_VALUE, UNRESTRICTED_VALUE,
};
pub use reduce::{
    project_feature, reduce_document, reduce_to_point, MapFeature, ProjectedFeature, SHAPE_PREFIX,
};
pub use result_set::{ResponseEnvelope, ResultSet, SearchResponse};
pub use sort::{geometry_rank, sort_by_geometry, sorted_by_geometry};
