//! Search responses and the reduced result set built from them.

use crate::parser::{CanonicalDocument, DocumentParser, RawRecord};
use crate::reduce::{reduce_document, ProjectedFeature};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Result payload of a search: the returned documents and the total hit count.
///
/// `num_found` may exceed `docs.len()` when the index capped the rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub docs: Vec<RawRecord>,
    #[serde(rename = "numFound", default)]
    pub num_found: u64,
}

/// Wire shapes accepted for a [`SearchResponse`].
///
/// Solr wraps the payload in a `response` member; proxies may forward it bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    Select { response: SearchResponse },
    Bare(SearchResponse),
}

impl From<ResponseEnvelope> for SearchResponse {
    fn from(envelope: ResponseEnvelope) -> Self {
        match envelope {
            ResponseEnvelope::Select { response } | ResponseEnvelope::Bare(response) => response,
        }
    }
}

impl SearchResponse {
    /// Decodes either wire shape.
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<ResponseEnvelope>(body).map(Into::into)
    }
}

/// The ordered features of one completed search.
///
/// Replaced as a whole on every delivery; never merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    features: Vec<ProjectedFeature>,
    total: u64,
}

impl ResultSet {
    /// Creates a result set from already reduced features.
    pub fn new(features: Vec<ProjectedFeature>, total: u64) -> Self {
        Self { features, total }
    }

    /// Parses and reduces every document of a response.
    ///
    /// Documents that fail parsing or reduction are skipped and logged.
    pub fn from_response(response: SearchResponse, parser: &DocumentParser) -> Self {
        let received = response.docs.len();

        #[cfg(feature = "parallel")]
        let features: Vec<ProjectedFeature> = response
            .docs
            .into_par_iter()
            .filter_map(|raw| reduce_record(raw, parser))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let features: Vec<ProjectedFeature> = response
            .docs
            .into_iter()
            .filter_map(|raw| reduce_record(raw, parser))
            .collect();

        debug!(
            received,
            reduced = features.len(),
            total = response.num_found,
            "Built result set"
        );
        Self::new(features, response.num_found)
    }

    /// Features in result order.
    pub fn features(&self) -> &[ProjectedFeature] {
        &self.features
    }

    /// Source documents in result order.
    pub fn documents(&self) -> impl Iterator<Item = &CanonicalDocument> + '_ {
        self.features.iter().map(|f| f.document.as_ref())
    }

    /// Looks up a feature by id.
    pub fn get(&self, id: &str) -> Option<&ProjectedFeature> {
        self.features.iter().find(|f| f.id == id)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Total hits reported by the index.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// True if the index found more documents than were returned.
    pub fn is_truncated(&self) -> bool {
        self.total > self.features.len() as u64
    }
}

fn reduce_record(raw: RawRecord, parser: &DocumentParser) -> Option<ProjectedFeature> {
    let id = raw.get("id").cloned();
    match parser
        .parse(raw)
        .and_then(|doc| reduce_document(Arc::new(doc)))
    {
        Ok(feature) => Some(feature),
        Err(e) => {
            warn!(id = ?id, error = %e, "Skipping document");
            None
        }
    }
}
