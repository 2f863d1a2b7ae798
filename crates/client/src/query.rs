//! Solr `select` query construction.
//!
//! A search is one fixed spatial predicate over the extent's rectangle plus
//! optional type, visibility and prefix full-text filters.

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use geosearch_geo::{fix_extent, Extent};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Filter restricting results to map documents.
pub const MAP_TYPE_FILTER: &str = "type:map";

/// How document geometries relate to the search rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpatialMode {
    /// Geometry lies completely inside the rectangle
    #[default]
    Within,
    /// Geometry overlaps the rectangle
    Intersects,
}

impl SpatialMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Within => "within",
            Self::Intersects => "intersects",
        }
    }
}

impl fmt::Display for SpatialMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpatialMode {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "within" => Ok(Self::Within),
            "intersects" => Ok(Self::Intersects),
            other => Err(ApiError::InvalidSpatialMode(other.to_string())),
        }
    }
}

/// Optional restrictions on top of the spatial predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Only documents of type map
    #[serde(default)]
    pub only_maps: bool,
    /// Only public documents
    #[serde(default)]
    pub only_public: bool,
    /// Full-text terms, each matched as a prefix
    #[serde(default)]
    pub terms: Vec<String>,
}

impl SearchFilters {
    /// Splits free text into terms on whitespace.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.terms = text.split_whitespace().map(str::to_string).collect();
        self
    }
}

/// Everything needed to run one search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub extent: Extent,
    pub mode: SpatialMode,
    pub filters: SearchFilters,
}

impl SearchRequest {
    pub fn new(extent: Extent, mode: SpatialMode, filters: SearchFilters) -> Self {
        Self {
            extent,
            mode,
            filters,
        }
    }
}

/// Builds `select` URLs for one index.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    select_url: Url,
    geometry_field: String,
    dist_err_pct: f64,
    max_rows: u32,
    visibility_filter: String,
}

impl QueryBuilder {
    /// # Errors
    ///
    /// [`ApiError::InvalidUrl`] when endpoint and index do not form a URL.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let select_url = config.select_url();
        let select_url =
            Url::parse(&select_url).map_err(|e| ApiError::InvalidUrl(format!("{select_url}: {e}")))?;
        Ok(Self {
            select_url,
            geometry_field: config.geometry_field.clone(),
            dist_err_pct: config.dist_err_pct,
            max_rows: config.max_rows,
            visibility_filter: config.visibility_filter.clone(),
        })
    }

    /// The spatial `fq` value for `extent`, before URL encoding.
    ///
    /// The rectangle is sent as a closed five-point GeoJSON ring written with
    /// single quotes. The extent is used as given.
    ///
    /// # Example
    /// ```
    /// use geosearch_client::{ClientConfig, QueryBuilder, SpatialMode};
    /// use geosearch_geo::Extent;
    ///
    /// let queries = QueryBuilder::new(&ClientConfig::default()).unwrap();
    /// let fq = queries.spatial_filter(&Extent::new(0.0, 0.0, 1.0, 1.0), SpatialMode::Intersects);
    /// assert!(fq.starts_with("geom:\"Intersects({'type':'Polygon'"));
    /// ```
    pub fn spatial_filter(&self, extent: &Extent, mode: SpatialMode) -> String {
        let ring = extent
            .to_polygon_ring()
            .iter()
            .map(|[x, y]| format!("[{x}, {y}]"))
            .collect::<Vec<_>>()
            .join(",");
        let polygon = format!("{{'type':'Polygon','coordinates':[[{ring}]]}}");

        match mode {
            SpatialMode::Intersects => {
                format!("{}:\"Intersects({polygon})\"", self.geometry_field)
            }
            SpatialMode::Within => format!(
                "{}:\"IsWithin({polygon}) distErrPct={}\"",
                self.geometry_field, self.dist_err_pct
            ),
        }
    }

    /// Like [`QueryBuilder::spatial_filter`], from raw components.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidExtent`] unless `extent` has four components,
    /// [`ApiError::InvalidSpatialMode`] for an unknown mode.
    pub fn spatial_filter_from_parts(&self, extent: &[f64], mode: &str) -> Result<String, ApiError> {
        let mode: SpatialMode = mode.parse()?;
        let extent = Extent::try_from(extent)?;
        Ok(self.spatial_filter(&extent, mode))
    }

    /// Prefix AND query over `terms`, or `None` without terms.
    pub fn fulltext_filter(terms: &[String]) -> Option<String> {
        let terms: Vec<String> = terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(|t| format!("{t}*"))
            .collect();
        (!terms.is_empty()).then(|| terms.join(" AND "))
    }

    /// Full `select` URL for a search.
    ///
    /// The extent is corrected with [`fix_extent`] first. Every parameter
    /// value is percent-encoded, so terms may contain any character.
    pub fn search_url(&self, request: &SearchRequest) -> String {
        let extent = fix_extent(request.extent);
        let mut url = self.select_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("q", "*:*")
                .append_pair("fq", &self.spatial_filter(&extent, request.mode));
            if request.filters.only_maps {
                query.append_pair("fq", MAP_TYPE_FILTER);
            }
            if request.filters.only_public {
                query.append_pair("fq", &self.visibility_filter);
            }
            if let Some(fulltext) = Self::fulltext_filter(&request.filters.terms) {
                query.append_pair("fq", &fulltext);
            }
            query
                .append_pair("start", "0")
                .append_pair("rows", &self.max_rows.to_string());
        }
        url.into()
    }
}
