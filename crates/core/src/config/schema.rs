//! Configuration schema definitions
//!
//! Every field has a serde default so partial files are valid.

use crate::error::{Error, Result};
use crate::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// `[index]`: where and how to query
    #[serde(default)]
    pub index: IndexConfig,

    /// `[map]`: initial view and pointer settings
    #[serde(default)]
    pub map: MapConfig,

    /// `[search]`: search scheduling and initial filters
    #[serde(default)]
    pub search: SearchConfig,
}

impl ConfigSchema {
    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.index.validate()?;
        self.map.validate()?;
        self.search.validate()
    }
}

/// Search index connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Base URL of the Solr server
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Core or collection name
    #[serde(default = "default_index_name")]
    pub name: String,

    /// Field holding the document geometry
    #[serde(default = "default_geometry_field")]
    pub geometry_field: String,

    /// `distErrPct` sent with containment queries
    #[serde(default)]
    pub dist_err_pct: f64,

    /// Maximum rows returned per search
    #[serde(default = "default_max_rows")]
    pub max_rows: u32,

    /// Filter query restricting results to public documents
    #[serde(default = "default_visibility_filter")]
    pub visibility_filter: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry policy for transient transport failures
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            name: default_index_name(),
            geometry_field: default_geometry_field(),
            dist_err_pct: 0.0,
            max_rows: default_max_rows(),
            visibility_filter: default_visibility_filter(),
            timeout_secs: default_timeout_secs(),
            retry: RetryConfig::default(),
        }
    }
}

impl IndexConfig {
    fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(Error::invalid_config("index.endpoint cannot be empty"));
        }
        if self.name.is_empty() {
            return Err(Error::invalid_config("index.name cannot be empty"));
        }
        if self.geometry_field.is_empty() {
            return Err(Error::invalid_config("index.geometry_field cannot be empty"));
        }
        if !(0.0..=0.5).contains(&self.dist_err_pct) {
            return Err(Error::invalid_config(format!(
                "index.dist_err_pct must be within 0.0..=0.5, got {}",
                self.dist_err_pct
            )));
        }
        if self.max_rows == 0 {
            return Err(Error::invalid_config("index.max_rows must be positive"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::invalid_config("index.timeout_secs must be positive"));
        }
        self.retry.validate()
    }
}

fn default_endpoint() -> String {
    "http://localhost:8983/solr".to_string()
}

fn default_index_name() -> String {
    "maps".to_string()
}

fn default_geometry_field() -> String {
    "geom".to_string()
}

fn default_max_rows() -> u32 {
    10_000
}

fn default_visibility_filter() -> String {
    "accessCondition_uui:nein".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Map surface settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Initial center `[lon, lat]`
    #[serde(default = "default_center")]
    pub center: [f64; 2],

    /// Initial zoom level
    #[serde(default = "default_zoom")]
    pub zoom: f64,

    /// Pixels on the left reserved for the overlaid panel
    #[serde(default)]
    pub offset_width: f64,

    /// Pick tolerance around the cursor in pixels
    #[serde(default = "default_pick_radius")]
    pub pick_radius_px: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: default_center(),
            zoom: default_zoom(),
            offset_width: 0.0,
            pick_radius_px: default_pick_radius(),
        }
    }
}

impl MapConfig {
    fn validate(&self) -> Result<()> {
        let [lon, lat] = self.center;
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(Error::invalid_config(format!(
                "map.center [{lon}, {lat}] is not a geographic position"
            )));
        }
        if !(0.0..=28.0).contains(&self.zoom) {
            return Err(Error::invalid_config(format!(
                "map.zoom must be within 0..=28, got {}",
                self.zoom
            )));
        }
        if self.offset_width < 0.0 || self.pick_radius_px < 0.0 {
            return Err(Error::invalid_config(
                "map.offset_width and map.pick_radius_px cannot be negative",
            ));
        }
        Ok(())
    }
}

fn default_center() -> [f64; 2] {
    [13.7373, 51.0504]
}

fn default_zoom() -> f64 {
    8.0
}

fn default_pick_radius() -> f64 {
    7.0
}

/// Search behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Delay before a scheduled search is sent, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// `within` or `intersects`
    #[serde(default = "default_spatial_mode")]
    pub spatial_mode: String,

    /// Restrict results to documents of type map
    #[serde(default)]
    pub only_maps: bool,

    /// Restrict results to public documents
    #[serde(default)]
    pub only_public: bool,

    /// Search automatically whenever the map settles
    #[serde(default = "default_true")]
    pub auto_search: bool,

    /// Sort the sidebar by geometry kind
    #[serde(default)]
    pub sort_by_geometry: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            spatial_mode: default_spatial_mode(),
            only_maps: false,
            only_public: false,
            auto_search: true,
            sort_by_geometry: false,
        }
    }
}

impl SearchConfig {
    /// Delay between scheduling a search and sending it
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    fn validate(&self) -> Result<()> {
        match self.spatial_mode.as_str() {
            "within" | "intersects" => Ok(()),
            other => Err(Error::invalid_config(format!(
                "search.spatial_mode must be \"within\" or \"intersects\", got \"{other}\""
            ))),
        }
    }
}

fn default_debounce_ms() -> u64 {
    50
}

fn default_spatial_mode() -> String {
    "within".to_string()
}

fn default_true() -> bool {
    true
}
