//! WASM bindings for the geo crate.
//!
//! These bindings allow the extent helpers to be used from the map front end
//! in the browser. Extents travel as JSON arrays `[minLon, minLat, maxLon, maxLat]`.

use crate::{centroid, fix_extent, shrink_extent, Extent, Geometry};
use wasm_bindgen::prelude::*;

fn parse_extent(extent_json: &str) -> Result<Extent, JsValue> {
    let values: Vec<f64> = serde_json::from_str(extent_json)
        .map_err(|e| JsValue::from_str(&format!("JSON parse error: {}", e)))?;
    Extent::try_from(values.as_slice()).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("JSON serialize error: {}", e)))
}

/// Correct an extent at the datum border.
///
/// # Arguments
/// * `extent_json` - JSON array with four numbers
///
/// # Returns
/// JSON array of the corrected extent
#[wasm_bindgen(js_name = fixExtent)]
pub fn fix_extent_js(extent_json: &str) -> Result<String, JsValue> {
    let extent = parse_extent(extent_json)?;
    to_json(&fix_extent(extent))
}

/// Inset an extent by a fraction of its spans.
#[wasm_bindgen(js_name = shrinkExtent)]
pub fn shrink_extent_js(extent_json: &str, padding: f64) -> Result<String, JsValue> {
    let extent = parse_extent(extent_json)?;
    to_json(&shrink_extent(extent, padding))
}

/// Vertex-mean centroid of a GeoJSON LineString or Polygon.
///
/// # Arguments
/// * `geometry_json` - GeoJSON geometry object
///
/// # Returns
/// JSON array `[lon, lat]`
#[wasm_bindgen(js_name = calculateCentroid)]
pub fn centroid_js(geometry_json: &str) -> Result<String, JsValue> {
    let geometry: Geometry = serde_json::from_str(geometry_json)
        .map_err(|e| JsValue::from_str(&format!("JSON parse error: {}", e)))?;
    let point = centroid(&geometry).map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_json(&point)
}
