//! Spherical web mercator (EPSG:3857) projection.
//!
//! The basemap works in EPSG:3857 while the search index stores EPSG:4326
//! longitude/latitude. These functions convert between the two the same way
//! the tile grid of the map does.

use crate::{Extent, Geometry, Position};
use std::f64::consts::PI;

/// Radius of the web mercator sphere in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Half the width of the projected world in meters.
pub const HALF_SIZE: f64 = PI * EARTH_RADIUS_M;

/// Projects a `[lon, lat]` position to web mercator meters.
///
/// Latitudes beyond the mercator limit (about ±85.05°) are clamped to the
/// edge of the projected world. Longitudes are not wrapped.
///
/// # Example
/// ```
/// use geosearch_geo::{from_web_mercator, to_web_mercator};
///
/// let projected = to_web_mercator([13.405, 52.52]);
/// let back = from_web_mercator(projected);
/// assert!((back[0] - 13.405).abs() < 1e-9);
/// assert!((back[1] - 52.52).abs() < 1e-9);
/// ```
#[inline]
pub fn to_web_mercator([lon, lat]: Position) -> Position {
    let x = EARTH_RADIUS_M * PI * lon / 180.0;
    let y = EARTH_RADIUS_M * (PI * (lat + 90.0) / 360.0).tan().ln();
    [x, y.clamp(-HALF_SIZE, HALF_SIZE)]
}

/// Converts web mercator meters back to a `[lon, lat]` position.
#[inline]
pub fn from_web_mercator([x, y]: Position) -> Position {
    let lon = 180.0 * x / HALF_SIZE;
    let lat = 360.0 * (y / EARTH_RADIUS_M).exp().atan() / PI - 90.0;
    [lon, lat]
}

/// Projects every coordinate of a geographic geometry.
pub fn geometry_to_web_mercator(geometry: &Geometry) -> Geometry {
    geometry.map_positions(to_web_mercator)
}

/// Projects an extent corner by corner.
pub fn extent_to_web_mercator(extent: &Extent) -> Extent {
    let [min_x, min_y] = to_web_mercator([extent.min_lon, extent.min_lat]);
    let [max_x, max_y] = to_web_mercator([extent.max_lon, extent.max_lat]);
    Extent::new(min_x, min_y, max_x, max_y)
}

/// Converts a projected extent back to geographic coordinates.
pub fn extent_from_web_mercator(extent: &Extent) -> Extent {
    let [min_lon, min_lat] = from_web_mercator([extent.min_lon, extent.min_lat]);
    let [max_lon, max_lat] = from_web_mercator([extent.max_lon, extent.max_lat]);
    Extent::new(min_lon, min_lat, max_lon, max_lat)
}
