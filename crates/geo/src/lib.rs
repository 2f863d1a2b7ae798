//! Geospatial utilities for the map search.
//!
//! This crate provides:
//! - Search extents with antimeridian correction and padding
//! - GeoJSON geometries and vertex-mean centroids
//! - EPSG:4326 <-> EPSG:3857 (web mercator) projection
//! - Viewport math for deriving the visible extent of a map
//! - WASM bindings for browser usage
//!
//! # Example
//!
//! ```
//! use geosearch_geo::{fix_extent, shrink_extent, Extent};
//!
//! let extent = Extent::new(-254.972, -76.59, 261.299, 89.293);
//! let fixed = fix_extent(extent);
//! assert_eq!(fixed.min_lon, -180.0);
//! assert_eq!(fixed.max_lon, 180.0);
//!
//! let inner = shrink_extent(Extent::new(0.0, 0.0, 10.0, 10.0), 0.1);
//! assert_eq!(inner, Extent::new(1.0, 1.0, 9.0, 9.0));
//! ```

mod error;
mod extent;
mod geometry;
pub mod projection;
mod viewport;

#[cfg(feature = "wasm")]
mod wasm;

pub use error::{GeoError, GeoErrorCode, Result};
pub use extent::{fix_extent, round_to, shrink_extent, Extent, DEFAULT_PADDING};
pub use geometry::{centroid, Geometry, GeometryType};
pub use projection::{from_web_mercator, to_web_mercator};
pub use viewport::{
    extent_from_viewport, rounded_lon_lat, MapSurface, Viewport, EXTENT_PRECISION, MAX_RESOLUTION,
};

/// A `[x, y]` position. Geographic positions are `[lon, lat]` in degrees,
/// projected positions are web-mercator meters.
pub type Position = [f64; 2];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports_compose() {
        let extent = fix_extent(Extent::new(-3.44, 40.848, 22.641, 57.576));
        let projected = projection::extent_to_web_mercator(&extent);
        let back = projection::extent_from_web_mercator(&projected);
        assert!((back.min_lon - extent.min_lon).abs() < 1e-9);
        assert!((back.max_lat - extent.max_lat).abs() < 1e-9);
    }

    #[test]
    fn test_position_is_lon_lat() {
        let p: Position = [13.405, 52.52];
        let projected = to_web_mercator(p);
        assert!(projected[0] > 0.0);
        assert!(projected[1] > projected[0]);
    }
}
