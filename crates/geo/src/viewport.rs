//! Viewport math: pixel <-> coordinate mapping and the visible search extent.

use crate::extent::Extent;
use crate::projection::{extent_from_web_mercator, from_web_mercator, to_web_mercator, HALF_SIZE};
use crate::{round_to, Position};
use serde::{Deserialize, Serialize};

/// Resolution in meters per pixel at zoom level 0 (256 px tiles).
pub const MAX_RESOLUTION: f64 = 2.0 * HALF_SIZE / 256.0;

/// Decimal places kept for extents and centers derived from the map.
pub const EXTENT_PRECISION: i32 = 3;

/// A rendering surface that can map pixels to projected coordinates.
///
/// Pixel `(0, 0)` is the top-left corner of the map element.
pub trait MapSurface {
    /// Size of the surface in pixels, `[width, height]`.
    fn size(&self) -> [f64; 2];

    /// Projected (EPSG:3857) coordinate under `pixel`.
    fn coordinate_from_pixel(&self, pixel: [f64; 2]) -> Position;

    /// Pixel position of a projected (EPSG:3857) coordinate.
    fn pixel_from_coordinate(&self, coordinate: Position) -> [f64; 2];
}

/// Current map view: geographic center, zoom level and pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// `[lon, lat]` of the map center
    pub center: Position,
    /// Zoom level (fractional zooms are allowed)
    pub zoom: f64,
    /// `[width, height]` in pixels
    pub size: [f64; 2],
}

impl Viewport {
    /// Creates a new viewport.
    pub fn new(center: Position, zoom: f64, size: [f64; 2]) -> Self {
        Self { center, zoom, size }
    }

    /// Meters per pixel at the current zoom.
    #[inline]
    pub fn resolution(&self) -> f64 {
        MAX_RESOLUTION / 2f64.powf(self.zoom)
    }

    /// Projected center of the view.
    #[inline]
    pub fn projected_center(&self) -> Position {
        to_web_mercator(self.center)
    }

    /// Center rounded to [`EXTENT_PRECISION`] decimals.
    pub fn center_rounded(&self) -> Position {
        [
            round_to(self.center[0], EXTENT_PRECISION),
            round_to(self.center[1], EXTENT_PRECISION),
        ]
    }

    /// Returns true if `other` shows a different place or zoom level.
    ///
    /// Centers are compared after rounding so that sub-meter jitter from the
    /// map does not count as a move.
    pub fn differs_from(&self, other: &Viewport) -> bool {
        self.center_rounded() != other.center_rounded() || self.zoom != other.zoom
    }

    /// The visible geographic extent.
    pub fn extent(&self) -> Extent {
        extent_from_viewport(self, 0.0)
    }
}

impl MapSurface for Viewport {
    fn size(&self) -> [f64; 2] {
        self.size
    }

    fn coordinate_from_pixel(&self, [px, py]: [f64; 2]) -> Position {
        let [cx, cy] = self.projected_center();
        let resolution = self.resolution();
        [
            cx + (px - self.size[0] / 2.0) * resolution,
            cy - (py - self.size[1] / 2.0) * resolution,
        ]
    }

    fn pixel_from_coordinate(&self, [x, y]: Position) -> [f64; 2] {
        let [cx, cy] = self.projected_center();
        let resolution = self.resolution();
        [
            (x - cx) / resolution + self.size[0] / 2.0,
            (cy - y) / resolution + self.size[1] / 2.0,
        ]
    }
}

/// Computes the geographic extent visible on `surface`.
///
/// `offset_width` reserves that many pixels on the left edge (an overlaid
/// side panel); only the area to its right counts as visible. The result is
/// rounded to [`EXTENT_PRECISION`] decimals and is not antimeridian corrected.
///
/// # Example
/// ```
/// use geosearch_geo::{extent_from_viewport, Viewport};
///
/// let view = Viewport::new([13.7, 51.05], 10.0, [800.0, 600.0]);
/// let full = extent_from_viewport(&view, 0.0);
/// let narrowed = extent_from_viewport(&view, 300.0);
/// assert!(narrowed.min_lon > full.min_lon);
/// assert_eq!(narrowed.max_lon, full.max_lon);
/// ```
pub fn extent_from_viewport<S: MapSurface + ?Sized>(surface: &S, offset_width: f64) -> Extent {
    let [width, height] = surface.size();
    let offset = offset_width.clamp(0.0, width);

    let top_left = surface.coordinate_from_pixel([offset, 0.0]);
    let bottom_right = surface.coordinate_from_pixel([width, height]);

    let projected = Extent::new(top_left[0], bottom_right[1], bottom_right[0], top_left[1]);
    extent_from_web_mercator(&projected).rounded(EXTENT_PRECISION)
}

/// Converts a projected coordinate to a geographic one rounded for display.
pub fn rounded_lon_lat(coordinate: Position) -> Position {
    let [lon, lat] = from_web_mercator(coordinate);
    [round_to(lon, EXTENT_PRECISION), round_to(lat, EXTENT_PRECISION)]
}
