//! Geographic search extents.
//!
//! An extent is the bounding box `[min_lon, min_lat, max_lon, max_lat]` used as
//! the spatial part of every search. It serializes as a plain four-element array
//! and round-trips through the comma separated form used in shared URLs.

use crate::{GeoError, Position, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default inset fraction for [`shrink_extent`].
pub const DEFAULT_PADDING: f64 = 0.1;

/// A geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Extent {
    /// Western edge
    pub min_lon: f64,
    /// Southern edge
    pub min_lat: f64,
    /// Eastern edge
    pub max_lon: f64,
    /// Northern edge
    pub max_lat: f64,
}

impl Extent {
    /// Creates a new extent.
    #[inline]
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Returns the extent as `[min_lon, min_lat, max_lon, max_lat]`.
    #[inline]
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }

    /// Longitude span in degrees.
    #[inline]
    pub fn width(&self) -> f64 {
        (self.max_lon - self.min_lon).abs()
    }

    /// Latitude span in degrees.
    #[inline]
    pub fn height(&self) -> f64 {
        (self.max_lat - self.min_lat).abs()
    }

    /// Center of the extent.
    pub fn center(&self) -> Position {
        [
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        ]
    }

    /// Returns true if the position lies inside or on the border of the extent.
    pub fn contains(&self, position: Position) -> bool {
        position[0] >= self.min_lon
            && position[0] <= self.max_lon
            && position[1] >= self.min_lat
            && position[1] <= self.max_lat
    }

    /// Closed five point ring, counter-clockwise from the south-west corner.
    pub fn to_polygon_ring(&self) -> [Position; 5] {
        [
            [self.min_lon, self.min_lat],
            [self.max_lon, self.min_lat],
            [self.max_lon, self.max_lat],
            [self.min_lon, self.max_lat],
            [self.min_lon, self.min_lat],
        ]
    }

    /// Rounds every component to `places` decimal places.
    pub fn rounded(&self, places: i32) -> Self {
        Self::new(
            round_to(self.min_lon, places),
            round_to(self.min_lat, places),
            round_to(self.max_lon, places),
            round_to(self.max_lat, places),
        )
    }
}

impl From<[f64; 4]> for Extent {
    fn from([min_lon, min_lat, max_lon, max_lat]: [f64; 4]) -> Self {
        Self::new(min_lon, min_lat, max_lon, max_lat)
    }
}

impl From<Extent> for [f64; 4] {
    fn from(extent: Extent) -> Self {
        extent.to_array()
    }
}

impl TryFrom<&[f64]> for Extent {
    type Error = GeoError;

    fn try_from(values: &[f64]) -> Result<Self> {
        match values {
            [min_lon, min_lat, max_lon, max_lat] => {
                Ok(Self::new(*min_lon, *min_lat, *max_lon, *max_lat))
            }
            _ => Err(GeoError::InvalidExtent(values.len())),
        }
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

impl FromStr for Extent {
    type Err = GeoError;

    /// Parses the `min_lon,min_lat,max_lon,max_lat` form.
    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split(',')
            .map(|part| {
                let part = part.trim();
                part.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| GeoError::InvalidCoordinate(format!("not a number: {part:?}")))
            })
            .collect::<Result<Vec<f64>>>()?;

        Self::try_from(values.as_slice())
    }
}

/// Corrects an extent that crosses the datum border.
///
/// The search index rejects longitudes outside `[-180, 180]`. A western edge
/// beyond the range is moved to `-180` (or `179` when it overshoots east), an
/// eastern edge to `180` (or `-179` when it overshoots west). Latitudes are
/// never altered.
pub fn fix_extent(extent: Extent) -> Extent {
    let min_lon = if extent.min_lon < -180.0 {
        -180.0
    } else if extent.min_lon > 180.0 {
        179.0
    } else {
        extent.min_lon
    };

    let max_lon = if extent.max_lon < -180.0 {
        -179.0
    } else if extent.max_lon > 180.0 {
        180.0
    } else {
        extent.max_lon
    };

    Extent::new(min_lon, extent.min_lat, max_lon, extent.max_lat)
}

/// Insets all four sides by `padding` times the span of the respective axis.
pub fn shrink_extent(extent: Extent, padding: f64) -> Extent {
    let padding_lon = (extent.max_lon - extent.min_lon).abs() * padding;
    let padding_lat = (extent.max_lat - extent.min_lat).abs() * padding;
    Extent::new(
        extent.min_lon + padding_lon,
        extent.min_lat + padding_lat,
        extent.max_lon - padding_lon,
        extent.max_lat - padding_lat,
    )
}

/// Rounds `value` to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fix_extent_inside_range_is_identity() {
        let e = Extent::new(-3.44, 40.848, 22.641, 57.576);
        assert_eq!(fix_extent(e), e);
    }

    #[test]
    fn test_fix_extent_clamps_east_overflow() {
        let e = Extent::new(-154.972, -76.59, 261.299, 89.293);
        let fixed = fix_extent(e);
        assert_eq!(fixed.min_lon, -154.972);
        assert_eq!(fixed.min_lat, -76.59);
        assert_eq!(fixed.max_lon, 180.0);
        assert_eq!(fixed.max_lat, 89.293);
    }

    #[test]
    fn test_fix_extent_clamps_both_sides() {
        let fixed = fix_extent(Extent::new(-254.972, -76.59, 261.299, 89.293));
        assert_eq!(fixed.min_lon, -180.0);
        assert_eq!(fixed.max_lon, 180.0);
    }

    #[test]
    fn test_fix_extent_wrapped_edges() {
        let fixed = fix_extent(Extent::new(190.0, 0.0, -200.0, 1.0));
        assert_eq!(fixed.min_lon, 179.0);
        assert_eq!(fixed.max_lon, -179.0);
    }

    #[test]
    fn test_shrink_extent_default_padding() {
        let subject = shrink_extent(Extent::new(12.423, 50.396, 12.491, 50.428), DEFAULT_PADDING);
        assert_eq!(subject.min_lon, 12.4298);
        assert_eq!(subject.min_lat, 50.3992);
        assert_eq!(subject.max_lon, 12.4842);
        assert_eq!(subject.max_lat, 50.4248);
    }

    #[test]
    fn test_try_from_slice() {
        assert!(Extent::try_from(&[1.0, 2.0, 3.0, 4.0][..]).is_ok());
        assert!(matches!(
            Extent::try_from(&[1.0, 2.0, 3.0][..]),
            Err(GeoError::InvalidExtent(3))
        ));
    }

    #[test]
    fn test_parse_and_display() {
        let e: Extent = "12.423, 50.396,12.491,50.428".parse().unwrap();
        assert_eq!(e, Extent::new(12.423, 50.396, 12.491, 50.428));
        assert_eq!(e.to_string(), "12.423,50.396,12.491,50.428");

        assert!(matches!("1,2,3".parse::<Extent>(), Err(GeoError::InvalidExtent(3))));
        assert!(matches!("1,x,3,4".parse::<Extent>(), Err(GeoError::InvalidCoordinate(_))));
    }

    #[test]
    fn test_serde_as_array() {
        let e = Extent::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(serde_json::to_string(&e).unwrap(), "[1.0,2.0,3.0,4.0]");
        let back: Extent = serde_json::from_str("[1,2,3,4]").unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn test_polygon_ring_is_closed() {
        let ring = Extent::new(-3.44, 40.848, 22.641, 57.576).to_polygon_ring();
        assert_eq!(ring[0], ring[4]);
        assert_eq!(ring[2], [22.641, 57.576]);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.34567, 3), 12.346);
        assert_eq!(round_to(-0.0004, 3), 0.0);
    }

    proptest! {
        #[test]
        fn prop_fix_extent_never_touches_latitude(
            min_lon in -720.0f64..720.0,
            min_lat in -90.0f64..90.0,
            max_lon in -720.0f64..720.0,
            max_lat in -90.0f64..90.0,
        ) {
            let fixed = fix_extent(Extent::new(min_lon, min_lat, max_lon, max_lat));
            prop_assert_eq!(fixed.min_lat, min_lat);
            prop_assert_eq!(fixed.max_lat, max_lat);
            prop_assert!(fixed.min_lon >= -180.0 && fixed.min_lon <= 180.0);
            prop_assert!(fixed.max_lon >= -180.0 && fixed.max_lon <= 180.0);
        }

        #[test]
        fn prop_fix_extent_identity_in_range(
            min_lon in -180.0f64..=180.0,
            max_lon in -180.0f64..=180.0,
        ) {
            let e = Extent::new(min_lon, 0.0, max_lon, 1.0);
            prop_assert_eq!(fix_extent(e), e);
        }

        #[test]
        fn prop_shrink_extent_stays_inside(
            min_lon in -180.0f64..0.0,
            min_lat in -90.0f64..0.0,
            w in 0.001f64..180.0,
            h in 0.001f64..90.0,
        ) {
            let e = Extent::new(min_lon, min_lat, min_lon + w, min_lat + h);
            let inner = shrink_extent(e, DEFAULT_PADDING);
            prop_assert!(inner.min_lon >= e.min_lon && inner.max_lon <= e.max_lon);
            prop_assert!(inner.min_lat >= e.min_lat && inner.max_lat <= e.max_lat);
        }
    }
}
