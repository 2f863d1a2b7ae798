//! GeoJSON geometries and vertex-mean centroids.

use crate::{GeoError, Position, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of a GeoJSON geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryType {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
}

impl GeometryType {
    /// The GeoJSON `type` member for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryType::Point => "Point",
            GeometryType::LineString => "LineString",
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::MultiPolygon => "MultiPolygon",
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeometryType {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Point" => Ok(GeometryType::Point),
            "LineString" => Ok(GeometryType::LineString),
            "Polygon" => Ok(GeometryType::Polygon),
            "MultiPoint" => Ok(GeometryType::MultiPoint),
            "MultiLineString" => Ok(GeometryType::MultiLineString),
            "MultiPolygon" => Ok(GeometryType::MultiPolygon),
            other => Err(GeoError::InvalidCoordinate(format!(
                "unknown geometry type: {other}"
            ))),
        }
    }
}

/// A GeoJSON geometry: `{"type": "...", "coordinates": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    LineString(Vec<Position>),
    Polygon(Vec<Vec<Position>>),
    MultiPoint(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl Geometry {
    /// Returns the kind of this geometry.
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point(_) => GeometryType::Point,
            Geometry::LineString(_) => GeometryType::LineString,
            Geometry::Polygon(_) => GeometryType::Polygon,
            Geometry::MultiPoint(_) => GeometryType::MultiPoint,
            Geometry::MultiLineString(_) => GeometryType::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryType::MultiPolygon,
        }
    }

    /// Applies `f` to every position, keeping the structure.
    pub fn map_positions<F>(&self, f: F) -> Geometry
    where
        F: Fn(Position) -> Position,
    {
        let line = |l: &Vec<Position>| l.iter().copied().map(&f).collect::<Vec<_>>();
        let rings = |r: &Vec<Vec<Position>>| r.iter().map(line).collect::<Vec<_>>();

        match self {
            Geometry::Point(p) => Geometry::Point(f(*p)),
            Geometry::LineString(l) => Geometry::LineString(line(l)),
            Geometry::Polygon(r) => Geometry::Polygon(rings(r)),
            Geometry::MultiPoint(l) => Geometry::MultiPoint(line(l)),
            Geometry::MultiLineString(r) => Geometry::MultiLineString(rings(r)),
            Geometry::MultiPolygon(p) => Geometry::MultiPolygon(p.iter().map(rings).collect()),
        }
    }
}

/// Calculates the centroid of a LineString or Polygon as the arithmetic mean
/// of its vertices.
///
/// For polygons only the outer ring is used, including its closing vertex.
///
/// # Example
/// ```
/// use geosearch_geo::{centroid, Geometry};
///
/// let line = Geometry::LineString(vec![[0.0, 0.0], [2.0, 4.0]]);
/// assert_eq!(centroid(&line).unwrap(), [1.0, 2.0]);
///
/// assert!(centroid(&Geometry::Point([1.0, 1.0])).is_err());
/// ```
pub fn centroid(geometry: &Geometry) -> Result<Position> {
    let coords: &[Position] = match geometry {
        Geometry::LineString(line) => line,
        Geometry::Polygon(rings) => rings.first().map(Vec::as_slice).unwrap_or_default(),
        other => return Err(GeoError::UnsupportedGeometry(other.geometry_type())),
    };

    if coords.is_empty() {
        return Err(GeoError::InvalidCoordinate(format!(
            "{} without vertices has no centroid",
            geometry.geometry_type()
        )));
    }

    let (sum_lon, sum_lat) = coords
        .iter()
        .fold((0.0, 0.0), |(lon, lat), c| (lon + c[0], lat + c[1]));
    let n = coords.len() as f64;

    Ok([sum_lon / n, sum_lat / n])
}
