//! Projection of documents to map features and reduction to display points.

use crate::error::Result;
use crate::parser::CanonicalDocument;
use geo::{InteriorPoint, LineString, Polygon};
use geosearch_geo::projection::geometry_to_web_mercator;
use geosearch_geo::{centroid, to_web_mercator, GeoError, Geometry, GeometryType, Position};
use std::sync::Arc;

/// Id prefix of the full-shape highlight features.
pub const SHAPE_PREFIX: &str = "shape-";

/// A document geometry reprojected to EPSG:3857.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFeature {
    /// Id prefix followed by the document id
    pub id: String,
    /// Projected geometry
    pub geometry: Geometry,
    /// Source document (lookup only)
    pub document: Arc<CanonicalDocument>,
}

/// A document reduced to a single projected point.
///
/// The document handle is read-only. The result set holding this feature is
/// the owner of record; both are dropped together.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedFeature {
    pub id: String,
    /// EPSG:3857 position shown on the map
    pub position: Position,
    pub document: Arc<CanonicalDocument>,
}

impl ProjectedFeature {
    /// The display geometry as a point.
    pub fn display_geometry(&self) -> Geometry {
        Geometry::Point(self.position)
    }

    /// Geometry kind of the source document.
    #[inline]
    pub fn geometry_type(&self) -> GeometryType {
        self.document.geometry_type()
    }
}

/// Reprojects a document's geometry into the map projection.
pub fn project_feature(document: Arc<CanonicalDocument>, id_prefix: &str) -> MapFeature {
    MapFeature {
        id: format!("{id_prefix}{}", document.id),
        geometry: geometry_to_web_mercator(&document.geometry),
        document,
    }
}

/// Collapses a projected feature to one representative point.
///
/// Points are kept. Polygons use an interior point of the projected shape,
/// which always lies inside it. Lines use the vertex mean of the geographic
/// coordinates, projected afterwards.
///
/// # Errors
///
/// [`GeoError::UnsupportedGeometry`] for multi-part geometries and
/// [`GeoError::InvalidCoordinate`] for empty ones.
pub fn reduce_to_point(feature: MapFeature) -> Result<ProjectedFeature> {
    let position = match &feature.geometry {
        Geometry::Point(p) => *p,
        Geometry::Polygon(rings) => interior_point(rings)?,
        Geometry::LineString(_) => to_web_mercator(centroid(&feature.document.geometry)?),
        other => return Err(GeoError::UnsupportedGeometry(other.geometry_type()).into()),
    };

    Ok(ProjectedFeature {
        id: feature.id,
        position,
        document: feature.document,
    })
}

/// Projects and reduces a document without an id prefix.
pub fn reduce_document(document: Arc<CanonicalDocument>) -> Result<ProjectedFeature> {
    reduce_to_point(project_feature(document, ""))
}

fn interior_point(rings: &[Vec<Position>]) -> Result<Position> {
    let mut rings = rings.iter().map(|ring| LineString::from(ring.clone()));
    let exterior = rings
        .next()
        .ok_or_else(|| GeoError::InvalidCoordinate("polygon without rings".into()))?;
    let polygon = Polygon::new(exterior, rings.collect());

    polygon
        .interior_point()
        .map(|p| [p.x(), p.y()])
        .ok_or_else(|| GeoError::InvalidCoordinate("empty polygon".into()).into())
}
