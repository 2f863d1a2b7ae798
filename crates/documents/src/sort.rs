//! Sidebar ordering by geometry kind.

use crate::reduce::ProjectedFeature;
use geosearch_geo::GeometryType;

/// Sort rank of a geometry kind: points first, then lines, then polygons.
pub fn geometry_rank(geometry_type: GeometryType) -> u8 {
    match geometry_type {
        GeometryType::Point => 0,
        GeometryType::LineString => 1,
        GeometryType::Polygon => 2,
        _ => 3,
    }
}

/// Sorts features by [`geometry_rank`], keeping the relative order of equal
/// ranks.
pub fn sort_by_geometry(features: &mut [ProjectedFeature]) {
    features.sort_by_key(|f| geometry_rank(f.geometry_type()));
}

/// Borrowing variant of [`sort_by_geometry`].
pub fn sorted_by_geometry(features: &[ProjectedFeature]) -> Vec<&ProjectedFeature> {
    let mut sorted: Vec<&ProjectedFeature> = features.iter().collect();
    sorted.sort_by_key(|f| geometry_rank(f.geometry_type()));
    sorted
}
