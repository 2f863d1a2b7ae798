//! Pixel picking of displayed features.

use geosearch_documents::ProjectedFeature;
use geosearch_geo::MapSurface;

/// Ids of the features drawn within `radius_px` of `pixel`, nearest first.
///
/// Features at equal distance keep their result order.
pub fn pick_features<S: MapSurface + ?Sized>(
    surface: &S,
    features: &[ProjectedFeature],
    pixel: [f64; 2],
    radius_px: f64,
) -> Vec<String> {
    let mut hits: Vec<(f64, &ProjectedFeature)> = features
        .iter()
        .filter_map(|feature| {
            let [x, y] = surface.pixel_from_coordinate(feature.position);
            let distance = (x - pixel[0]).hypot(y - pixel[1]);
            (distance <= radius_px).then_some((distance, feature))
        })
        .collect();
    hits.sort_by(|a, b| a.0.total_cmp(&b.0));
    hits.into_iter().map(|(_, f)| f.id.clone()).collect()
}
