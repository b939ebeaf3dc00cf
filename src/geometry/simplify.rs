use geo::{LineString, Simplify};

use crate::domain::Point;

/// Ramer-Douglas-Peucker simplification of a route polyline.
///
/// `tolerance` is in degrees. Non-positive tolerances and very short
/// polylines are returned unchanged; endpoints are always kept.
pub fn simplify_route(points: &[Point], tolerance: f64) -> Vec<Point> {
    if tolerance <= 0.0 || points.len() < 3 {
        return points.to_vec();
    }

    let line: LineString<f64> = points
        .iter()
        .map(|p| geo::coord! { x: p.lng, y: p.lat })
        .collect();

    let simplified = line.simplify(&tolerance);

    simplified
        .0
        .into_iter()
        .map(|c| Point::new(c.y, c.x))
        .collect()
}
