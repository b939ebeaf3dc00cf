use crate::domain::Point;

/// Meters per degree at the equator
const METERS_PER_DEGREE: f64 = 111320.0;

/// Equirectangular projection from WGS84 to local meters.
///
/// - x = (lng - center_lng) * cos(center_lat) * 111320
/// - y = (lat - center_lat) * 111320
///
/// Good enough for walking distances around a venue.
#[derive(Debug, Clone)]
pub struct Projector {
    center: Point,
    cos_lat: f64,
}

impl Projector {
    pub fn new(center: Point) -> Self {
        Self {
            center,
            cos_lat: center.lat.to_radians().cos(),
        }
    }

    /// Project a point to (x, y) meters relative to the center
    pub fn project(&self, point: Point) -> (f64, f64) {
        let x = (point.lng - self.center.lng) * self.cos_lat * METERS_PER_DEGREE;
        let y = (point.lat - self.center.lat) * METERS_PER_DEGREE;
        (x, y)
    }

    /// Straight-line distance between two points in meters
    pub fn distance_m(&self, a: Point, b: Point) -> f64 {
        let (ax, ay) = self.project(a);
        let (bx, by) = self.project(b);
        (ax - bx).hypot(ay - by)
    }
}

/// Length of a polyline in meters, projected around its first vertex
pub fn polyline_length_m(points: &[Point]) -> f64 {
    let Some(&first) = points.first() else {
        return 0.0;
    };
    let projector = Projector::new(first);

    points
        .windows(2)
        .map(|pair| projector.distance_m(pair[0], pair[1]))
        .sum()
}
