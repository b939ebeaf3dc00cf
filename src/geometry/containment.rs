use crate::domain::Point;

/// Even-odd point-in-polygon test.
///
/// Casts a ray from `point` toward +x (increasing longitude) and toggles
/// on every edge it crosses. Edges run between consecutive vertices and
/// wrap from the last vertex back to the first.
///
/// Rings with fewer than 3 vertices contain nothing. Points lying exactly
/// on an edge may land on either side.
pub fn contains(point: Point, ring: &[Point]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let (x, y) = (point.lng, point.lat);
    let mut inside = false;
    let mut j = ring.len() - 1;

    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].lng, ring[i].lat);
        let (xj, yj) = (ring[j].lng, ring[j].lat);

        // Strict pairing: a vertex sitting on the ray counts for one edge
        // only, and zero-height edges never get here so yj - yi != 0.
        if (yi > y) != (yj > y) {
            let cross_x = (xj - xi) * (y - yi) / (yj - yi) + xi;
            if x < cross_x {
                inside = !inside;
            }
        }

        j = i;
    }

    inside
}
