use super::Point;

/// A request for a route from the current position to a chosen exit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub origin: Point,
    pub destination: Point,
}

impl RouteRequest {
    pub fn new(origin: Point, destination: Point) -> Self {
        Self {
            origin,
            destination,
        }
    }
}

/// A routed path returned by the routing provider
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub points: Vec<Point>,
    /// Network distance in meters
    pub distance_m: f64,
    /// Estimated travel time in seconds
    pub duration_s: f64,
}
