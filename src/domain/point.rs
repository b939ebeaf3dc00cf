use serde::{Deserialize, Serialize};

/// A WGS84 position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Offset this point by a number of degrees in each axis
    pub fn offset(&self, d_lat: f64, d_lng: f64) -> Self {
        Self::new(self.lat + d_lat, self.lng + d_lng)
    }

    /// Flat-plane distance in degrees.
    ///
    /// Treats lat/lng as planar coordinates, which is accurate enough to
    /// rank exits against each other at venue scale.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.lat - other.lat).hypot(self.lng - other.lng)
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}
