use super::Point;
use crate::geometry::contains;

/// A no-go zone drawn by event organisers.
///
/// The ring is kept exactly as supplied, implicitly closed from the last
/// vertex back to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct RestrictedArea {
    pub name: String,
    pub description: String,
    pub ring: Vec<Point>,
}

impl RestrictedArea {
    pub fn new(name: impl Into<String>, ring: Vec<Point>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            ring,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_valid(&self) -> bool {
        self.ring.len() >= 3 && self.ring.iter().all(Point::is_finite)
    }

    pub fn contains(&self, point: Point) -> bool {
        contains(point, &self.ring)
    }
}
