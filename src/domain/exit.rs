use super::Point;

/// A named venue exit
#[derive(Debug, Clone, PartialEq)]
pub struct Exit {
    pub name: String,
    pub location: Point,
}

impl Exit {
    pub fn new(name: impl Into<String>, location: Point) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }

    /// Exit layout used when a venue publishes no exits of its own.
    ///
    /// Three exits placed a few tens of meters around the venue marker.
    pub fn default_set(venue: Point) -> Vec<Exit> {
        vec![
            Exit::new("Main Exit", venue.offset(0.0005, 0.0005)),
            Exit::new("Emergency Exit 1", venue.offset(-0.0003, 0.0007)),
            Exit::new("Emergency Exit 2", venue.offset(0.0008, -0.0003)),
        ]
    }
}
