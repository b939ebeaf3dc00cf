use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::VenueSnapshot;
use crate::api::venue::{RawExit, RawIncident, RawRestrictedArea};
use crate::domain::{Exit, Incident, Point, RestrictedArea, Severity};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("coordinates are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("coordinates must be a list of [lat, lng] pairs")]
    NotAList,
    #[error("ring has {0} vertices, at least 3 are needed")]
    TooFewVertices(usize),
    #[error("ring contains a non-finite coordinate")]
    NonFinite,
}

/// Everything the evacuation map needs for one venue
#[derive(Debug, Clone)]
pub struct Venue {
    pub name: String,
    /// Venue marker, used as the fallback position
    pub anchor: Point,
    pub exits: Vec<Exit>,
    pub restricted: Vec<RestrictedArea>,
    pub incidents: Vec<Incident>,
}

/// Convert a raw snapshot into domain entities.
///
/// Malformed restricted areas and incidents are dropped with a warning;
/// they never fail the whole snapshot.
pub fn parse_venue(snapshot: &VenueSnapshot) -> Venue {
    let anchor = Point::new(snapshot.latitude, snapshot.longitude);

    Venue {
        name: snapshot
            .name
            .clone()
            .unwrap_or_else(|| "Event Venue".to_string()),
        anchor,
        exits: parse_exits(snapshot.exits.as_deref(), anchor),
        restricted: parse_restricted_areas(&snapshot.restricted_areas),
        incidents: parse_incidents(&snapshot.incidents),
    }
}

/// Parse a polygon ring of `[lat, lng]` pairs.
///
/// Accepts an inline JSON array or a string holding one.
pub fn parse_ring(coordinates: &Value) -> Result<Vec<Point>, FeedError> {
    let pairs: Vec<[f64; 2]> = match coordinates {
        Value::String(text) => serde_json::from_str(text)?,
        Value::Array(_) => serde_json::from_value(coordinates.clone())?,
        _ => return Err(FeedError::NotAList),
    };

    let ring: Vec<Point> = pairs
        .into_iter()
        .map(|[lat, lng]| Point::new(lat, lng))
        .collect();

    if ring.len() < 3 {
        return Err(FeedError::TooFewVertices(ring.len()));
    }
    if !ring.iter().all(Point::is_finite) {
        return Err(FeedError::NonFinite);
    }

    Ok(ring)
}

pub fn parse_restricted_areas(raw: &[RawRestrictedArea]) -> Vec<RestrictedArea> {
    raw.iter()
        .filter_map(|area| match parse_ring(&area.coordinates) {
            Ok(ring) => Some(
                RestrictedArea::new(area.name.clone(), ring)
                    .with_description(area.description.clone()),
            ),
            Err(e) => {
                warn!(id = ?area.id, name = %area.name, "Skipping restricted area: {}", e);
                None
            }
        })
        .collect()
}

/// Keep incidents that have a location and are not yet resolved
pub fn parse_incidents(raw: &[RawIncident]) -> Vec<Incident> {
    let mut incidents = Vec::new();

    for entry in raw {
        let (Some(lat), Some(lng)) = (entry.latitude, entry.longitude) else {
            warn!(id = ?entry.id, "Skipping incident without coordinates");
            continue;
        };
        let location = Point::new(lat, lng);
        if !location.is_finite() {
            warn!(id = ?entry.id, "Skipping incident with invalid coordinates");
            continue;
        }

        if entry
            .status
            .as_deref()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case("resolved"))
        {
            debug!(id = ?entry.id, "Ignoring resolved incident");
            continue;
        }

        let severity = entry.severity.as_deref().and_then(Severity::from_label);
        if severity.is_none() {
            debug!(id = ?entry.id, severity = ?entry.severity, "Unknown incident severity");
        }

        let incident = Incident::new(location, severity);
        incidents.push(match entry.id {
            Some(id) => incident.with_id(id),
            None => incident,
        });
    }

    incidents
}

/// Published exits, or the default layout around the venue when none are
pub fn parse_exits(raw: Option<&[RawExit]>, venue: Point) -> Vec<Exit> {
    let Some(raw) = raw else {
        return Exit::default_set(venue);
    };

    raw.iter()
        .enumerate()
        .filter_map(|(i, exit)| {
            let location = Point::new(exit.latitude?, exit.longitude?);
            if !location.is_finite() {
                return None;
            }
            let name = exit
                .name
                .clone()
                .unwrap_or_else(|| format!("Exit {}", i + 1));
            Some(Exit::new(name, location))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(json: Value) -> VenueSnapshot {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_parse_ring_from_string_and_array() {
        let from_string = parse_ring(&json!("[[0,0],[0,1],[1,1],[1,0]]")).unwrap();
        let from_array = parse_ring(&json!([[0, 0], [0, 1], [1, 1], [1, 0]])).unwrap();

        assert_eq!(from_string, from_array);
        assert_eq!(from_string[1], Point::new(0.0, 1.0));
    }

    #[test]
    fn test_parse_ring_preserves_order_and_duplicates() {
        let ring = parse_ring(&json!([[0, 0], [0, 1], [0, 1], [1, 1], [0, 0]])).unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[4], Point::new(0.0, 0.0));
    }

    #[test]
    fn test_parse_ring_errors() {
        assert!(matches!(
            parse_ring(&json!("not json")),
            Err(FeedError::Json(_))
        ));
        assert!(matches!(parse_ring(&json!(42)), Err(FeedError::NotAList)));
        assert!(matches!(
            parse_ring(&json!([[0, 0], [1, 1]])),
            Err(FeedError::TooFewVertices(2))
        ));
    }

    #[test]
    fn test_malformed_areas_are_skipped() {
        let venue = parse_venue(&snapshot(json!({
            "latitude": 0.0,
            "longitude": 0.0,
            "restricted_areas": [
                {"name": "Good", "description": "", "coordinates": "[[0,0],[0,1],[1,1]]"},
                {"name": "Broken", "description": "", "coordinates": "[[0,0],"},
                {"name": "Line", "description": "", "coordinates": [[0, 0], [1, 1]]},
                {"name": "Missing"}
            ]
        })));

        assert_eq!(venue.restricted.len(), 1);
        assert_eq!(venue.restricted[0].name, "Good");
    }

    #[test]
    fn test_incident_filtering() {
        let venue = parse_venue(&snapshot(json!({
            "latitude": 0.0,
            "longitude": 0.0,
            "incidents": [
                {"id": 1, "latitude": 0.1, "longitude": 0.1, "severity": "High", "status": "Reported"},
                {"id": 2, "latitude": 0.2, "longitude": 0.2, "severity": "Critical", "status": "Resolved"},
                {"id": 3, "severity": "Critical"},
                {"id": 4, "latitude": 0.3, "longitude": 0.3, "severity": "Apocalyptic"},
                {"id": 5, "latitude": 0.4, "longitude": 0.4, "status": "In Progress"}
            ]
        })));

        let ids: Vec<Option<u64>> = venue.incidents.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![Some(1), Some(4), Some(5)]);
        assert_eq!(venue.incidents[0].severity, Some(Severity::High));
        assert_eq!(venue.incidents[1].weight(), 0.0);
        assert_eq!(venue.incidents[2].weight(), 0.0);
    }

    #[test]
    fn test_mistyped_entries_skipped_alongside_valid_ones() {
        let venue = parse_venue(&snapshot(json!({
            "latitude": 0.0,
            "longitude": 0.0,
            "restricted_areas": [
                {"name": "Good", "coordinates": [[0, 0], [0, 1], [1, 1]]},
                {"name": null, "coordinates": [[2, 2], [2, 3], [3, 3]]}
            ],
            "incidents": [
                {"id": 1, "latitude": 0.1, "longitude": 0.1, "severity": "Low"},
                {"id": 2, "latitude": "n/a", "longitude": 0.1, "severity": "Critical"}
            ]
        })));

        assert_eq!(venue.restricted.len(), 1);
        assert_eq!(venue.restricted[0].name, "Good");
        let ids: Vec<Option<u64>> = venue.incidents.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![Some(1)]);
    }

    #[test]
    fn test_default_exits_when_absent() {
        let venue = parse_venue(&snapshot(json!({"latitude": 1.0, "longitude": 2.0})));

        assert_eq!(venue.name, "Event Venue");
        assert_eq!(venue.anchor, Point::new(1.0, 2.0));
        assert_eq!(venue.exits, Exit::default_set(Point::new(1.0, 2.0)));
    }

    #[test]
    fn test_published_exits() {
        let venue = parse_venue(&snapshot(json!({
            "latitude": 1.0,
            "longitude": 2.0,
            "exits": [
                {"name": "Gate A", "latitude": 1.001, "longitude": 2.0},
                {"latitude": 1.0, "longitude": 2.001},
                {"name": "Nowhere"}
            ]
        })));

        let names: Vec<&str> = venue.exits.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Gate A", "Exit 2"]);
    }

    #[test]
    fn test_published_empty_exit_list_stays_empty() {
        let venue = parse_venue(&snapshot(json!({
            "latitude": 1.0,
            "longitude": 2.0,
            "exits": []
        })));
        assert!(venue.exits.is_empty());
    }
}
