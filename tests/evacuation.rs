use std::future::Future;
use std::io::Write;
use std::time::Duration;

use safexit::api::load_snapshot;
use safexit::config::ScoringConfig;
use safexit::domain::{Route, RouteRequest};
use safexit::feed::parse_venue;
use safexit::render::GeoJsonRenderer;
use safexit::reroute::{
    GeolocationOptions, MapEvent, MapRenderer, NoGeolocation, RouteError, RoutingProvider,
    locate_event,
};
use safexit::{
    ExitChoice, Incident, Point, RerouteController, RestrictedArea, Severity, contains,
};
use tokio::sync::mpsc;

const VENUE: &str = r#"{
    "name": "Riverside Festival",
    "latitude": 51.5,
    "longitude": -0.12,
    "exits": [
        {"name": "North Gate", "latitude": 51.501, "longitude": -0.12},
        {"name": "South Gate", "latitude": 51.499, "longitude": -0.12}
    ],
    "restricted_areas": [
        {"id": 1, "name": "Backstage", "description": "Crew only",
         "coordinates": "[[51.5008,-0.1202],[51.5012,-0.1202],[51.5012,-0.1198],[51.5008,-0.1198]]"},
        {"id": 2, "name": "Corrupt", "description": "", "coordinates": "[[51.5,"}
    ],
    "incidents": [
        {"id": 9, "latitude": 51.4991, "longitude": -0.12, "severity": "Low", "status": "Resolved"}
    ]
}"#;

struct StraightLineRouter;

impl RoutingProvider for StraightLineRouter {
    fn route(
        &self,
        request: RouteRequest,
    ) -> impl Future<Output = Result<Route, RouteError>> + Send {
        async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(Route {
                points: vec![request.origin, request.destination],
                distance_m: 0.0,
                duration_s: 60.0,
            })
        }
    }
}

#[derive(Default)]
struct Recorder {
    exits: Vec<String>,
    routes: Vec<Route>,
}

impl MapRenderer for Recorder {
    fn render_exit_choice(&mut self, choice: &ExitChoice) {
        self.exits.push(choice.exit.name.clone());
    }

    fn render_route(&mut self, route: &Route) {
        self.routes.push(route.clone());
    }
}

async fn venue_file() -> (tempfile::NamedTempFile, safexit::feed::Venue) {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(VENUE.as_bytes()).unwrap();
    let snapshot = load_snapshot(file.path()).await.unwrap();
    (file, parse_venue(&snapshot))
}

#[tokio::test]
async fn snapshot_parsing_keeps_valid_entries() {
    let (_file, venue) = venue_file().await;

    assert_eq!(venue.name, "Riverside Festival");
    assert_eq!(venue.exits.len(), 2);
    assert_eq!(venue.restricted.len(), 1);
    assert!(venue.incidents.is_empty());
    assert!(venue.restricted[0].contains(venue.exits[0].location));
}

#[tokio::test]
async fn backstage_exit_is_avoided_without_location() {
    let (_file, venue) = venue_file().await;
    let controller = RerouteController::new(
        StraightLineRouter,
        Recorder::default(),
        venue,
        ScoringConfig::default(),
    );

    let (tx, rx) = mpsc::channel(4);
    let event = locate_event(&NoGeolocation, &GeolocationOptions::default()).await;
    assert!(matches!(event, MapEvent::PositionUnavailable(_)));
    tx.send(event).await.unwrap();
    drop(tx);

    let recorder = controller.run(rx).await.unwrap();

    // North Gate sits inside Backstage, so the anchor routes south
    assert_eq!(recorder.exits, vec!["South Gate".to_string()]);
    assert_eq!(recorder.routes.len(), 1);
    assert_eq!(recorder.routes[0].points[0], Point::new(51.5, -0.12));
}

#[tokio::test]
async fn hazard_push_moves_route_to_other_gate() {
    let (_file, venue) = venue_file().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("route.geojson");
    let controller = RerouteController::new(
        StraightLineRouter,
        (Recorder::default(), GeoJsonRenderer::new(&path)),
        venue,
        ScoringConfig::default(),
    );

    let (tx, rx) = mpsc::channel(4);
    tx.send(MapEvent::PositionFix(Point::new(51.5004, -0.12)))
        .await
        .unwrap();
    tx.send(MapEvent::HazardsUpdated {
        restricted: Vec::new(),
        incidents: vec![Incident::new(Point::new(51.499, -0.12), Some(Severity::Critical))],
    })
    .await
    .unwrap();
    drop(tx);

    let (recorder, _geojson) = controller.run(rx).await.unwrap();

    assert_eq!(recorder.exits.first().map(String::as_str), Some("South Gate"));
    assert_eq!(recorder.exits.last().map(String::as_str), Some("North Gate"));

    let last = recorder.routes.last().unwrap();
    assert_eq!(last.points[1], Point::new(51.501, -0.12));

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let exit = &written["features"][1]["properties"]["name"];
    assert_eq!(exit, "North Gate");
}

#[test]
fn convex_polygon_containment() {
    let hexagon: Vec<Point> = (0..6)
        .map(|i| {
            let angle = i as f64 * std::f64::consts::PI / 3.0;
            Point::new(angle.sin(), angle.cos())
        })
        .collect();
    let zone = RestrictedArea::new("hex", hexagon.clone());

    for &(lat, lng) in &[(0.0, 0.0), (0.5, 0.1), (-0.3, -0.6), (0.0, 0.85)] {
        assert!(contains(Point::new(lat, lng), &hexagon), "({lat}, {lng})");
    }
    for &(lat, lng) in &[(5.0, 5.0), (-3.0, 0.0), (0.0, 2.0)] {
        assert!(!zone.contains(Point::new(lat, lng)), "({lat}, {lng})");
    }
}
