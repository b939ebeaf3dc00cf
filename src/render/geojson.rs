use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::path::PathBuf;
use tracing::warn;

use crate::domain::{Point, Route};
use crate::reroute::MapRenderer;
use crate::scoring::ExitChoice;

/// Keeps a GeoJSON file in sync with what the map should show.
///
/// The file always holds at most one exit, one position and one route;
/// each render rewrites it completely.
#[derive(Debug, Clone)]
pub struct GeoJsonRenderer {
    path: PathBuf,
    choice: Option<ExitChoice>,
    route: Option<Route>,
}

fn lng_lat(point: Point) -> [f64; 2] {
    [point.lng, point.lat]
}

impl GeoJsonRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            choice: None,
            route: None,
        }
    }

    /// Current map contents as a FeatureCollection
    pub fn to_geojson(&self) -> Value {
        let mut features = Vec::new();

        if let Some(choice) = &self.choice {
            features.push(json!({
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": lng_lat(choice.position)},
                "properties": {"kind": "position"}
            }));
            features.push(json!({
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": lng_lat(choice.exit.location)},
                "properties": {
                    "kind": "exit",
                    "name": choice.exit.name,
                    "score": choice.score.total()
                }
            }));
        }

        if let Some(route) = &self.route {
            let coordinates: Vec<[f64; 2]> = route.points.iter().copied().map(lng_lat).collect();
            features.push(json!({
                "type": "Feature",
                "geometry": {"type": "LineString", "coordinates": coordinates},
                "properties": {
                    "kind": "route",
                    "distance_m": route.distance_m,
                    "duration_s": route.duration_s
                }
            }));
        }

        json!({"type": "FeatureCollection", "features": features})
    }

    fn write(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.to_geojson())?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write GeoJSON file: {:?}", self.path))
    }

    fn flush(&self) {
        if let Err(e) = self.write() {
            warn!("{:#}", e);
        }
    }
}

impl MapRenderer for GeoJsonRenderer {
    fn render_exit_choice(&mut self, choice: &ExitChoice) {
        self.choice = Some(choice.clone());
        self.flush();
    }

    fn render_route(&mut self, route: &Route) {
        self.route = Some(route.clone());
        self.flush();
    }
}
