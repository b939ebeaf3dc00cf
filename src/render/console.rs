use crate::domain::Route;
use crate::geometry::{Projector, polyline_length_m};
use crate::reroute::MapRenderer;
use crate::scoring::ExitChoice;

/// Prints exit choices and routes to stdout
#[derive(Debug, Clone, Default)]
pub struct ConsoleRenderer {
    verbose: bool,
}

impl ConsoleRenderer {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

fn format_duration(seconds: f64) -> String {
    if seconds < 90.0 {
        format!("{:.0}s", seconds)
    } else {
        format!("{:.1} min", seconds / 60.0)
    }
}

impl MapRenderer for ConsoleRenderer {
    fn render_exit_choice(&mut self, choice: &ExitChoice) {
        let projector = Projector::new(choice.position);
        let meters = projector.distance_m(choice.position, choice.exit.location);

        println!(
            "Safest exit: {} ({:.0}m straight-line from ({:.5}, {:.5}))",
            choice.exit.name, meters, choice.position.lat, choice.position.lng
        );

        if self.verbose {
            println!(
                "  Score {:.4} = distance {:.6} + restricted {:.1} + incidents {:.4}",
                choice.score.total(),
                choice.score.base_distance,
                choice.score.restricted_penalty,
                choice.score.incident_penalty
            );
        }
    }

    fn render_route(&mut self, route: &Route) {
        let length = if route.distance_m > 0.0 {
            route.distance_m
        } else {
            polyline_length_m(&route.points)
        };

        println!(
            "Route: {:.0}m, {} ({} points)",
            length,
            format_duration(route.duration_s),
            route.points.len()
        );
    }
}
