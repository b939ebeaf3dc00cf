use std::future::Future;
use thiserror::Error;

use crate::domain::{Route, RouteRequest};
use crate::scoring::ExitChoice;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("routing request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("routing service returned status {0}")]
    Status(u16),
    #[error("no route found: {0}")]
    NoRoute(String),
    #[error("routing failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },
}

/// Computes a route between two points.
///
/// The returned future resolves exactly once. Callers may drop it at any
/// point to cancel the request.
pub trait RoutingProvider: Send + Sync + 'static {
    fn route(&self, request: RouteRequest)
    -> impl Future<Output = Result<Route, RouteError>> + Send;
}

/// Display side of the evacuation map
pub trait MapRenderer {
    fn render_exit_choice(&mut self, choice: &ExitChoice);

    /// Replace the displayed route with `route`
    fn render_route(&mut self, route: &Route);
}

impl<A: MapRenderer, B: MapRenderer> MapRenderer for (A, B) {
    fn render_exit_choice(&mut self, choice: &ExitChoice) {
        self.0.render_exit_choice(choice);
        self.1.render_exit_choice(choice);
    }

    fn render_route(&mut self, route: &Route) {
        self.0.render_route(route);
        self.1.render_route(route);
    }
}

impl<M: MapRenderer> MapRenderer for Option<M> {
    fn render_exit_choice(&mut self, choice: &ExitChoice) {
        if let Some(renderer) = self {
            renderer.render_exit_choice(choice);
        }
    }

    fn render_route(&mut self, route: &Route) {
        if let Some(renderer) = self {
            renderer.render_route(route);
        }
    }
}
