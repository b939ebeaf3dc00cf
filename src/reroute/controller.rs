//! Exit selection and route lifecycle
//!
//! The controller owns the only live route request. Every new position
//! (or hazard update) re-scores the exits and issues a fresh request; the
//! previous request task is aborted and any answer it still manages to
//! send is dropped because its sequence number is no longer current.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::geolocation::{GeolocationOptions, GeolocationProvider, locate};
use super::provider::{MapRenderer, RouteError, RoutingProvider};
use crate::config::ScoringConfig;
use crate::domain::{Exit, Incident, Point, RestrictedArea, Route, RouteRequest};
use crate::feed::Venue;
use crate::geometry::simplify_route;
use crate::scoring::{ExitChoice, ScoreError, select_exit};

/// Inputs the controller reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    PositionFix(Point),
    PositionUnavailable(String),
    /// Wholesale replacement of the hazard data
    HazardsUpdated {
        restricted: Vec<RestrictedArea>,
        incidents: Vec<Incident>,
    },
}

/// Result of a route request, tagged with the request's sequence number
#[derive(Debug)]
pub struct RouteCompletion {
    pub sequence: u64,
    pub result: Result<Route, RouteError>,
}

struct ActiveRequest {
    sequence: u64,
    task: JoinHandle<()>,
}

impl Drop for ActiveRequest {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub struct RerouteController<R, M> {
    provider: Arc<R>,
    renderer: M,
    config: ScoringConfig,
    anchor: Point,
    position: Option<Point>,
    exits: Vec<Exit>,
    restricted: Vec<RestrictedArea>,
    incidents: Vec<Incident>,
    simplify_tolerance: f64,
    sequence: u64,
    active: Option<ActiveRequest>,
    last_choice: Option<ExitChoice>,
    displayed: Option<Route>,
    completions_tx: mpsc::UnboundedSender<RouteCompletion>,
    completions_rx: Option<mpsc::UnboundedReceiver<RouteCompletion>>,
}

impl<R: RoutingProvider, M: MapRenderer> RerouteController<R, M> {
    pub fn new(provider: R, renderer: M, venue: Venue, config: ScoringConfig) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        Self {
            provider: Arc::new(provider),
            renderer,
            config,
            anchor: venue.anchor,
            position: None,
            exits: venue.exits,
            restricted: venue.restricted,
            incidents: venue.incidents,
            simplify_tolerance: 0.0,
            sequence: 0,
            active: None,
            last_choice: None,
            displayed: None,
            completions_tx,
            completions_rx: Some(completions_rx),
        }
    }

    /// Simplify routes before rendering; tolerance in degrees
    pub fn with_simplify_tolerance(mut self, tolerance: f64) -> Self {
        self.simplify_tolerance = tolerance;
        self
    }

    /// Last position routed from, live or fallback
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    pub fn is_pending(&self) -> bool {
        self.active.is_some()
    }

    /// Sequence number of the most recently issued request
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn last_choice(&self) -> Option<&ExitChoice> {
        self.last_choice.as_ref()
    }

    /// Route currently on the map
    pub fn displayed_route(&self) -> Option<&Route> {
        self.displayed.as_ref()
    }

    pub fn renderer(&self) -> &M {
        &self.renderer
    }

    pub fn into_renderer(self) -> M {
        self.renderer
    }

    /// Handle a live position fix
    pub fn on_position_update(&mut self, position: Point) -> Result<ExitChoice, ScoreError> {
        if !position.is_finite() {
            return self.on_position_unavailable("position fix has invalid coordinates");
        }

        self.position = Some(position);
        self.reroute_from(position)
    }

    /// No usable fix: route from the venue anchor instead
    pub fn on_position_unavailable(&mut self, reason: &str) -> Result<ExitChoice, ScoreError> {
        warn!(
            reason,
            lat = self.anchor.lat,
            lng = self.anchor.lng,
            "Geolocation unavailable, routing from venue"
        );

        self.position = Some(self.anchor);
        self.reroute_from(self.anchor)
    }

    /// Swap in new hazard data and re-route from the last known position
    pub fn replace_hazards(
        &mut self,
        restricted: Vec<RestrictedArea>,
        incidents: Vec<Incident>,
    ) -> Result<Option<ExitChoice>, ScoreError> {
        info!(
            restricted = restricted.len(),
            incidents = incidents.len(),
            "Hazard data updated"
        );
        self.restricted = restricted;
        self.incidents = incidents;

        match self.position {
            Some(position) => self.reroute_from(position).map(Some),
            None => Ok(None),
        }
    }

    /// Wait (bounded) for a fix from `provider`, then route
    pub async fn locate_and_route<G: GeolocationProvider>(
        &mut self,
        provider: &G,
        options: &GeolocationOptions,
    ) -> Result<ExitChoice, ScoreError> {
        match locate(provider, options).await {
            Ok(position) => self.on_position_update(position),
            Err(e) => self.on_position_unavailable(&e.to_string()),
        }
    }

    pub fn handle_event(&mut self, event: MapEvent) -> Result<(), ScoreError> {
        match event {
            MapEvent::PositionFix(position) => self.on_position_update(position).map(drop),
            MapEvent::PositionUnavailable(reason) => {
                self.on_position_unavailable(&reason).map(drop)
            }
            MapEvent::HazardsUpdated {
                restricted,
                incidents,
            } => self.replace_hazards(restricted, incidents).map(drop),
        }
    }

    /// Apply a finished route request.
    ///
    /// Returns true when the route was rendered. Stale completions and
    /// failures leave the displayed route untouched.
    pub fn on_route_completed(&mut self, completion: RouteCompletion) -> bool {
        let is_current = self
            .active
            .as_ref()
            .is_some_and(|active| active.sequence == completion.sequence);
        if !is_current {
            debug!(
                sequence = completion.sequence,
                current = self.sequence,
                "Discarding superseded route response"
            );
            return false;
        }
        self.active = None;

        match completion.result {
            Ok(route) => {
                let route = Route {
                    points: simplify_route(&route.points, self.simplify_tolerance),
                    ..route
                };
                info!(
                    sequence = completion.sequence,
                    points = route.points.len(),
                    distance_m = route.distance_m,
                    "Rendering route"
                );
                self.renderer.render_route(&route);
                self.displayed = Some(route);
                true
            }
            Err(e) => {
                warn!(
                    sequence = completion.sequence,
                    "Route request failed, keeping previous route: {}", e
                );
                false
            }
        }
    }

    /// Next route completion, including stale ones.
    ///
    /// Only meaningful while a request is pending; otherwise this waits
    /// until the next request finishes.
    pub async fn next_completion(&mut self) -> Option<RouteCompletion> {
        self.completions_rx.as_mut()?.recv().await
    }

    /// Drive the controller until `events` closes and no request is pending.
    ///
    /// Returns the renderer on a clean finish. Fails only when the exits
    /// cannot be scored at all.
    pub async fn run(mut self, mut events: mpsc::Receiver<MapEvent>) -> Result<M, ScoreError> {
        let Some(mut completions) = self.completions_rx.take() else {
            return Ok(self.into_renderer());
        };
        let mut events_open = true;

        loop {
            if !events_open && !self.is_pending() {
                break;
            }

            tokio::select! {
                event = events.recv(), if events_open => match event {
                    Some(event) => self.handle_event(event)?,
                    None => events_open = false,
                },
                Some(completion) = completions.recv() => {
                    self.on_route_completed(completion);
                }
            }
        }

        Ok(self.into_renderer())
    }

    fn reroute_from(&mut self, position: Point) -> Result<ExitChoice, ScoreError> {
        let choice = select_exit(
            position,
            &self.exits,
            &self.restricted,
            &self.incidents,
            &self.config,
        )?;

        self.renderer.render_exit_choice(&choice);
        self.issue(RouteRequest::new(position, choice.exit.location));
        self.last_choice = Some(choice.clone());

        Ok(choice)
    }

    fn issue(&mut self, request: RouteRequest) {
        if let Some(previous) = self.active.take() {
            debug!(sequence = previous.sequence, "Cancelling superseded route request");
        }

        self.sequence += 1;
        let sequence = self.sequence;
        let provider = Arc::clone(&self.provider);
        let completions = self.completions_tx.clone();

        info!(
            sequence,
            from = ?request.origin,
            to = ?request.destination,
            "Requesting route"
        );

        let task = tokio::spawn(async move {
            let result = provider.route(request).await;
            // Receiver only goes away with the controller
            let _ = completions.send(RouteCompletion { sequence, result });
        });

        self.active = Some(ActiveRequest { sequence, task });
    }
}
