use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::RoutingConfig;
use crate::domain::{Point, Route, RouteRequest};
use crate::reroute::{RouteError, RoutingProvider};

const USER_AGENT: &str = "safexit/0.1.0";

/// Raw OSRM `route` service response
#[derive(Debug, Deserialize)]
pub struct OsrmResponse {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
pub struct OsrmRoute {
    pub distance: f64,
    pub duration: f64,
    pub geometry: OsrmGeometry,
}

/// GeoJSON line geometry, coordinates as `[lng, lat]`
#[derive(Debug, Deserialize)]
pub struct OsrmGeometry {
    pub coordinates: Vec<[f64; 2]>,
}

impl OsrmResponse {
    /// Take the first (best) route out of the response
    pub fn into_route(self) -> Result<Route, RouteError> {
        if self.code != "Ok" {
            return Err(RouteError::NoRoute(self.message.unwrap_or(self.code)));
        }

        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| RouteError::NoRoute("response contained no routes".to_string()))?;

        Ok(Route {
            points: route
                .geometry
                .coordinates
                .into_iter()
                .map(|[lng, lat]| Point::new(lat, lng))
                .collect(),
            distance_m: route.distance,
            duration_s: route.duration,
        })
    }
}

/// Build the `route/v1` URL for a request against one service root
fn route_url(base: &str, profile: &str, request: &RouteRequest) -> String {
    let RouteRequest {
        origin,
        destination,
    } = request;
    format!(
        "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}",
        base.trim_end_matches('/'),
        profile,
        origin.lng,
        origin.lat,
        destination.lng,
        destination.lat
    )
}

/// Routing provider backed by one or more OSRM servers
#[derive(Debug, Clone)]
pub struct OsrmClient {
    client: reqwest::Client,
    config: RoutingConfig,
}

impl OsrmClient {
    pub fn new(config: RoutingConfig) -> Result<Self, RouteError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Try each configured server in turn, retrying on overload
    async fn execute(&self, request: RouteRequest) -> Result<Route, RouteError> {
        let max_attempts = self.config.max_retries.max(1);
        let mut attempts = 0;
        let mut last_error = None;

        for base in &self.config.urls {
            let url = route_url(base, &self.config.profile, &request);

            for attempt in 0..max_attempts {
                if attempt > 0 {
                    let wait = Duration::from_secs(2 * attempt as u64);
                    warn!(
                        "Routing service unavailable, retrying in {:?} (attempt {}/{})",
                        wait,
                        attempt + 1,
                        max_attempts
                    );
                    tokio::time::sleep(wait).await;
                }
                attempts += 1;

                let response = match self
                    .client
                    .get(&url)
                    .query(&[("overview", "full"), ("geometries", "geojson")])
                    .send()
                    .await
                {
                    Ok(response) => response,
                    Err(e) => {
                        last_error = Some(format!("{}: {}", base, e));
                        continue;
                    }
                };

                match response.status().as_u16() {
                    // OSRM reports NoRoute and friends as 400 with a JSON body
                    200 | 400 => {
                        let body: OsrmResponse = response.json().await?;
                        debug!(%url, code = %body.code, "routing service answered");
                        return body.into_route();
                    }
                    429 | 502 | 503 | 504 => {
                        last_error = Some(format!(
                            "{} returned status {} (attempt {})",
                            base,
                            response.status(),
                            attempt + 1
                        ));
                    }
                    status => return Err(RouteError::Status(status)),
                }
            }
        }

        Err(RouteError::Exhausted {
            attempts,
            last: last_error.unwrap_or_else(|| "no routing service configured".to_string()),
        })
    }
}

impl RoutingProvider for OsrmClient {
    fn route(&self, request: RouteRequest) -> impl Future<Output = Result<Route, RouteError>> + Send {
        self.execute(request)
    }
}
