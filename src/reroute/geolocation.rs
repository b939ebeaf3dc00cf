use std::future::{self, Future};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::MapEvent;
use crate::config::GeolocationConfig;
use crate::domain::Point;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeolocationError {
    #[error("geolocation not supported")]
    Unsupported,
    #[error("geolocation permission denied")]
    PermissionDenied,
    #[error("position unavailable: {0}")]
    Unavailable(String),
    #[error("no position fix within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    /// Upper bound on how long to wait for a fix
    pub timeout: Duration,
    /// Oldest cached fix that is still acceptable
    pub max_age: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self::from(&GeolocationConfig::default())
    }
}

impl From<&GeolocationConfig> for GeolocationOptions {
    fn from(config: &GeolocationConfig) -> Self {
        Self {
            high_accuracy: config.high_accuracy,
            timeout: config.timeout(),
            max_age: config.max_age(),
        }
    }
}

/// Source of position fixes
pub trait GeolocationProvider {
    fn current_position(
        &self,
        options: &GeolocationOptions,
    ) -> impl Future<Output = Result<Point, GeolocationError>> + Send;
}

/// Always reports the same position
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Point);

impl GeolocationProvider for FixedPosition {
    fn current_position(
        &self,
        _options: &GeolocationOptions,
    ) -> impl Future<Output = Result<Point, GeolocationError>> + Send {
        future::ready(Ok(self.0))
    }
}

/// Device without a position source
#[derive(Debug, Clone, Copy)]
pub struct NoGeolocation;

impl GeolocationProvider for NoGeolocation {
    fn current_position(
        &self,
        _options: &GeolocationOptions,
    ) -> impl Future<Output = Result<Point, GeolocationError>> + Send {
        future::ready(Err(GeolocationError::Unsupported))
    }
}

/// Ask `provider` for a fix, giving up after `options.timeout`
pub async fn locate<G: GeolocationProvider>(
    provider: &G,
    options: &GeolocationOptions,
) -> Result<Point, GeolocationError> {
    match tokio::time::timeout(options.timeout, provider.current_position(options)).await {
        Ok(result) => result,
        Err(_) => Err(GeolocationError::Timeout(options.timeout)),
    }
}

/// Turn a geolocation attempt into the event the controller consumes
pub async fn locate_event<G: GeolocationProvider>(
    provider: &G,
    options: &GeolocationOptions,
) -> MapEvent {
    match locate(provider, options).await {
        Ok(position) => MapEvent::PositionFix(position),
        Err(e) => MapEvent::PositionUnavailable(e.to_string()),
    }
}

/// Replay a recorded track as position events.
///
/// `None` entries stand for moments where no fix was available.
pub fn spawn_track(
    track: Vec<Option<Point>>,
    interval: Duration,
    events: mpsc::Sender<MapEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        for (i, fix) in track.into_iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(interval).await;
            }
            let event = match fix {
                Some(position) => MapEvent::PositionFix(position),
                None => MapEvent::PositionUnavailable(
                    GeolocationError::Unavailable("no fix in track".to_string()).to_string(),
                ),
            };
            if events.send(event).await.is_err() {
                debug!("Track replay stopped, controller is gone");
                break;
            }
        }
    })
}
