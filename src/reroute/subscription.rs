use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::MapEvent;
use crate::api::{VenueSnapshot, VenueSource};
use crate::feed::{parse_incidents, parse_restricted_areas};

/// Something that can produce a fresh venue snapshot on demand
pub trait HazardSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<VenueSnapshot>> + Send;
}

impl HazardSource for VenueSource {
    fn fetch(&self) -> impl Future<Output = Result<VenueSnapshot>> + Send {
        self.load()
    }
}

/// Live feed of hazard updates for one venue.
///
/// Polls its source on a fixed interval and pushes every successful fetch
/// as a `HazardsUpdated` event. Polling stops on `unsubscribe`, when the
/// handle is dropped, or when the event receiver goes away.
pub struct HazardSubscription {
    task: Option<JoinHandle<()>>,
}

impl HazardSubscription {
    pub fn subscribe<S: HazardSource>(
        source: S,
        interval: Duration,
        events: mpsc::Sender<MapEvent>,
    ) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick fires immediately; the initial snapshot is
            // already loaded by the caller.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let snapshot = match source.fetch().await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        warn!("Hazard refresh failed, keeping current data: {:#}", e);
                        continue;
                    }
                };

                let event = MapEvent::HazardsUpdated {
                    restricted: parse_restricted_areas(&snapshot.restricted_areas),
                    incidents: parse_incidents(&snapshot.incidents),
                };
                if events.send(event).await.is_err() {
                    debug!("Hazard subscription closed by receiver");
                    break;
                }
            }
        });

        Self { task: Some(task) }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn unsubscribe(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for HazardSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}
