//! Live rerouting: keeps one route to the safest exit up to date as
//! position fixes and hazard updates arrive.

pub mod controller;
pub mod geolocation;
pub mod provider;
pub mod subscription;

pub use controller::{MapEvent, RerouteController, RouteCompletion};
pub use geolocation::{
    FixedPosition, GeolocationError, GeolocationOptions, GeolocationProvider, NoGeolocation,
    locate, locate_event,
};
pub use provider::{MapRenderer, RouteError, RoutingProvider};
pub use subscription::{HazardSource, HazardSubscription};
