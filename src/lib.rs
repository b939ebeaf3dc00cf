//! safexit - Pick the safest venue exit and keep a live evacuation route to it

pub mod api;
pub mod config;
pub mod domain;
pub mod feed;
pub mod geometry;
pub mod render;
pub mod reroute;
pub mod scoring;

pub use domain::{Exit, Incident, Point, RestrictedArea, Severity};
pub use geometry::contains;
pub use reroute::RerouteController;
pub use scoring::{ExitChoice, ScoreError, select_exit};
