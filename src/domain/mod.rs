pub mod exit;
pub mod incident;
pub mod point;
pub mod restricted;
pub mod route;

pub use exit::Exit;
pub use incident::{Incident, Severity};
pub use point::Point;
pub use restricted::RestrictedArea;
pub use route::{Route, RouteRequest};
