pub mod containment;
pub mod projection;
pub mod simplify;

pub use containment::contains;
pub use projection::{Projector, polyline_length_m};
pub use simplify::simplify_route;
