pub mod osrm;
pub mod venue;

pub use osrm::{OsrmClient, OsrmResponse};
pub use venue::{VenueSnapshot, VenueSource, fetch_snapshot, load_snapshot};
