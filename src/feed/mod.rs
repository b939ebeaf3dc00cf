pub mod parser;

pub use parser::{
    FeedError, Venue, parse_exits, parse_incidents, parse_restricted_areas, parse_ring,
    parse_venue,
};
