pub mod console;
pub mod geojson;

pub use console::ConsoleRenderer;
pub use geojson::GeoJsonRenderer;
