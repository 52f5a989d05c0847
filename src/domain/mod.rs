pub mod bakery;
pub mod coordinate;

pub use bakery::{BakeryRecord, RawPoiRecord, SearchResult};
pub use coordinate::Coordinate;
