//! bunontherun - Find bakeries near an address using OpenStreetMap data

pub mod api;
pub mod cache;
pub mod config;
pub mod domain;
pub mod geometry;
pub mod osm;
pub mod search;

pub use domain::{BakeryRecord, Coordinate, SearchResult};
pub use search::{SearchError, SearchOrchestrator};
