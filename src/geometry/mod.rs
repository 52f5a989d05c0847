pub mod distance;

pub use distance::{EARTH_RADIUS_M, haversine_m, rank};
