use crate::domain::{BakeryRecord, Coordinate};

/// Earth mean radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters (haversine)
///
/// Uses the `atan2(√a, √(1−a))` form, which stays well-conditioned for
/// identical and antipodal points.
pub fn haversine_m(from: Coordinate, to: Coordinate) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let delta_phi = (to.lat - from.lat).to_radians();
    let delta_lambda = (to.lon - from.lon).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 near the antipode
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Populate `distance_meters` from `center` and sort ascending
///
/// `sort_by` is stable, so exact ties keep their input order.
pub fn rank(center: Coordinate, records: Vec<BakeryRecord>) -> Vec<BakeryRecord> {
    let mut ranked: Vec<BakeryRecord> = records
        .into_iter()
        .map(|record| {
            let distance = haversine_m(center, record.coordinate);
            record.with_distance(distance)
        })
        .collect();

    ranked.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
    ranked
}
