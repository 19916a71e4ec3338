use crate::pipeline::geo::haversine_km;
use crate::types::track::LatLon;

/// Index of the track point closest to `query`, by linear scan. Ties keep the
/// lowest index.
///
/// Callers must check that `points` is non-empty; an empty slice yields 0.
pub fn nearest_index(query: LatLon, points: &[LatLon]) -> usize {
    let mut best_idx = 0;
    let mut best_km = f64::INFINITY;

    for (idx, point) in points.iter().enumerate() {
        let d = haversine_km(query.lat, query.lon, point.lat, point.lon);
        if d < best_km {
            best_km = d;
            best_idx = idx;
        }
    }

    best_idx
}
