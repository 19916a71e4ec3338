use crate::types::settings::{Activity, Settings};

/// Estimated hours for one point-to-point step.
///
/// At most one of `ascent_m` / `descent_m` is non-zero for a single step.
pub fn step_hours(distance_km: f64, ascent_m: f64, descent_m: f64, settings: &Settings) -> f64 {
    let horizontal = distance_km / settings.flat_speed_kmh;

    let vertical_m = if ascent_m > 0.0 { ascent_m } else { descent_m };
    let vertical = if vertical_m > 0.0 {
        vertical_m / settings.vertical_speed_mh
    } else {
        0.0
    };

    let blended = match settings.activity {
        Activity::Hike => horizontal.max(vertical) + 0.5 * horizontal.min(vertical),
        Activity::Snowshoe => horizontal + vertical,
    };

    if descent_m > 0.0 && descent_m >= ascent_m {
        blended * settings.downhill_factor
    } else {
        blended
    }
}
