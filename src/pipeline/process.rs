use crate::pipeline::elevation::{deadband_filter, fill_gaps, median_filter, window_samples};
use crate::pipeline::geo::haversine_km;
use crate::pipeline::resample::resample_by_distance;
use crate::pipeline::time_model::step_hours;
use crate::types::settings::Settings;
use crate::types::track::{LatLon, Segment, Totals, Track};

const MIN_WINDOW_SAMPLES: usize = 3;
const MAX_WINDOW_SAMPLES: usize = 999;

/// Runs every segment through gap filling, resampling, median smoothing and
/// deadband filtering, then accumulates distance, ascent, descent and time
/// over the concatenated result.
///
/// Segments with fewer than two points (before or after resampling) are
/// skipped. Settings are assumed to be sanitized already.
pub fn build_track(segments: &[Segment], settings: &Settings) -> Track {
    let mut track = Track::default();
    let mut acc = Accumulator::default();

    for points in segments {
        if points.len() < 2 {
            continue;
        }

        let filled = fill_gaps(points);
        let resampled = resample_by_distance(&filled, settings.spacing_m);
        if resampled.len() < 2 {
            continue;
        }

        let window = window_samples(
            settings.smoothing_window_m,
            settings.spacing_m,
            MIN_WINDOW_SAMPLES,
            MAX_WINDOW_SAMPLES,
        );
        let raw: Vec<Option<f64>> = resampled.iter().map(|p| p.elevation).collect();
        let smoothed = median_filter(&raw, window);
        let filtered = deadband_filter(&smoothed, settings.elevation_deadband_m);

        // The first point of a segment repeats the running totals: a leading
        // zero for the first segment, a free jump across later breaks.
        track.break_indices.push(track.points.len());
        acc.push_into(&mut track);

        track
            .points
            .extend(resampled.iter().map(|p| LatLon::new(p.lat, p.lon)));
        track.elevations_m.extend(
            filtered
                .iter()
                .map(|v| v.filter(|e| e.is_finite()).unwrap_or(0.0)),
        );

        for i in 1..resampled.len() {
            let (p1, p2) = (&resampled[i - 1], &resampled[i]);
            let distance_km = haversine_km(p1.lat, p1.lon, p2.lat, p2.lon);

            let delta = match (filtered[i - 1], filtered[i]) {
                (Some(a), Some(b)) => b - a,
                _ => 0.0,
            };
            let ascent_m = delta.max(0.0);
            let descent_m = (-delta).max(0.0);

            acc.distance_km += distance_km;
            acc.ascent_m += ascent_m;
            acc.descent_m += descent_m;
            acc.time_hours += step_hours(distance_km, ascent_m, descent_m, settings);
            acc.push_into(&mut track);
        }
    }

    track.totals = acc.totals();

    if track.is_empty() {
        tracing::warn!("No usable segments among {} input segments", segments.len());
    } else {
        tracing::debug!(
            "Built track: {} points, {} segments, {:.2} km, +{:.0}/-{:.0} m, {:.2} h",
            track.len(),
            track.segment_count(),
            track.totals.distance_km,
            track.totals.ascent_m,
            track.totals.descent_m,
            track.totals.time_hours
        );
    }

    track
}

#[derive(Default)]
struct Accumulator {
    distance_km: f64,
    ascent_m: f64,
    descent_m: f64,
    time_hours: f64,
}

impl Accumulator {
    fn push_into(&self, track: &mut Track) {
        track.cumulative_distance_km.push(self.distance_km);
        track.cumulative_ascent_m.push(self.ascent_m);
        track.cumulative_descent_m.push(self.descent_m);
        track.cumulative_time_hours.push(self.time_hours);
    }

    fn totals(&self) -> Totals {
        Totals {
            distance_km: self.distance_km,
            ascent_m: self.ascent_m,
            descent_m: self.descent_m,
            time_hours: self.time_hours,
        }
    }
}
