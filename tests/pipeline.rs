use roadbook_rs::pipeline::build_track;
use roadbook_rs::pipeline::elevation::{deadband_filter, fill_gaps, median_filter};
use roadbook_rs::pipeline::geo::haversine_m;
use roadbook_rs::pipeline::nearest::nearest_index;
use roadbook_rs::pipeline::resample::resample_by_distance;
use roadbook_rs::pipeline::time_model::step_hours;
use roadbook_rs::types::settings::{Activity, Settings};
use roadbook_rs::types::track::{LatLon, RawPoint, Segment, Track};

const METRES_PER_DEGREE: f64 = 6_371_000.0 * std::f64::consts::PI / 180.0;

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Points along the equator, `step_m` apart, with the given elevations.
fn equator_segment(lon0: f64, step_m: f64, elevations: &[Option<f64>]) -> Segment {
    elevations
        .iter()
        .enumerate()
        .map(|(i, ele)| RawPoint::new(0.0, lon0 + i as f64 * step_m / METRES_PER_DEGREE, *ele))
        .collect()
}

fn assert_non_decreasing(values: &[f64]) {
    for pair in values.windows(2) {
        assert!(pair[1] >= pair[0], "{} followed by {}", pair[0], pair[1]);
    }
}

fn assert_aligned(track: &Track) {
    let n = track.len();
    assert_eq!(track.elevations_m.len(), n);
    assert_eq!(track.cumulative_distance_km.len(), n);
    assert_eq!(track.cumulative_ascent_m.len(), n);
    assert_eq!(track.cumulative_descent_m.len(), n);
    assert_eq!(track.cumulative_time_hours.len(), n);
}

#[test]
fn gap_filler_uses_nearest_known_value() {
    let points: Vec<RawPoint> = [None, Some(5.0), None, None, Some(8.0), None]
        .iter()
        .enumerate()
        .map(|(i, ele)| RawPoint::new(0.0, i as f64 * 0.001, *ele))
        .collect();

    let filled: Vec<Option<f64>> = fill_gaps(&points).iter().map(|p| p.elevation).collect();
    assert_eq!(
        filled,
        vec![Some(5.0), Some(5.0), Some(5.0), Some(5.0), Some(8.0), Some(8.0)]
    );
}

#[test]
fn gap_filler_leaves_missing_elevation_missing() {
    let points = vec![RawPoint::new(0.0, 0.0, None), RawPoint::new(0.0, 0.001, None)];
    assert!(fill_gaps(&points).iter().all(|p| p.elevation.is_none()));
}

#[test]
fn resampled_count_and_endpoints() {
    let points = vec![
        RawPoint::new(46.0, 7.0, Some(1000.0)),
        RawPoint::new(46.001, 7.0005, Some(1012.0)),
        RawPoint::new(46.0025, 7.0011, Some(1003.0)),
    ];
    let spacing = 25.0;
    let total: f64 = points
        .windows(2)
        .map(|p| haversine_m(p[0].lat, p[0].lon, p[1].lat, p[1].lon))
        .sum();

    let out = resample_by_distance(&points, spacing);

    let grid = (total / spacing).floor() as usize + 1;
    assert!(out.len() == grid || out.len() == grid + 1);
    assert_eq!(out[0], points[0]);
    assert_eq!(out[out.len() - 1], points[2]);
}

#[test]
fn resampled_interior_spacing_is_uniform() {
    let segment = equator_segment(10.0, 40.0, &[Some(0.0); 6]);
    let out = resample_by_distance(&segment, 15.0);

    for pair in out[..out.len() - 1].windows(2) {
        let d = haversine_m(pair[0].lat, pair[0].lon, pair[1].lat, pair[1].lon);
        assert!(approx_eq(d, 15.0, 1e-3), "gap was {}", d);
    }
    let n = out.len();
    let tail = haversine_m(out[n - 2].lat, out[n - 2].lon, out[n - 1].lat, out[n - 1].lon);
    assert!(tail <= 15.0 + 1e-3);
}

#[test]
fn median_removes_single_spike() {
    let values = [Some(10.0), Some(11.0), Some(50.0), Some(13.0), Some(14.0)];
    let out = median_filter(&values, 3);
    assert_eq!(out[2], Some(13.0));
}

#[test]
fn median_keeps_interior_of_ramp() {
    let values: Vec<Option<f64>> = (0..10).map(|i| Some(i as f64 * 2.0)).collect();
    let out = median_filter(&values, 3);
    assert_eq!(out[1..9], values[1..9]);
}

#[test]
fn median_skips_missing_and_keeps_empty_windows_missing() {
    let values = [None, None, None, Some(4.0), Some(6.0), Some(8.0)];
    let out = median_filter(&values, 3);
    assert_eq!(out[0], None);
    assert_eq!(out[1], None);
    assert_eq!(out[2], Some(4.0));
    assert_eq!(out[4], Some(6.0));
}

#[test]
fn deadband_flattens_small_oscillation() {
    let values: Vec<Option<f64>> = (0..40)
        .map(|i| Some(if i % 2 == 0 { 100.0 } else { 100.9 }))
        .collect();
    let out = deadband_filter(&values, 2.0);
    assert!(out.iter().all(|v| *v == Some(100.0)));
}

#[test]
fn deadband_follows_sustained_climb() {
    let values: Vec<Option<f64>> = (0..=50).map(|i| Some(i as f64)).collect();
    let deadband = 2.0;
    let out = deadband_filter(&values, deadband);

    let rise = out[50].unwrap_or_default() - out[0].unwrap_or_default();
    assert!(approx_eq(rise, 50.0 - deadband, 1e-9));
    for (raw, filtered) in values.iter().zip(&out) {
        let lag = raw.unwrap_or_default() - filtered.unwrap_or_default();
        assert!((0.0..=deadband).contains(&lag));
    }
}

#[test]
fn deadband_backfills_leading_gaps_and_passes_all_missing_through() {
    let out = deadband_filter(&[None, None, Some(7.0), Some(7.5)], 1.0);
    assert_eq!(out, vec![Some(7.0), Some(7.0), Some(7.0), Some(7.0)]);

    let all_missing = [None, None];
    assert_eq!(deadband_filter(&all_missing, 1.0), vec![None, None]);
}

#[test]
fn time_model_blends() {
    let hike = Settings {
        flat_speed_kmh: 5.0,
        vertical_speed_mh: 500.0,
        downhill_factor: 1.0,
        activity: Activity::Hike,
        ..Settings::default()
    };
    let snowshoe = Settings {
        activity: Activity::Snowshoe,
        ..hike
    };

    // 1 km flat and 100 m vertical both take 0.2 h.
    let h = 0.2;
    assert!(approx_eq(step_hours(1.0, 100.0, 0.0, &hike), 1.5 * h, 1e-12));
    assert!(approx_eq(step_hours(1.0, 100.0, 0.0, &snowshoe), 2.0 * h, 1e-12));
}

#[test]
fn nearest_prefers_closer_point() {
    let points = vec![
        LatLon::new(0.0, 0.0),
        LatLon::new(0.0, 1.0),
        LatLon::new(0.0, 2.0),
    ];
    assert_eq!(nearest_index(LatLon::new(0.0, 1.4), &points), 1);
}

#[test]
fn nearest_tie_keeps_first() {
    let points = vec![LatLon::new(0.0, 1.0), LatLon::new(0.0, 1.0)];
    assert_eq!(nearest_index(LatLon::new(0.0, 1.0), &points), 0);
}

#[test]
fn flat_segment_end_to_end() {
    let segment = equator_segment(0.0, 50.0, &[Some(200.0); 3]);
    let settings = Settings {
        spacing_m: 25.0,
        flat_speed_kmh: 5.0,
        vertical_speed_mh: 123.0,
        downhill_factor: 0.3,
        ..Settings::default()
    };

    let track = build_track(&[segment], &settings);

    assert_aligned(&track);
    assert_eq!(track.break_indices, vec![0]);
    assert_eq!(track.totals.ascent_m, 0.0);
    assert_eq!(track.totals.descent_m, 0.0);
    assert!(approx_eq(track.totals.distance_km, 0.1, 1e-6));
    assert!(approx_eq(track.totals.time_hours, 0.02, 1e-6));
    assert_eq!(track.cumulative_distance_km[0], 0.0);
    assert!(track.elevations_m.iter().all(|e| *e == 200.0));
}

#[test]
fn climb_is_accumulated_as_ascent() {
    let elevations: Vec<Option<f64>> = (0..=20).map(|i| Some(100.0 + i as f64 * 5.0)).collect();
    let segment = equator_segment(0.0, 50.0, &elevations);
    let settings = Settings {
        spacing_m: 10.0,
        smoothing_window_m: 30.0,
        elevation_deadband_m: 0.0,
        ..Settings::default()
    };

    let track = build_track(&[segment], &settings);

    assert_aligned(&track);
    // The truncated median window pulls each end half a sample inwards.
    let first = track.elevations_m[0];
    let last = track.elevations_m[track.len() - 1];
    assert!(approx_eq(track.totals.ascent_m, last - first, 1e-6));
    assert!(track.totals.ascent_m > 98.0 && track.totals.ascent_m <= 100.0 + 1e-6);
    assert!(track.totals.descent_m < 1e-6);
    assert_non_decreasing(&track.cumulative_ascent_m);
    assert_non_decreasing(&track.cumulative_time_hours);
}

#[test]
fn segment_breaks_are_free() {
    let first = equator_segment(0.0, 30.0, &[Some(10.0), Some(20.0), Some(30.0), Some(40.0)]);
    let second = equator_segment(1.0, 30.0, &[Some(500.0), Some(480.0), Some(470.0)]);
    let settings = Settings {
        spacing_m: 10.0,
        ..Settings::default()
    };

    let track = build_track(&[first, second], &settings);

    assert_aligned(&track);
    assert_eq!(track.break_indices.len(), 2);
    assert_eq!(track.break_indices[0], 0);
    let b = track.break_indices[1];
    assert!(b > 0);
    assert_eq!(track.cumulative_distance_km[b], track.cumulative_distance_km[b - 1]);
    assert_eq!(track.cumulative_ascent_m[b], track.cumulative_ascent_m[b - 1]);
    assert_eq!(track.cumulative_descent_m[b], track.cumulative_descent_m[b - 1]);
    assert_eq!(track.cumulative_time_hours[b], track.cumulative_time_hours[b - 1]);

    // The two segments are ~111 km apart; none of that is counted.
    assert!(track.totals.distance_km < 0.2);
    assert_non_decreasing(&track.cumulative_distance_km);
    assert_eq!(
        track.totals.distance_km,
        *track.cumulative_distance_km.last().expect("non-empty")
    );
}

#[test]
fn short_segments_are_skipped() {
    let lone = vec![RawPoint::new(10.0, 10.0, Some(1.0))];
    let usable = equator_segment(0.0, 20.0, &[Some(1.0), Some(1.0), Some(1.0)]);

    let track = build_track(&[lone, usable], &Settings::default());

    assert_eq!(track.break_indices, vec![0]);
    assert!(track.points.iter().all(|p| p.lat == 0.0));
}

#[test]
fn no_usable_segments_yield_empty_track() {
    let track = build_track(&[vec![RawPoint::new(0.0, 0.0, None)]], &Settings::default());
    assert!(track.is_empty());
    assert!(track.break_indices.is_empty());
    assert_eq!(track.totals.distance_km, 0.0);
    assert_eq!(track.totals.time_hours, 0.0);
}

#[test]
fn missing_elevation_contributes_nothing() {
    let segment = equator_segment(0.0, 40.0, &[None, None, None]);
    let track = build_track(&[segment], &Settings::default());

    assert_aligned(&track);
    assert!(track.elevations_m.iter().all(|e| *e == 0.0));
    assert_eq!(track.totals.ascent_m, 0.0);
    assert_eq!(track.totals.descent_m, 0.0);
    assert!(track.totals.distance_km > 0.0);
}

#[test]
fn duplicate_point_segment_is_kept_as_two_points() {
    let segment = vec![RawPoint::new(5.0, 5.0, Some(1.0)); 4];
    let track = build_track(&[segment], &Settings::default());

    assert_eq!(track.len(), 2);
    assert_eq!(track.totals.distance_km, 0.0);
    assert_aligned(&track);
}
