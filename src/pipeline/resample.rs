use crate::pipeline::geo::haversine_m;
use crate::types::track::{RawPoint, ResampledPoint};

/// Rebuilds `points` at uniform arc-length spacing.
///
/// Targets run `0, spacing, 2*spacing, ...` up to the segment length, and the
/// exact end is appended when the grid does not land on it. Positions are
/// linearly interpolated between the bracketing input points. Elevation is
/// only interpolated when both bounds carry one; otherwise whichever bound has
/// a value is used as-is.
///
/// A segment whose length is zero or not finite comes back as its first two
/// points at most.
pub fn resample_by_distance(points: &[RawPoint], spacing_m: f64) -> Vec<ResampledPoint> {
    if points.is_empty() {
        return Vec::new();
    }

    let mut cumulative = Vec::with_capacity(points.len());
    cumulative.push(0.0);
    for pair in points.windows(2) {
        let d = haversine_m(pair[0].lat, pair[0].lon, pair[1].lat, pair[1].lon);
        cumulative.push(cumulative[cumulative.len() - 1] + d);
    }

    let total = cumulative[cumulative.len() - 1];
    if !total.is_finite() || total == 0.0 {
        return points[..points.len().min(2)].to_vec();
    }

    let mut targets = Vec::with_capacity((total / spacing_m) as usize + 2);
    let mut step = 0usize;
    loop {
        let target = step as f64 * spacing_m;
        if target > total {
            break;
        }
        targets.push(target);
        step += 1;
    }
    if targets.last().is_some_and(|&last| last < total) {
        targets.push(total);
    }

    let last_point = points[points.len() - 1];
    let mut out = Vec::with_capacity(targets.len());
    let mut j = 1;

    for target in targets {
        while j < cumulative.len() && cumulative[j] < target {
            j += 1;
        }
        if j >= cumulative.len() {
            out.push(last_point);
            continue;
        }

        let (d0, d1) = (cumulative[j - 1], cumulative[j]);
        let (p0, p1) = (points[j - 1], points[j]);
        let span = d1 - d0;
        let a = if span > 0.0 {
            ((target - d0) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let elevation = match (p0.elevation, p1.elevation) {
            (Some(e0), Some(e1)) => Some(e0 + a * (e1 - e0)),
            (e0, e1) => e0.or(e1),
        };

        out.push(RawPoint {
            lat: p0.lat + a * (p1.lat - p0.lat),
            lon: p0.lon + a * (p1.lon - p0.lon),
            elevation,
        });
    }

    pin_endpoints(&mut out, points);
    out
}

/// Interpolation at `a == 1` can drift by an ulp; the segment's own first and
/// last coordinates are reported exactly.
fn pin_endpoints(out: &mut [ResampledPoint], points: &[RawPoint]) {
    if let (Some(first), Some(src)) = (out.first_mut(), points.first()) {
        pin(first, src);
    }
    if let (Some(last), Some(src)) = (out.last_mut(), points.last()) {
        pin(last, src);
    }
}

fn pin(sample: &mut ResampledPoint, src: &RawPoint) {
    sample.lat = src.lat;
    sample.lon = src.lon;
    if src.elevation.is_some() {
        sample.elevation = src.elevation;
    }
}
