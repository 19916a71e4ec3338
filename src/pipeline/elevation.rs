//! Elevation conditioning: gap filling, spike removal and deadband
//! integration. All functions are pure and return fresh vectors of the same
//! length as their input.

use crate::types::track::{RawPoint, Segment};

/// Fills missing elevations with the nearest known value.
///
/// A forward pass carries the last known elevation into the gaps that follow
/// it; a backward pass then fills the leading gap from the first known sample.
/// If no point has an elevation the output stays all `None`.
pub fn fill_gaps(points: &[RawPoint]) -> Segment {
    let mut out = points.to_vec();

    let mut last = None;
    for point in out.iter_mut() {
        match point.elevation {
            Some(ele) => last = Some(ele),
            None => point.elevation = last,
        }
    }

    let mut next = None;
    for point in out.iter_mut().rev() {
        match point.elevation {
            Some(ele) => next = Some(ele),
            None => point.elevation = next,
        }
    }

    out
}

/// Converts a smoothing window in metres into an odd sample count within
/// `[min_samples, max_samples]`.
pub fn window_samples(
    desired_m: f64,
    spacing_m: f64,
    min_samples: usize,
    max_samples: usize,
) -> usize {
    let raw = (desired_m / spacing_m).round();
    let raw = if raw.is_finite() && raw > 0.0 {
        raw as usize
    } else {
        min_samples
    };
    clamp_to_odd(raw.max(min_samples), min_samples, max_samples)
}

fn clamp_to_odd(value: usize, min_odd: usize, max_odd: usize) -> usize {
    let value = value.clamp(min_odd, max_odd);
    if value % 2 == 0 {
        if value >= max_odd {
            value - 1
        } else {
            value + 1
        }
    } else {
        value
    }
}

/// Centered sliding median. The window truncates at the sequence ends and
/// ignores `None` samples; a window with no samples yields `None`.
pub fn median_filter(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let half = window / 2;
    let mut scratch = Vec::with_capacity(window);

    (0..n)
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half).min(n - 1);

            scratch.clear();
            scratch.extend(values[start..=end].iter().flatten().copied());
            if scratch.is_empty() {
                return None;
            }

            scratch.sort_by(|a, b| a.total_cmp(b));
            let mid = scratch.len() / 2;
            if scratch.len() % 2 == 1 {
                Some(scratch[mid])
            } else {
                Some((scratch[mid - 1] + scratch[mid]) / 2.0)
            }
        })
        .collect()
}

/// Hysteresis accumulator that swallows elevation changes smaller than
/// `deadband_m`.
///
/// Raw deltas are summed into a running error. Once the error exceeds the
/// deadband the output moves by the excess and the error is reset to the
/// signed deadband, so the owed residual carries into the next excursion
/// instead of being discarded.
pub fn deadband_filter(values: &[Option<f64>], deadband_m: f64) -> Vec<Option<f64>> {
    let Some(seed_idx) = values.iter().position(Option::is_some) else {
        return values.to_vec();
    };
    let seed = values[seed_idx].unwrap_or_default();

    let mut out = vec![Some(seed); values.len()];
    let mut current = seed;
    let mut cum_err = 0.0_f64;

    for i in (seed_idx + 1)..values.len() {
        let prev = values[i - 1].or(values[i]).unwrap_or(current);
        let cur = values[i].unwrap_or(prev);
        cum_err += cur - prev;

        if cum_err.abs() > deadband_m {
            let sign = cum_err.signum();
            current += cum_err - sign * deadband_m;
            cum_err = sign * deadband_m;
        }
        out[i] = Some(current);
    }

    out
}
