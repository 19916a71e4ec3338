use serde::{Deserialize, Serialize};

/// A point as delivered by the GPX reader. Elevation may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub lat: f64,
    pub lon: f64,
    pub elevation: Option<f64>,
}

impl RawPoint {
    pub fn new(lat: f64, lon: f64, elevation: Option<f64>) -> Self {
        Self { lat, lon, elevation }
    }
}

/// One contiguous recorded portion of a route (one `<trkseg>`).
pub type Segment = Vec<RawPoint>;

/// A point after uniform arc-length resampling.
pub type ResampledPoint = RawPoint;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub distance_km: f64,
    pub ascent_m: f64,
    pub descent_m: f64,
    pub time_hours: f64,
}

/// The concatenated, filtered track with per-point cumulative metrics.
///
/// Every cumulative array has exactly one entry per point in `points` and is
/// non-decreasing. At each segment break the previous value is carried
/// forward, so the jump between two disconnected segments costs nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub points: Vec<LatLon>,
    pub elevations_m: Vec<f64>,
    pub break_indices: Vec<usize>,
    pub cumulative_distance_km: Vec<f64>,
    pub cumulative_ascent_m: Vec<f64>,
    pub cumulative_descent_m: Vec<f64>,
    pub cumulative_time_hours: Vec<f64>,
    pub totals: Totals,
}

impl Track {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.points.len().checked_sub(1)
    }

    pub fn segment_count(&self) -> usize {
        self.break_indices.len()
    }
}

/// Coarse fingerprint of a built track, stored with saved plans so a restore
/// can tell whether the same GPX and settings produced the same points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackSignature {
    pub points: usize,
    pub distance_km: f64,
}

impl Track {
    pub fn signature(&self) -> TrackSignature {
        TrackSignature {
            points: self.len(),
            distance_km: self.totals.distance_km,
        }
    }
}
