use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::settings::SettingsInput;
use crate::types::track::TrackSignature;

pub const MIN_CONDITION_PCT: i32 = -90;
pub const MAX_CONDITION_PCT: i32 = 300;

/// A named point from the GPX file (`<wpt>`, `<rtept>` or a named `<trkpt>`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

/// A leg between two track indices. Used directly as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LegKey {
    pub start: usize,
    pub end: usize,
}

impl LegKey {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// User adjustments attached to a leg.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegOptions {
    pub label: Option<String>,
    pub stops_min: u32,
    pub condition_pct: i32,
    pub critical: bool,
    pub observations: String,
}

impl LegOptions {
    pub fn clamped_condition_pct(&self) -> i32 {
        self.condition_pct.clamp(MIN_CONDITION_PCT, MAX_CONDITION_PCT)
    }
}

/// Raw differences of the cumulative arrays between two indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LegMetrics {
    pub distance_km: f64,
    pub ascent_m: f64,
    pub descent_m: f64,
    pub time_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub index: usize,
    pub key: LegKey,
    pub name: String,
    pub critical: bool,
    pub distance_km: f64,
    pub ascent_m: f64,
    pub descent_m: f64,
    pub base_hours: f64,
    pub stops_min: u32,
    pub condition_pct: i32,
    pub total_hours: f64,
    pub accumulated_distance_km: f64,
    pub accumulated_ascent_m: f64,
    pub accumulated_descent_m: f64,
    pub accumulated_hours: f64,
    pub remaining_hours: f64,
    pub observations: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeRollups {
    pub base_hours: f64,
    pub activity_with_conditions_hours: f64,
    pub stops_hours: f64,
    pub total_hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub legs: Vec<Leg>,
    pub rollups: TimeRollups,
}

/// A marked track index with an optional user label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadbookEntry {
    pub index: usize,
    #[serde(default)]
    pub label: Option<String>,
}

/// Leg options on the wire, keyed by the leg's two track indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegOptionsEntry {
    pub start: usize,
    pub end: usize,
    #[serde(flatten)]
    pub options: LegOptions,
}

pub const PLAN_FORMAT_VERSION: u32 = 2;

fn plan_format_version() -> u32 {
    PLAN_FORMAT_VERSION
}

/// A self-contained plan file: the GPX it was built from, the settings,
/// the roadbook marks and every leg adjustment. Restoring one rebuilds the
/// track from `gpx` instead of trusting stored coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPlan {
    #[serde(default = "plan_format_version")]
    pub version: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub gpx: Option<String>,
    #[serde(default)]
    pub signature: Option<TrackSignature>,
    #[serde(default)]
    pub settings: SettingsInput,
    #[serde(default)]
    pub roadbook: Vec<RoadbookEntry>,
    #[serde(default)]
    pub legs: Vec<LegOptionsEntry>,
    // Informational only, ignored on restore.
    #[serde(default)]
    pub itinerary: Option<Itinerary>,
}
