use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::pipeline::nearest::nearest_index;
use crate::types::plan::{
    Itinerary, Leg, LegKey, LegMetrics, LegOptions, RoadbookEntry, TimeRollups, Waypoint,
};
use crate::types::track::{LatLon, Track};

pub const START_LABEL: &str = "Start";
pub const FINISH_LABEL: &str = "Finish";

/// Marked track indices, kept sorted and unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roadbook {
    entries: Vec<RoadbookEntry>,
}

impl Roadbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snaps every waypoint onto `track`, dropping any that land on an index
    /// already taken, then makes sure start and finish are marked.
    pub fn from_waypoints(track: &Track, waypoints: &[Waypoint]) -> Self {
        let mut roadbook = Self::new();
        if track.is_empty() {
            return roadbook;
        }

        let mut seen = HashSet::new();
        for waypoint in waypoints {
            let idx = nearest_index(LatLon::new(waypoint.lat, waypoint.lon), &track.points);
            if !seen.insert(idx) {
                continue;
            }
            roadbook.add(track, idx, Some(waypoint.name.as_str()));
        }

        roadbook.ensure_endpoints(track);
        roadbook
    }

    /// Builds a roadbook from client-supplied entries, clamping them onto the
    /// track.
    pub fn from_entries(track: &Track, entries: &[RoadbookEntry]) -> Self {
        let mut roadbook = Self::new();
        for entry in entries {
            roadbook.add(track, entry.index, entry.label.as_deref());
        }
        roadbook
    }

    /// Moves every entry onto `next` by snapping the coordinate it had on
    /// `previous`.
    pub fn resnap(&self, previous: &Track, next: &Track) -> Self {
        let mut roadbook = Self::new();
        if next.is_empty() {
            return roadbook;
        }

        for entry in &self.entries {
            let Some(point) = previous.points.get(entry.index) else {
                continue;
            };
            let idx = nearest_index(*point, &next.points);
            roadbook.add(next, idx, entry.label.as_deref());
        }

        roadbook.ensure_endpoints(next);
        roadbook
    }

    pub fn ensure_endpoints(&mut self, track: &Track) {
        if let Some(last) = track.last_index() {
            self.add(track, 0, Some(START_LABEL));
            self.add(track, last, Some(FINISH_LABEL));
        }
    }

    /// Marks `index` (clamped onto the track). An existing entry only picks up
    /// the label if it has none yet. Returns the index actually used.
    pub fn add(&mut self, track: &Track, index: usize, label: Option<&str>) -> Option<usize> {
        let last = track.last_index()?;
        let index = index.min(last);
        let label = label.map(str::trim).filter(|l| !l.is_empty());

        match self.entries.binary_search_by_key(&index, |e| e.index) {
            Ok(pos) => {
                let entry = &mut self.entries[pos];
                if entry.label.is_none() {
                    entry.label = label.map(str::to_string);
                }
            }
            Err(pos) => self.entries.insert(
                pos,
                RoadbookEntry {
                    index,
                    label: label.map(str::to_string),
                },
            ),
        }

        Some(index)
    }

    pub fn entries(&self) -> &[RoadbookEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// User label, or `WP n` from the entry's position (1-based).
    pub fn display_name(&self, index: usize) -> String {
        match self.entries.binary_search_by_key(&index, |e| e.index) {
            Ok(pos) => match &self.entries[pos].label {
                Some(label) => label.clone(),
                None => format!("WP {}", pos + 1),
            },
            Err(_) => format!("WP {}", index),
        }
    }

    pub fn default_leg_label(&self, key: LegKey) -> String {
        format!(
            "{} \u{2192} {}",
            self.display_name(key.start),
            self.display_name(key.end)
        )
    }
}

/// Carries leg options over to a rebuilt track. Both ends of every key are
/// snapped the same way `Roadbook::resnap` moves the marks, so options stay
/// attached to the same stretch of ground. Keys that collapse are dropped.
pub fn remap_leg_options(
    options: &HashMap<LegKey, LegOptions>,
    previous: &Track,
    next: &Track,
) -> HashMap<LegKey, LegOptions> {
    let mut remapped = HashMap::new();
    if next.is_empty() {
        return remapped;
    }

    let snap = |index: usize| {
        previous
            .points
            .get(index)
            .map(|point| nearest_index(*point, &next.points))
    };

    for (key, opts) in options {
        let (Some(start), Some(end)) = (snap(key.start), snap(key.end)) else {
            continue;
        };
        if start >= end {
            continue;
        }
        remapped
            .entry(LegKey::new(start, end))
            .or_insert_with(|| opts.clone());
    }

    remapped
}

/// Differences of the cumulative arrays between the two (clamped) indices.
pub fn leg_metrics(track: &Track, key: LegKey) -> LegMetrics {
    let Some(last) = track.last_index() else {
        return LegMetrics::default();
    };
    let (a, b) = (key.start.min(last), key.end.min(last));

    let diff = |values: &[f64]| {
        let from = values.get(a).copied().unwrap_or(0.0);
        let to = values.get(b).copied().unwrap_or(from);
        to - from
    };

    LegMetrics {
        distance_km: diff(&track.cumulative_distance_km),
        ascent_m: diff(&track.cumulative_ascent_m),
        descent_m: diff(&track.cumulative_descent_m),
        time_hours: diff(&track.cumulative_time_hours),
    }
}

/// Base time scaled by the condition percentage plus stop time.
pub fn adjusted_hours(base_hours: f64, options: &LegOptions) -> f64 {
    base_hours * (1.0 + options.clamped_condition_pct() as f64 / 100.0)
        + options.stops_min as f64 / 60.0
}

pub fn build_itinerary(
    track: &Track,
    roadbook: &Roadbook,
    options: &HashMap<LegKey, LegOptions>,
) -> Itinerary {
    let Some(last) = track.last_index() else {
        return Itinerary::default();
    };
    if roadbook.len() < 2 {
        return Itinerary {
            legs: Vec::new(),
            rollups: fallback_rollups(track),
        };
    }

    let defaults = LegOptions::default();
    let mut legs = Vec::with_capacity(roadbook.len() - 1);
    let mut rollups = TimeRollups::default();
    let (mut acc_km, mut acc_up, mut acc_down, mut acc_h) = (0.0, 0.0, 0.0, 0.0);

    for (k, pair) in roadbook.entries().windows(2).enumerate() {
        let key = LegKey::new(pair[0].index.min(last), pair[1].index.min(last));
        let opts = options.get(&key).unwrap_or(&defaults);
        let metrics = leg_metrics(track, key);
        let total_hours = adjusted_hours(metrics.time_hours, opts);

        rollups.base_hours += metrics.time_hours;
        rollups.activity_with_conditions_hours +=
            metrics.time_hours * (1.0 + opts.clamped_condition_pct() as f64 / 100.0);
        rollups.stops_hours += opts.stops_min as f64 / 60.0;

        acc_km += metrics.distance_km;
        acc_up += metrics.ascent_m;
        acc_down += metrics.descent_m;
        acc_h += total_hours;

        let name = opts
            .label
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| roadbook.default_leg_label(key));

        legs.push(Leg {
            index: k + 1,
            key,
            name,
            critical: opts.critical,
            distance_km: metrics.distance_km,
            ascent_m: metrics.ascent_m,
            descent_m: metrics.descent_m,
            base_hours: metrics.time_hours,
            stops_min: opts.stops_min,
            condition_pct: opts.clamped_condition_pct(),
            total_hours,
            accumulated_distance_km: acc_km,
            accumulated_ascent_m: acc_up,
            accumulated_descent_m: acc_down,
            accumulated_hours: acc_h,
            remaining_hours: 0.0,
            observations: opts.observations.clone(),
        });
    }

    rollups.total_hours = rollups.activity_with_conditions_hours + rollups.stops_hours;
    for leg in &mut legs {
        leg.remaining_hours = acc_h - leg.accumulated_hours;
    }

    Itinerary { legs, rollups }
}

fn fallback_rollups(track: &Track) -> TimeRollups {
    let base = track.cumulative_time_hours.last().copied().unwrap_or(0.0);
    TimeRollups {
        base_hours: base,
        activity_with_conditions_hours: base,
        stops_hours: 0.0,
        total_hours: base,
    }
}
