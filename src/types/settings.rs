use serde::{Deserialize, Serialize};

/// Travel mode selecting the time model's blending rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    /// Hiking/biking blend: the slower axis dominates, half the other is added.
    #[default]
    #[serde(alias = "default")]
    Hike,
    /// Strictly additive horizontal and vertical time.
    Snowshoe,
}

impl Activity {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "hike" | "default" => Some(Activity::Hike),
            "snowshoe" => Some(Activity::Snowshoe),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Hike => "hike",
            Activity::Snowshoe => "snowshoe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub spacing_m: f64,
    pub smoothing_window_m: f64,
    pub elevation_deadband_m: f64,
    pub flat_speed_kmh: f64,
    pub vertical_speed_mh: f64,
    pub downhill_factor: f64,
    #[serde(default)]
    pub activity: Activity,
}

pub const SPACING_RANGE_M: (f64, f64) = (1.0, 100.0);
pub const SMOOTHING_RANGE_M: (f64, f64) = (5.0, 500.0);
pub const DEADBAND_RANGE_M: (f64, f64) = (0.0, 20.0);

impl Default for Settings {
    fn default() -> Self {
        Self {
            spacing_m: 5.0,
            smoothing_window_m: 15.0,
            elevation_deadband_m: 2.0,
            flat_speed_kmh: 4.0,
            vertical_speed_mh: 300.0,
            downhill_factor: 0.6667,
            activity: Activity::Hike,
        }
    }
}

impl Settings {
    pub fn preset(activity: Activity) -> Self {
        match activity {
            Activity::Hike | Activity::Snowshoe => Self {
                spacing_m: 3.0,
                smoothing_window_m: 15.0,
                flat_speed_kmh: 4.0,
                vertical_speed_mh: 300.0,
                downhill_factor: 0.6667,
                activity,
                ..Self::default()
            },
        }
    }
}

/// Settings as submitted by a client. Missing or out-of-range values are
/// replaced before the pipeline ever sees them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsInput {
    pub spacing_m: Option<f64>,
    pub smoothing_window_m: Option<f64>,
    pub elevation_deadband_m: Option<f64>,
    pub flat_speed_kmh: Option<f64>,
    pub vertical_speed_mh: Option<f64>,
    pub downhill_factor: Option<f64>,
    pub activity: Option<Activity>,
}

impl SettingsInput {
    /// Fills gaps from the activity preset when an activity was chosen,
    /// otherwise from the defaults, then clamps to the accepted ranges.
    pub fn resolve(&self) -> Settings {
        let base = self.activity.map(Settings::preset).unwrap_or_default();
        let spacing = positive_or(self.spacing_m, base.spacing_m);
        let smoothing = positive_or(self.smoothing_window_m, base.smoothing_window_m);
        let deadband = non_negative_or(self.elevation_deadband_m, base.elevation_deadband_m);

        Settings {
            spacing_m: spacing.clamp(SPACING_RANGE_M.0, SPACING_RANGE_M.1),
            smoothing_window_m: smoothing.clamp(SMOOTHING_RANGE_M.0, SMOOTHING_RANGE_M.1),
            elevation_deadband_m: deadband.clamp(DEADBAND_RANGE_M.0, DEADBAND_RANGE_M.1),
            flat_speed_kmh: positive_or(self.flat_speed_kmh, base.flat_speed_kmh),
            vertical_speed_mh: positive_or(self.vertical_speed_mh, base.vertical_speed_mh),
            downhill_factor: positive_or(self.downhill_factor, base.downhill_factor),
            activity: self.activity.unwrap_or(base.activity),
        }
    }
}

impl From<Settings> for SettingsInput {
    fn from(settings: Settings) -> Self {
        Self {
            spacing_m: Some(settings.spacing_m),
            smoothing_window_m: Some(settings.smoothing_window_m),
            elevation_deadband_m: Some(settings.elevation_deadband_m),
            flat_speed_kmh: Some(settings.flat_speed_kmh),
            vertical_speed_mh: Some(settings.vertical_speed_mh),
            downhill_factor: Some(settings.downhill_factor),
            activity: Some(settings.activity),
        }
    }
}

fn positive_or(value: Option<f64>, fallback: f64) -> f64 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(fallback)
}

fn non_negative_or(value: Option<f64>, fallback: f64) -> f64 {
    value.filter(|v| v.is_finite() && *v >= 0.0).unwrap_or(fallback)
}
