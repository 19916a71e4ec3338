use csv::Writer;

use crate::error::ExportError;
use crate::types::plan::Itinerary;

const HEADERS: [&str; 16] = [
    "#",
    "Name",
    "Critical",
    "Leg - Distance",
    "Leg - Ascent",
    "Leg - Descent",
    "Accumulated - Distance",
    "Accumulated - Ascent",
    "Accumulated - Descent",
    "Time - Base",
    "Time - Stops",
    "Time - Conditions",
    "Time - Total",
    "Time - Accumulated",
    "Time - Remaining",
    "Observations",
];

/// Renders the itinerary as CSV, one row per leg, with values formatted the
/// way they are shown to the user.
pub fn itinerary_csv(itinerary: &Itinerary) -> Result<String, ExportError> {
    let mut wtr = Writer::from_writer(Vec::new());
    wtr.write_record(HEADERS)?;

    for leg in &itinerary.legs {
        wtr.write_record([
            leg.index.to_string(),
            leg.name.clone(),
            if leg.critical { "yes" } else { "no" }.to_string(),
            format_km(leg.distance_km),
            format_m(leg.ascent_m),
            format_m(leg.descent_m),
            format_km(leg.accumulated_distance_km),
            format_m(leg.accumulated_ascent_m),
            format_m(leg.accumulated_descent_m),
            format_hours(leg.base_hours),
            format!("{} min", leg.stops_min),
            format!("{} %", leg.condition_pct),
            format_hours(leg.total_hours),
            format_hours(leg.accumulated_hours),
            format_hours(leg.remaining_hours),
            leg.observations.clone(),
        ])?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| ExportError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Csv(e.to_string()))
}

pub fn format_km(km: f64) -> String {
    if km < 1.0 {
        format!("{} m", (km * 1000.0).round())
    } else {
        format!("{:.2} km", km)
    }
}

fn format_m(m: f64) -> String {
    format!("{} m", m.round())
}

/// `H:MM h`, rounded to the minute.
pub fn format_hours(hours: f64) -> String {
    let total_minutes = (hours * 60.0).round() as i64;
    format!(
        "{}:{:02} h",
        total_minutes.div_euclid(60),
        total_minutes.rem_euclid(60)
    )
}
