use std::collections::HashMap;

use axum::extract::Multipart;
use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, ParseError};
use crate::pipeline::{build_track, itinerary::Roadbook, parse};
use crate::state::{AppState, Plan};
use crate::types::plan::RoadbookEntry;
use crate::types::settings::{Activity, Settings, SettingsInput};
use crate::types::track::Totals;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/upload", post(upload))
}

#[derive(Serialize, Deserialize)]
pub struct UploadResponse {
    pub plan_id: String,
    pub name: String,
    pub points: usize,
    pub segments: usize,
    pub totals: Totals,
    pub settings: Settings,
    pub roadbook: Vec<RoadbookEntry>,
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;
    let mut settings = SettingsInput::default();
    let mut import_waypoints = true;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();

        // Everything except the file itself is a settings field
        if name == "file" {
            filename = field.file_name().map(|s| s.to_string());
            file_bytes = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file bytes: {}", e)))?
                    .to_vec(),
            );
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read field {}: {}", name, e)))?;
        apply_setting_field(&mut settings, &mut import_waypoints, &name, &value)?;
    }

    let bytes = file_bytes.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;
    let filename = filename.ok_or_else(|| AppError::BadRequest("No filename provided".to_string()))?;

    if !filename.to_lowercase().ends_with(".gpx") {
        return Err(AppError::BadRequest("Unsupported file format".to_string()));
    }
    if bytes.len() > state.config().max_file_size {
        return Err(AppError::BadRequest("File too large".to_string()));
    }

    tracing::info!("Parsing GPX file: {}", filename);

    let document = parse::parse_document(&bytes)?;
    let segments = document.segments();
    if segments.is_empty() {
        return Err(ParseError::NoSegments.into());
    }

    let settings = settings.resolve();
    // Short segments can all vanish after resampling
    let track = build_track(&segments, &settings);
    if track.is_empty() {
        return Err(ParseError::NoSegments.into());
    }

    let waypoints = if import_waypoints {
        document.named_points()
    } else {
        Vec::new()
    };
    let roadbook = Roadbook::from_waypoints(&track, &waypoints);

    let plan_id = Uuid::new_v4().to_string();
    let name = filename
        .rsplit_once('.')
        .map(|(stem, _)| stem.to_string())
        .unwrap_or_else(|| filename.clone());

    let response = UploadResponse {
        plan_id: plan_id.clone(),
        name: name.clone(),
        points: track.len(),
        segments: track.segment_count(),
        totals: track.totals,
        settings,
        roadbook: roadbook.entries().to_vec(),
    };

    tracing::info!(
        "Uploaded {} as plan {} ({} points, {} segments, {:.2} km, {} waypoints)",
        filename,
        plan_id,
        track.len(),
        track.segment_count(),
        track.totals.distance_km,
        roadbook.len()
    );

    state.insert(
        plan_id,
        Plan {
            name,
            created_at: Utc::now(),
            source: String::from_utf8_lossy(&bytes).into_owned(),
            segments,
            settings,
            track,
            roadbook,
            legs: HashMap::new(),
        },
    );

    Ok(Json(response))
}

fn apply_setting_field(
    settings: &mut SettingsInput,
    import_waypoints: &mut bool,
    name: &str,
    value: &str,
) -> Result<(), AppError> {
    let value = value.trim();
    let number = || value.parse::<f64>().ok();

    match name {
        "spacing_m" => settings.spacing_m = number(),
        "smoothing_window_m" => settings.smoothing_window_m = number(),
        "elevation_deadband_m" => settings.elevation_deadband_m = number(),
        "flat_speed_kmh" => settings.flat_speed_kmh = number(),
        "vertical_speed_mh" => settings.vertical_speed_mh = number(),
        "downhill_factor" => settings.downhill_factor = number(),
        "activity" => {
            let activity = Activity::from_str(value)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown activity: {}", value)))?;
            settings.activity = Some(activity);
        }
        "import_waypoints" => *import_waypoints = !matches!(value, "false" | "0" | "off"),
        _ => {}
    }

    Ok(())
}
