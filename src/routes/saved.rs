use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::plan::load;
use super::upload::UploadResponse;
use crate::error::{AppError, ParseError};
use crate::pipeline::itinerary::{build_itinerary, Roadbook};
use crate::pipeline::{build_track, parse};
use crate::state::{AppState, Plan};
use crate::types::plan::{SavedPlan, PLAN_FORMAT_VERSION};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/plans/:plan_id/export", get(export))
        .route("/api/plans/import", post(import))
}

#[derive(Serialize, Deserialize)]
pub struct ImportResponse {
    #[serde(flatten)]
    pub plan: UploadResponse,
    pub signature_matches: bool,
}

async fn export(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let plan = load(&state, &plan_id)?;

    let saved = SavedPlan {
        version: PLAN_FORMAT_VERSION,
        created_at: Some(Utc::now()),
        name: Some(plan.name.clone()),
        gpx: Some(plan.source.clone()),
        signature: Some(plan.track.signature()),
        settings: plan.settings.into(),
        roadbook: plan.roadbook.entries().to_vec(),
        legs: plan.leg_option_entries(),
        itinerary: Some(build_itinerary(&plan.track, &plan.roadbook, &plan.legs)),
    };

    tracing::info!(
        "Exported plan {} ({} marks, {} leg adjustments)",
        plan_id,
        saved.roadbook.len(),
        saved.legs.len()
    );

    let disposition = format!(
        "attachment; filename=\"{}.plan.json\"",
        plan.name.replace('"', "")
    );
    Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(saved)))
}

async fn import(
    State(state): State<AppState>,
    Json(saved): Json<SavedPlan>,
) -> Result<Json<ImportResponse>, AppError> {
    if saved.version > PLAN_FORMAT_VERSION {
        return Err(AppError::BadRequest(format!(
            "Unsupported plan version: {}",
            saved.version
        )));
    }
    let source = saved
        .gpx
        .filter(|gpx| !gpx.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Saved plan has no embedded GPX".to_string()))?;

    // Rebuild from the embedded GPX with the saved settings, skipping the
    // file's own waypoints: the saved roadbook replaces them
    let segments = parse::parse_segments(source.as_bytes())?;
    let settings = saved.settings.resolve();
    let track = build_track(&segments, &settings);
    if track.is_empty() {
        return Err(ParseError::NoSegments.into());
    }

    let signature = track.signature();
    let signature_matches = match saved.signature {
        Some(expected) if expected.points != signature.points => {
            tracing::warn!(
                "Saved plan was built with {} points, rebuilt track has {}. Legs may not align",
                expected.points,
                signature.points
            );
            false
        }
        _ => true,
    };

    let mut roadbook = Roadbook::from_entries(&track, &saved.roadbook);
    roadbook.ensure_endpoints(&track);

    let plan_id = Uuid::new_v4().to_string();
    let name = saved
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "plan".to_string());

    let mut plan = Plan {
        name,
        created_at: Utc::now(),
        source,
        segments,
        settings,
        track,
        roadbook,
        legs: HashMap::new(),
    };
    plan.merge_leg_options(saved.legs);

    let response = ImportResponse {
        plan: UploadResponse {
            plan_id: plan_id.clone(),
            name: plan.name.clone(),
            points: plan.track.len(),
            segments: plan.track.segment_count(),
            totals: plan.track.totals,
            settings,
            roadbook: plan.roadbook.entries().to_vec(),
        },
        signature_matches,
    };

    tracing::info!(
        "Restored plan {} as {} ({} points, {} marks, {} leg adjustments)",
        plan.name,
        plan_id,
        plan.track.len(),
        plan.roadbook.len(),
        plan.legs.len()
    );

    state.insert(plan_id, plan);

    Ok(Json(response))
}
