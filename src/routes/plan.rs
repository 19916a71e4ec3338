use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::pipeline::geo::haversine_km;
use crate::pipeline::itinerary::{build_itinerary, remap_leg_options, Roadbook};
use crate::pipeline::{build_track, export, nearest::nearest_index};
use crate::state::{AppState, Plan};
use crate::types::plan::{Itinerary, LegOptionsEntry, RoadbookEntry};
use crate::types::settings::{Settings, SettingsInput};
use crate::types::track::{LatLon, Totals, Track};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/plans/:plan_id/track", get(track))
        .route("/api/plans/:plan_id/rebuild", post(rebuild))
        .route("/api/plans/:plan_id/nearest", get(nearest))
        .route("/api/plans/:plan_id/itinerary", post(itinerary))
        .route("/api/plans/:plan_id/itinerary.csv", post(itinerary_csv))
}

#[derive(Serialize, Deserialize)]
pub struct RebuildResponse {
    pub points: usize,
    pub segments: usize,
    pub totals: Totals,
    pub settings: Settings,
    pub roadbook: Vec<RoadbookEntry>,
}

#[derive(Deserialize)]
struct NearestQuery {
    lat: f64,
    lon: f64,
}

#[derive(Serialize, Deserialize)]
pub struct NearestResponse {
    pub index: usize,
    pub lat: f64,
    pub lon: f64,
    pub distance_km: f64,
    pub cumulative_distance_km: f64,
}

/// Edits to apply before computing the itinerary. Both parts are optional and
/// are stored on the plan, so later requests see them without resending.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ItineraryRequest {
    waypoints: Option<Vec<RoadbookEntry>>,
    legs: Option<Vec<LegOptionsEntry>>,
}

pub(crate) fn load(state: &AppState, plan_id: &str) -> Result<Plan, AppError> {
    state
        .get(plan_id)
        .ok_or_else(|| AppError::NotFound(plan_id.to_string()))
}

async fn track(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Result<Json<Track>, AppError> {
    Ok(Json(load(&state, &plan_id)?.track))
}

async fn rebuild(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
    Json(input): Json<SettingsInput>,
) -> Result<Json<RebuildResponse>, AppError> {
    let previous = load(&state, &plan_id)?;
    let settings = input.resolve();
    let track = build_track(&previous.segments, &settings);
    if track.is_empty() {
        return Err(AppError::BadRequest(
            "No usable segments with these settings".to_string(),
        ));
    }
    // Marks and leg options move with their coordinates, not their indices
    let roadbook = previous.roadbook.resnap(&previous.track, &track);
    let legs = remap_leg_options(&previous.legs, &previous.track, &track);

    tracing::info!(
        "Rebuilt plan {} ({} -> {} points, {:.2} km)",
        plan_id,
        previous.track.len(),
        track.len(),
        track.totals.distance_km
    );

    let response = RebuildResponse {
        points: track.len(),
        segments: track.segment_count(),
        totals: track.totals,
        settings,
        roadbook: roadbook.entries().to_vec(),
    };

    state
        .replace(
            &plan_id,
            Plan {
                settings,
                track,
                roadbook,
                legs,
                ..previous
            },
        )
        .ok_or_else(|| AppError::NotFound(plan_id.clone()))?;

    Ok(Json(response))
}

async fn nearest(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
    Query(query): Query<NearestQuery>,
) -> Result<Json<NearestResponse>, AppError> {
    let plan = load(&state, &plan_id)?;
    let track = &plan.track;
    if track.is_empty() {
        return Err(AppError::BadRequest("Plan has an empty track".to_string()));
    }

    // Ties resolve to the earliest index
    let index = nearest_index(LatLon::new(query.lat, query.lon), &track.points);
    let point = track.points[index];

    Ok(Json(NearestResponse {
        index,
        lat: point.lat,
        lon: point.lon,
        distance_km: haversine_km(query.lat, query.lon, point.lat, point.lon),
        cumulative_distance_km: track.cumulative_distance_km[index],
    }))
}

fn apply_edits(state: &AppState, plan_id: &str, request: ItineraryRequest) -> Result<Plan, AppError> {
    let mut plan = load(state, plan_id)?;
    if request.waypoints.is_none() && request.legs.is_none() {
        return Ok(plan);
    }

    if let Some(entries) = &request.waypoints {
        plan.roadbook = Roadbook::from_entries(&plan.track, entries);
    }
    if let Some(legs) = request.legs {
        plan.merge_leg_options(legs);
    }

    state
        .replace(plan_id, plan.clone())
        .ok_or_else(|| AppError::NotFound(plan_id.to_string()))?;
    Ok(plan)
}

fn compute_itinerary(plan: &Plan) -> Itinerary {
    build_itinerary(&plan.track, &plan.roadbook, &plan.legs)
}

async fn itinerary(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
    Json(request): Json<ItineraryRequest>,
) -> Result<Json<Itinerary>, AppError> {
    let plan = apply_edits(&state, &plan_id, request)?;
    Ok(Json(compute_itinerary(&plan)))
}

async fn itinerary_csv(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
    Json(request): Json<ItineraryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let plan = apply_edits(&state, &plan_id, request)?;
    let itinerary = compute_itinerary(&plan);
    let csv = export::itinerary_csv(&itinerary)?;

    let disposition = format!("attachment; filename=\"{}.csv\"", plan.name.replace('"', ""));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
