use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::Error;
use crate::models::*;
use crate::services::Services;

type ApiResult<T> = Result<T, (StatusCode, String)>;

// ============================================================
// Error Handling
// ============================================================

/// Map a service error to a status code and body.
///
/// Lifecycle and validation messages are safe to show the caller. Storage
/// failures are logged in full here and answered with a generic message.
fn api_error(e: Error) -> (StatusCode, String) {
    let status = match &e {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::InvalidOperation(_) => StatusCode::CONFLICT,
        Error::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
        Error::Storage(_) => {
            tracing::error!("Internal error: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            );
        }
    };

    tracing::warn!("Rejected request ({}): {}", status, e);
    (status, e.to_string())
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Cats
// ============================================================

pub async fn list_cats(State(services): State<Services>) -> ApiResult<Json<Vec<Cat>>> {
    services.cats.list().map(Json).map_err(api_error)
}

pub async fn get_cat(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Cat>> {
    services.cats.get(id).map(Json).map_err(api_error)
}

pub async fn create_cat(
    State(services): State<Services>,
    Json(input): Json<CreateCatInput>,
) -> ApiResult<(StatusCode, Json<Cat>)> {
    services
        .cats
        .create(input)
        .await
        .map(|c| (StatusCode::CREATED, Json(c)))
        .map_err(api_error)
}

pub async fn update_cat(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCatInput>,
) -> ApiResult<Json<Cat>> {
    services.cats.update(id, input).map(Json).map_err(api_error)
}

pub async fn delete_cat(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    services
        .cats
        .delete(id)
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(api_error)
}

// ============================================================
// Missions
// ============================================================

pub async fn list_missions(
    State(services): State<Services>,
) -> ApiResult<Json<Vec<MissionWithTargets>>> {
    services.missions.list().map(Json).map_err(api_error)
}

pub async fn get_mission(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MissionWithTargets>> {
    services.missions.get(id).map(Json).map_err(api_error)
}

pub async fn create_mission(
    State(services): State<Services>,
    Json(input): Json<CreateMissionInput>,
) -> ApiResult<(StatusCode, Json<MissionWithTargets>)> {
    services
        .missions
        .create(input)
        .map(|m| (StatusCode::CREATED, Json(m)))
        .map_err(api_error)
}

pub async fn update_mission(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateMissionInput>,
) -> ApiResult<Json<MissionWithTargets>> {
    services
        .missions
        .update(id, input)
        .map(Json)
        .map_err(api_error)
}

pub async fn delete_mission(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    services
        .missions
        .delete(id)
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(api_error)
}

pub async fn assign_cat(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
    Json(input): Json<AssignCatInput>,
) -> ApiResult<Json<MissionWithTargets>> {
    services
        .missions
        .assign_cat(id, input.cat_id)
        .map(Json)
        .map_err(api_error)
}

pub async fn complete_mission(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MissionWithTargets>> {
    services.missions.complete(id).map(Json).map_err(api_error)
}

// ============================================================
// Targets
// ============================================================

pub async fn add_target(
    State(services): State<Services>,
    Path(mission_id): Path<Uuid>,
    Json(input): Json<TargetInput>,
) -> ApiResult<(StatusCode, Json<Target>)> {
    services
        .missions
        .add_target(mission_id, input)
        .map(|t| (StatusCode::CREATED, Json(t)))
        .map_err(api_error)
}

pub async fn update_target(
    State(services): State<Services>,
    Path((mission_id, target_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<TargetInput>,
) -> ApiResult<Json<Target>> {
    services
        .missions
        .update_target(mission_id, target_id, input)
        .map(Json)
        .map_err(api_error)
}

pub async fn delete_target(
    State(services): State<Services>,
    Path((mission_id, target_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    services
        .missions
        .delete_target(mission_id, target_id)
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(api_error)
}

pub async fn complete_target(
    State(services): State<Services>,
    Path((mission_id, target_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Target>> {
    services
        .missions
        .complete_target(mission_id, target_id)
        .map(Json)
        .map_err(api_error)
}

pub async fn update_target_notes(
    State(services): State<Services>,
    Path((mission_id, target_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdateNotesInput>,
) -> ApiResult<Json<Target>> {
    services
        .missions
        .update_target_notes(mission_id, target_id, input)
        .map(Json)
        .map_err(api_error)
}
