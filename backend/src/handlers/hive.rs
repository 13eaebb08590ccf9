//! Hive management HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::hive::{CreateHiveInput, HiveFilter, HiveService, UpdateHiveInput};
use crate::services::inspection::InspectionService;
use crate::AppState;

/// List hives, optionally for one apiary
pub async fn list_hives(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<HiveFilter>,
) -> impl IntoResponse {
    let service = HiveService::new(state.db.clone());

    match service.get_hives(current_user.0.user_id, filter).await {
        Ok(hives) => (StatusCode::OK, Json(serde_json::json!({ "hives": hives }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific hive
pub async fn get_hive(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(hive_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = HiveService::new(state.db.clone());

    match service.get_hive(current_user.0.user_id, hive_id).await {
        Ok(hive) => (StatusCode::OK, Json(hive)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Inspection history of a hive
pub async fn list_hive_inspections(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(hive_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = InspectionService::new(state.db.clone());

    match service.get_hive_inspections(current_user.0.user_id, hive_id).await {
        Ok(inspections) => {
            (StatusCode::OK, Json(serde_json::json!({ "inspections": inspections }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Create a new hive
pub async fn create_hive(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateHiveInput>,
) -> impl IntoResponse {
    let service = HiveService::new(state.db.clone());

    match service.create_hive(current_user.0.user_id, input).await {
        Ok(hive) => (StatusCode::CREATED, Json(hive)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a hive
pub async fn update_hive(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(hive_id): Path<Uuid>,
    Json(input): Json<UpdateHiveInput>,
) -> impl IntoResponse {
    let service = HiveService::new(state.db.clone());

    match service.update_hive(current_user.0.user_id, hive_id, input).await {
        Ok(hive) => (StatusCode::OK, Json(hive)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a hive
pub async fn delete_hive(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(hive_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = HiveService::new(state.db.clone());

    match service.delete_hive(current_user.0.user_id, hive_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
