//! Apiary management HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::apiary::{ApiaryService, CreateApiaryInput, UpdateApiaryInput};
use crate::AppState;

/// List all apiaries of the current user
pub async fn list_apiaries(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    let service = ApiaryService::new(state.db.clone());

    match service.get_apiaries(current_user.0.user_id).await {
        Ok(apiaries) => (StatusCode::OK, Json(serde_json::json!({ "apiaries": apiaries }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific apiary
pub async fn get_apiary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(apiary_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ApiaryService::new(state.db.clone());

    match service.get_apiary(current_user.0.user_id, apiary_id).await {
        Ok(apiary) => (StatusCode::OK, Json(apiary)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List the hives placed in an apiary
pub async fn list_apiary_hives(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(apiary_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ApiaryService::new(state.db.clone());

    match service.get_apiary_hives(current_user.0.user_id, apiary_id).await {
        Ok(hives) => (StatusCode::OK, Json(serde_json::json!({ "hives": hives }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a new apiary
pub async fn create_apiary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateApiaryInput>,
) -> impl IntoResponse {
    let service = ApiaryService::new(state.db.clone());

    match service.create_apiary(current_user.0.user_id, input).await {
        Ok(apiary) => (StatusCode::CREATED, Json(apiary)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update an apiary
pub async fn update_apiary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(apiary_id): Path<Uuid>,
    Json(input): Json<UpdateApiaryInput>,
) -> impl IntoResponse {
    let service = ApiaryService::new(state.db.clone());

    match service.update_apiary(current_user.0.user_id, apiary_id, input).await {
        Ok(apiary) => (StatusCode::OK, Json(apiary)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete an apiary
pub async fn delete_apiary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(apiary_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ApiaryService::new(state.db.clone());

    match service.delete_apiary(current_user.0.user_id, apiary_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
