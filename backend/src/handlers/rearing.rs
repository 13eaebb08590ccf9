//! Queen rearing HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{AuthUser, CurrentUser};
use crate::services::rearing::{BatchTimeline, CreateBatchInput, RearingService, UpdateBatchInput};
use crate::AppState;

/// List rearing batches with their success rates
pub async fn list_rearing_batches(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    let service = RearingService::new(state.db.clone());

    match service.get_batches(current_user.0.user_id).await {
        Ok(batches) => (StatusCode::OK, Json(serde_json::json!({ "batches": batches }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_rearing_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = RearingService::new(state.db.clone());

    match service.get_batch(current_user.0.user_id, batch_id).await {
        Ok(batch) => (StatusCode::OK, Json(batch)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Calendar of a batch from its graft date
pub async fn get_rearing_timeline(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<BatchTimeline>> {
    let service = RearingService::new(state.db.clone());
    let today = Utc::now().date_naive();
    let timeline = service.get_timeline(user.user_id, batch_id, today).await?;
    Ok(Json(timeline))
}

/// Start a batch
pub async fn create_rearing_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateBatchInput>,
) -> impl IntoResponse {
    let service = RearingService::new(state.db.clone());

    match service.create_batch(current_user.0.user_id, input).await {
        Ok(batch) => (StatusCode::CREATED, Json(batch)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a batch's counts as it progresses
pub async fn update_rearing_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<UpdateBatchInput>,
) -> impl IntoResponse {
    let service = RearingService::new(state.db.clone());

    match service.update_batch(current_user.0.user_id, batch_id, input).await {
        Ok(batch) => (StatusCode::OK, Json(batch)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_rearing_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = RearingService::new(state.db.clone());

    match service.delete_batch(current_user.0.user_id, batch_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
