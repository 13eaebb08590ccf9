//! Feeding HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::feeding::{CreateFeedingInput, FeedingFilter, FeedingService, UpdateFeedingInput};
use crate::AppState;

/// List feedings, optionally for one hive
pub async fn list_feedings(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<FeedingFilter>,
) -> impl IntoResponse {
    let service = FeedingService::new(state.db.clone());

    match service.get_feedings(current_user.0.user_id, filter).await {
        Ok(feedings) => (StatusCode::OK, Json(serde_json::json!({ "feedings": feedings }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific feeding
pub async fn get_feeding(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(feeding_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = FeedingService::new(state.db.clone());

    match service.get_feeding(current_user.0.user_id, feeding_id).await {
        Ok(feeding) => (StatusCode::OK, Json(feeding)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a feeding
pub async fn create_feeding(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateFeedingInput>,
) -> impl IntoResponse {
    let service = FeedingService::new(state.db.clone());

    match service.create_feeding(current_user.0.user_id, input).await {
        Ok(feeding) => (StatusCode::CREATED, Json(feeding)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a feeding
pub async fn update_feeding(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(feeding_id): Path<Uuid>,
    Json(input): Json<UpdateFeedingInput>,
) -> impl IntoResponse {
    let service = FeedingService::new(state.db.clone());

    match service.update_feeding(current_user.0.user_id, feeding_id, input).await {
        Ok(feeding) => (StatusCode::OK, Json(feeding)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a feeding
pub async fn delete_feeding(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(feeding_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = FeedingService::new(state.db.clone());

    match service.delete_feeding(current_user.0.user_id, feeding_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
