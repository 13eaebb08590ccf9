//! Queen tracking HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::queen::{CreateQueenInput, QueenService, UpdateQueenInput};
use crate::AppState;

/// List all queens
pub async fn list_queens(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    let service = QueenService::new(state.db.clone());

    match service.get_queens(current_user.0.user_id).await {
        Ok(queens) => (StatusCode::OK, Json(serde_json::json!({ "queens": queens }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific queen
pub async fn get_queen(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(queen_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = QueenService::new(state.db.clone());

    match service.get_queen(current_user.0.user_id, queen_id).await {
        Ok(queen) => (StatusCode::OK, Json(queen)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Daughters of a queen
pub async fn list_queen_daughters(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(queen_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = QueenService::new(state.db.clone());

    match service.get_daughters(current_user.0.user_id, queen_id).await {
        Ok(queens) => (StatusCode::OK, Json(serde_json::json!({ "queens": queens }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Register a queen
pub async fn create_queen(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateQueenInput>,
) -> impl IntoResponse {
    let service = QueenService::new(state.db.clone());

    match service.create_queen(current_user.0.user_id, input).await {
        Ok(queen) => (StatusCode::CREATED, Json(queen)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a queen
pub async fn update_queen(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(queen_id): Path<Uuid>,
    Json(input): Json<UpdateQueenInput>,
) -> impl IntoResponse {
    let service = QueenService::new(state.db.clone());

    match service.update_queen(current_user.0.user_id, queen_id, input).await {
        Ok(queen) => (StatusCode::OK, Json(queen)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a queen
pub async fn delete_queen(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(queen_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = QueenService::new(state.db.clone());

    match service.delete_queen(current_user.0.user_id, queen_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
