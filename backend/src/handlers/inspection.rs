//! Inspection HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{AuthUser, CurrentUser};
use crate::services::inspection::{
    CreateInspectionInput, InspectionFilter, InspectionService, UpdateInspectionInput,
};
use crate::AppState;
use shared::models::InspectionAverages;

/// List inspections by hive and date range
pub async fn list_inspections(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<InspectionFilter>,
) -> impl IntoResponse {
    let service = InspectionService::new(state.db.clone());

    match service.get_inspections(current_user.0.user_id, &filter).await {
        Ok(inspections) => {
            (StatusCode::OK, Json(serde_json::json!({ "inspections": inspections }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Averages over the inspections in a date range
pub async fn get_inspection_averages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<InspectionFilter>,
) -> AppResult<Json<InspectionAverages>> {
    let service = InspectionService::new(state.db.clone());
    let averages = service.get_averages(user.user_id, &filter).await?;
    Ok(Json(averages))
}

/// Get a specific inspection
pub async fn get_inspection(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(inspection_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = InspectionService::new(state.db.clone());

    match service.get_inspection(current_user.0.user_id, inspection_id).await {
        Ok(inspection) => (StatusCode::OK, Json(inspection)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record an inspection
pub async fn create_inspection(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateInspectionInput>,
) -> impl IntoResponse {
    let service = InspectionService::new(state.db.clone());

    match service.create_inspection(current_user.0.user_id, input).await {
        Ok(inspection) => (StatusCode::CREATED, Json(inspection)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update an inspection
pub async fn update_inspection(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(inspection_id): Path<Uuid>,
    Json(input): Json<UpdateInspectionInput>,
) -> impl IntoResponse {
    let service = InspectionService::new(state.db.clone());

    match service
        .update_inspection(current_user.0.user_id, inspection_id, input)
        .await
    {
        Ok(inspection) => (StatusCode::OK, Json(inspection)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete an inspection
pub async fn delete_inspection(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(inspection_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = InspectionService::new(state.db.clone());

    match service.delete_inspection(current_user.0.user_id, inspection_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
