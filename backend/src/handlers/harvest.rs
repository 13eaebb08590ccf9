//! Harvest management HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{AuthUser, CurrentUser};
use crate::services::harvest::{
    HarvestFilter, HarvestService, HarvestSummary, RecordHarvestInput, UpdateHarvestInput,
};
use crate::AppState;

#[derive(Deserialize)]
pub struct SummaryQuery {
    pub year: Option<i32>,
}

/// List all harvests
pub async fn list_harvests(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<HarvestFilter>,
) -> impl IntoResponse {
    let service = HarvestService::new(state.db.clone());

    match service.get_harvests(current_user.0.user_id, filter).await {
        Ok(harvests) => (StatusCode::OK, Json(serde_json::json!({ "harvests": harvests }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Yearly totals per apiary
pub async fn get_harvest_summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<HarvestSummary>> {
    let service = HarvestService::new(state.db.clone());
    let summary = service.get_summary(user.user_id, query.year).await?;
    Ok(Json(summary))
}

/// Get a specific harvest
pub async fn get_harvest(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(harvest_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = HarvestService::new(state.db.clone());

    match service.get_harvest(current_user.0.user_id, harvest_id).await {
        Ok(harvest) => (StatusCode::OK, Json(harvest)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a new harvest
pub async fn record_harvest(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordHarvestInput>,
) -> impl IntoResponse {
    let service = HarvestService::new(state.db.clone());

    match service.record_harvest(current_user.0.user_id, input).await {
        Ok(harvest) => (StatusCode::CREATED, Json(harvest)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a harvest
pub async fn update_harvest(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(harvest_id): Path<Uuid>,
    Json(input): Json<UpdateHarvestInput>,
) -> impl IntoResponse {
    let service = HarvestService::new(state.db.clone());

    match service.update_harvest(current_user.0.user_id, harvest_id, input).await {
        Ok(harvest) => (StatusCode::OK, Json(harvest)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a harvest
pub async fn delete_harvest(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(harvest_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = HarvestService::new(state.db.clone());

    match service.delete_harvest(current_user.0.user_id, harvest_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
