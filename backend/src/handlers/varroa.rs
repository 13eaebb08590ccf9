//! Varroa check and treatment HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::varroa::{
    CreateTreatmentInput, CreateVarroaCheckInput, UpdateTreatmentInput, UpdateVarroaCheckInput,
    VarroaFilter, VarroaService,
};
use crate::AppState;

// ============================================================================
// Mite counts
// ============================================================================

/// List mite counts with their assessment
pub async fn list_varroa_checks(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<VarroaFilter>,
) -> impl IntoResponse {
    let service = VarroaService::new(state.db.clone());

    match service.get_checks(current_user.0.user_id, filter).await {
        Ok(checks) => (StatusCode::OK, Json(serde_json::json!({ "checks": checks }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_varroa_check(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(check_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = VarroaService::new(state.db.clone());

    match service.get_check(current_user.0.user_id, check_id).await {
        Ok(check) => (StatusCode::OK, Json(check)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a mite count
pub async fn create_varroa_check(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateVarroaCheckInput>,
) -> impl IntoResponse {
    let service = VarroaService::new(state.db.clone());

    match service.create_check(current_user.0.user_id, input).await {
        Ok(check) => (StatusCode::CREATED, Json(check)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_varroa_check(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(check_id): Path<Uuid>,
    Json(input): Json<UpdateVarroaCheckInput>,
) -> impl IntoResponse {
    let service = VarroaService::new(state.db.clone());

    match service.update_check(current_user.0.user_id, check_id, input).await {
        Ok(check) => (StatusCode::OK, Json(check)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_varroa_check(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(check_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = VarroaService::new(state.db.clone());

    match service.delete_check(current_user.0.user_id, check_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

// ============================================================================
// Treatments
// ============================================================================

/// List treatments with duration and active flag
pub async fn list_varroa_treatments(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<VarroaFilter>,
) -> impl IntoResponse {
    let service = VarroaService::new(state.db.clone());

    match service.get_treatments(current_user.0.user_id, filter).await {
        Ok(treatments) => {
            (StatusCode::OK, Json(serde_json::json!({ "treatments": treatments }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn get_varroa_treatment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(treatment_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = VarroaService::new(state.db.clone());

    match service.get_treatment(current_user.0.user_id, treatment_id).await {
        Ok(treatment) => (StatusCode::OK, Json(treatment)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a treatment
pub async fn create_varroa_treatment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateTreatmentInput>,
) -> impl IntoResponse {
    let service = VarroaService::new(state.db.clone());

    match service.create_treatment(current_user.0.user_id, input).await {
        Ok(treatment) => (StatusCode::CREATED, Json(treatment)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_varroa_treatment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(treatment_id): Path<Uuid>,
    Json(input): Json<UpdateTreatmentInput>,
) -> impl IntoResponse {
    let service = VarroaService::new(state.db.clone());

    match service
        .update_treatment(current_user.0.user_id, treatment_id, input)
        .await
    {
        Ok(treatment) => (StatusCode::OK, Json(treatment)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_varroa_treatment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(treatment_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = VarroaService::new(state.db.clone());

    match service.delete_treatment(current_user.0.user_id, treatment_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
