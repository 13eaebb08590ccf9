//! Authentication, profile and user administration handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::external::auth_provider::{AuthProviderClient, LoginInput, RefreshInput, SignupInput};
use crate::middleware::AuthUser;
use crate::services::profile::{SetRoleInput, UpdateProfileInput, UserProfile};
use crate::services::profile::ProfileService;
use crate::AppState;
use shared::models::AppRole;

#[derive(Serialize)]
pub struct MeResponse {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: AppRole,
    pub is_admin: bool,
}

/// Sign-up endpoint handler, forwarded to the hosted auth service
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupInput>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    body.validate()?;
    let client = AuthProviderClient::new(&state.config.auth);
    let session = client.signup(&body).await?;

    tracing::info!("New account signed up");

    Ok((StatusCode::CREATED, Json(session)))
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginInput>,
) -> Result<Json<Value>, AppError> {
    body.validate()?;
    let client = AuthProviderClient::new(&state.config.auth);
    let session = client.login(&body).await?;
    Ok(Json(session))
}

/// Refresh token endpoint handler
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshInput>,
) -> Result<Json<Value>, AppError> {
    body.validate()?;
    let client = AuthProviderClient::new(&state.config.auth);
    let session = client.refresh(&body).await?;
    Ok(Json(session))
}

/// Who the caller is and which role they hold
pub async fn me(Extension(user): Extension<AuthUser>) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: user.user_id,
        is_admin: user.is_admin(),
        email: user.email,
        role: user.role,
    })
}

/// Get the caller's profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>, AppError> {
    let service = ProfileService::new(state.db.clone());
    let profile = service.get_profile(user.user_id).await?;
    Ok(Json(profile))
}

/// Update the caller's profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<UpdateProfileInput>,
) -> Result<Json<UserProfile>, AppError> {
    let service = ProfileService::new(state.db.clone());
    let profile = service.update_profile(user.user_id, body).await?;
    Ok(Json(profile))
}

/// List every user profile (admin)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    user.require_admin()?;
    let service = ProfileService::new(state.db.clone());
    let profiles = service.list_profiles().await?;
    Ok(Json(profiles))
}

/// Change a user's role (admin)
pub async fn set_user_role(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<SetRoleInput>,
) -> Result<Json<UserProfile>, AppError> {
    user.require_admin()?;
    let service = ProfileService::new(state.db.clone());
    let profile = service.set_role(user.user_id, user_id, body.role).await?;
    Ok(Json(profile))
}
