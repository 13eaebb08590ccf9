//! Dropdown lookup list handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::services::dropdown::{
    CategoryWithValues, CreateCategoryInput, CreateValueInput, DropdownCategory, DropdownQuery,
    DropdownService, DropdownValue, UpdateCategoryInput, UpdateValueInput,
};
use crate::AppState;

/// All categories with their values
///
/// Inactive values are only listed for admins who ask for them.
pub async fn list_dropdowns(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<DropdownQuery>,
) -> AppResult<Json<Vec<CategoryWithValues>>> {
    let service = DropdownService::new(state.db.clone());
    let include_inactive = query.include_inactive && user.is_admin();
    let categories = service.get_categories(include_inactive).await?;
    Ok(Json(categories))
}

/// One category by key
pub async fn get_dropdown(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(key): Path<String>,
    Query(query): Query<DropdownQuery>,
) -> AppResult<Json<CategoryWithValues>> {
    let service = DropdownService::new(state.db.clone());
    let include_inactive = query.include_inactive && user.is_admin();
    let category = service.get_category(&key, include_inactive).await?;
    Ok(Json(category))
}

// Admin-only management

pub async fn create_dropdown_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<CreateCategoryInput>,
) -> AppResult<(StatusCode, Json<DropdownCategory>)> {
    user.require_admin()?;
    let service = DropdownService::new(state.db.clone());
    let category = service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_dropdown_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(category_id): Path<Uuid>,
    Json(input): Json<UpdateCategoryInput>,
) -> AppResult<Json<DropdownCategory>> {
    user.require_admin()?;
    let service = DropdownService::new(state.db.clone());
    let category = service.update_category(category_id, input).await?;
    Ok(Json(category))
}

pub async fn delete_dropdown_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(category_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require_admin()?;
    let service = DropdownService::new(state.db.clone());
    service.delete_category(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_dropdown_value(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(category_id): Path<Uuid>,
    Json(input): Json<CreateValueInput>,
) -> AppResult<(StatusCode, Json<DropdownValue>)> {
    user.require_admin()?;
    let service = DropdownService::new(state.db.clone());
    let value = service.create_value(category_id, input).await?;
    Ok((StatusCode::CREATED, Json(value)))
}

pub async fn update_dropdown_value(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(value_id): Path<Uuid>,
    Json(input): Json<UpdateValueInput>,
) -> AppResult<Json<DropdownValue>> {
    user.require_admin()?;
    let service = DropdownService::new(state.db.clone());
    let value = service.update_value(value_id, input).await?;
    Ok(Json(value))
}

pub async fn delete_dropdown_value(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(value_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require_admin()?;
    let service = DropdownService::new(state.db.clone());
    service.delete_value(value_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
