//! Reporting handlers for the dashboard and data export

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::services::reporting::{DashboardMetrics, ExportEntity, ExportFormat, ReportingService};
use crate::AppState;

#[derive(Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

/// Get dashboard metrics
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<DashboardMetrics>> {
    let service = ReportingService::new(state.db.clone());
    let metrics = service.get_dashboard_metrics(user.user_id).await?;
    Ok(Json(metrics))
}

/// Download one record set as CSV or JSON
pub async fn export_records(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(entity): Path<String>,
    Query(query): Query<ExportQuery>,
) -> AppResult<impl IntoResponse> {
    let entity: ExportEntity = entity.parse()?;
    let service = ReportingService::new(state.db.clone());
    let file = service.export(user.user_id, entity, query.format).await?;

    let disposition = format!("attachment; filename=\"{}\"", file.filename);
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.body,
    ))
}
