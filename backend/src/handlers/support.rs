//! Support ticket HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::services::support::{
    CreateTicketInput, RespondTicketInput, SupportService, SupportTicket, TicketFilter,
};
use crate::AppState;

/// Open a ticket
pub async fn create_ticket(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<CreateTicketInput>,
) -> AppResult<(StatusCode, Json<SupportTicket>)> {
    let service = SupportService::new(state.db.clone());
    let ticket = service.create_ticket(user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// The caller's own tickets
pub async fn list_my_tickets(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<SupportTicket>>> {
    let service = SupportService::new(state.db.clone());
    let tickets = service.get_user_tickets(user.user_id).await?;
    Ok(Json(tickets))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(ticket_id): Path<Uuid>,
) -> AppResult<Json<SupportTicket>> {
    let service = SupportService::new(state.db.clone());
    let ticket = service
        .get_ticket(user.user_id, user.is_admin(), ticket_id)
        .await?;
    Ok(Json(ticket))
}

/// Close one's own ticket
pub async fn close_ticket(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(ticket_id): Path<Uuid>,
) -> AppResult<Json<SupportTicket>> {
    let service = SupportService::new(state.db.clone());
    let ticket = service.close_own_ticket(user.user_id, ticket_id).await?;
    Ok(Json(ticket))
}

/// Every ticket, optionally by status (admin)
pub async fn list_all_tickets(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<TicketFilter>,
) -> AppResult<Json<Vec<SupportTicket>>> {
    user.require_admin()?;
    let service = SupportService::new(state.db.clone());
    let tickets = service.get_all_tickets(filter).await?;
    Ok(Json(tickets))
}

/// Reply to a ticket or move its status (admin)
pub async fn respond_to_ticket(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(ticket_id): Path<Uuid>,
    Json(input): Json<RespondTicketInput>,
) -> AppResult<Json<SupportTicket>> {
    user.require_admin()?;
    let service = SupportService::new(state.db.clone());
    let ticket = service
        .respond_to_ticket(user.user_id, ticket_id, input)
        .await?;
    Ok(Json(ticket))
}

/// Delete a ticket (admin)
pub async fn delete_ticket(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(ticket_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require_admin()?;
    let service = SupportService::new(state.db.clone());
    service.delete_ticket(ticket_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
