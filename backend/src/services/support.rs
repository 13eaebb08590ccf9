//! Support ticket service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::models::TicketStatus;

/// Support service for user tickets and admin replies
#[derive(Clone)]
pub struct SupportService {
    db: PgPool,
}

/// Support ticket row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SupportTicket {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub message: String,
    pub category: String,
    pub status: String,
    pub admin_response: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SupportTicket {
    fn current_status(&self) -> AppResult<TicketStatus> {
        self.status.parse::<TicketStatus>().map_err(AppError::Internal)
    }
}

/// Input for opening a ticket
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicketInput {
    #[validate(length(min = 1, max = 200, message = "Subject must be 1-200 characters"))]
    pub subject: String,
    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub message: String,
    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: Option<String>,
}

/// Admin reply and/or status change
#[derive(Debug, Deserialize, Validate)]
pub struct RespondTicketInput {
    #[validate(length(min = 1, max = 5000, message = "Response must be 1-5000 characters"))]
    pub admin_response: Option<String>,
    pub status: Option<TicketStatus>,
}

/// Query parameters for the admin ticket list
#[derive(Debug, Default, Deserialize)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
}

const TICKET_COLUMNS: &str = "id, user_id, subject, message, category, status, admin_response, \
     resolved_at, created_at, updated_at";

/// How `resolved_at` changes when a ticket moves between statuses
#[derive(Debug, PartialEq, Eq)]
enum ResolvedStamp {
    Set,
    Clear,
    Keep,
}

fn resolved_stamp(from: TicketStatus, to: TicketStatus) -> ResolvedStamp {
    match to {
        _ if from == to => ResolvedStamp::Keep,
        TicketStatus::Resolved => ResolvedStamp::Set,
        TicketStatus::Open | TicketStatus::InProgress => ResolvedStamp::Clear,
        TicketStatus::Closed => ResolvedStamp::Keep,
    }
}

fn check_transition(from: TicketStatus, to: TicketStatus) -> AppResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(AppError::InvalidStateTransition(format!(
            "Cannot move a ticket from {} to {}",
            from, to
        )))
    }
}

impl SupportService {
    /// Create a new SupportService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Open a ticket
    pub async fn create_ticket(
        &self,
        user_id: Uuid,
        input: CreateTicketInput,
    ) -> AppResult<SupportTicket> {
        input.validate()?;
        let category = input.category.unwrap_or_else(|| "general".to_string());

        let ticket = sqlx::query_as::<_, SupportTicket>(&format!(
            r#"
            INSERT INTO support_tickets (user_id, subject, message, category, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            TICKET_COLUMNS
        ))
        .bind(user_id)
        .bind(input.subject.trim())
        .bind(input.message.trim())
        .bind(&category)
        .bind(TicketStatus::Open.as_str())
        .fetch_one(&self.db)
        .await?;

        tracing::info!("User {} opened support ticket {}", user_id, ticket.id);

        Ok(ticket)
    }

    /// Tickets opened by a user, newest first
    pub async fn get_user_tickets(&self, user_id: Uuid) -> AppResult<Vec<SupportTicket>> {
        let tickets = sqlx::query_as::<_, SupportTicket>(&format!(
            "SELECT {} FROM support_tickets WHERE user_id = $1 ORDER BY created_at DESC",
            TICKET_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(tickets)
    }

    /// Every ticket, optionally by status (admin)
    pub async fn get_all_tickets(&self, filter: TicketFilter) -> AppResult<Vec<SupportTicket>> {
        let tickets = sqlx::query_as::<_, SupportTicket>(&format!(
            r#"
            SELECT {} FROM support_tickets
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
            TICKET_COLUMNS
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.db)
        .await?;

        Ok(tickets)
    }

    /// Get a ticket; users only see their own, admins see all
    pub async fn get_ticket(
        &self,
        user_id: Uuid,
        is_admin: bool,
        ticket_id: Uuid,
    ) -> AppResult<SupportTicket> {
        let ticket = self.fetch_ticket(ticket_id).await?;
        if !is_admin && ticket.user_id != user_id {
            return Err(AppError::NotFound("Support ticket".to_string()));
        }
        Ok(ticket)
    }

    /// Reply to a ticket and/or move its status (admin)
    pub async fn respond_to_ticket(
        &self,
        admin_id: Uuid,
        ticket_id: Uuid,
        input: RespondTicketInput,
    ) -> AppResult<SupportTicket> {
        input.validate()?;
        let existing = self.fetch_ticket(ticket_id).await?;
        let from = existing.current_status()?;
        let to = input.status.unwrap_or(from);
        check_transition(from, to)?;

        let admin_response = input.admin_response.or(existing.admin_response);
        let ticket = self
            .write_status(ticket_id, from, to, admin_response.as_deref())
            .await?;

        tracing::info!(
            "Admin {} updated ticket {} ({} -> {})",
            admin_id,
            ticket_id,
            from,
            to
        );

        Ok(ticket)
    }

    /// Close one's own ticket
    pub async fn close_own_ticket(&self, user_id: Uuid, ticket_id: Uuid) -> AppResult<SupportTicket> {
        let existing = self.get_ticket(user_id, false, ticket_id).await?;
        let from = existing.current_status()?;
        check_transition(from, TicketStatus::Closed)?;

        self.write_status(
            ticket_id,
            from,
            TicketStatus::Closed,
            existing.admin_response.as_deref(),
        )
        .await
    }

    /// Delete a ticket (admin)
    pub async fn delete_ticket(&self, ticket_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM support_tickets WHERE id = $1")
            .bind(ticket_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Support ticket".to_string()));
        }

        tracing::info!("Deleted support ticket {}", ticket_id);

        Ok(())
    }

    async fn write_status(
        &self,
        ticket_id: Uuid,
        from: TicketStatus,
        to: TicketStatus,
        admin_response: Option<&str>,
    ) -> AppResult<SupportTicket> {
        let resolved_at_sql = match resolved_stamp(from, to) {
            ResolvedStamp::Set => "NOW()",
            ResolvedStamp::Clear => "NULL",
            ResolvedStamp::Keep => "resolved_at",
        };

        let ticket = sqlx::query_as::<_, SupportTicket>(&format!(
            r#"
            UPDATE support_tickets
            SET status = $1, admin_response = $2, resolved_at = {}, updated_at = NOW()
            WHERE id = $3
            RETURNING {}
            "#,
            resolved_at_sql, TICKET_COLUMNS
        ))
        .bind(to.as_str())
        .bind(admin_response)
        .bind(ticket_id)
        .fetch_one(&self.db)
        .await?;

        Ok(ticket)
    }

    async fn fetch_ticket(&self, ticket_id: Uuid) -> AppResult<SupportTicket> {
        sqlx::query_as::<_, SupportTicket>(&format!(
            "SELECT {} FROM support_tickets WHERE id = $1",
            TICKET_COLUMNS
        ))
        .bind(ticket_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Support ticket".to_string()))
    }
}
