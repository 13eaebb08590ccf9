//! Feeding records service

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::ensure_owned;
use shared::models::FeedUnit;

/// Feeding service
#[derive(Clone)]
pub struct FeedingService {
    db: PgPool,
}

/// Feeding row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Feeding {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hive_id: Uuid,
    pub fed_on: NaiveDate,
    pub feed_type: String,
    pub amount: Decimal,
    pub unit: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedingFilter {
    pub hive_id: Option<Uuid>,
}

/// Input for recording a feeding
#[derive(Debug, Deserialize)]
pub struct CreateFeedingInput {
    pub hive_id: Uuid,
    pub fed_on: NaiveDate,
    pub feed_type: String,
    pub amount: Decimal,
    pub unit: Option<FeedUnit>,
    pub notes: Option<String>,
}

/// Input for updating a feeding
#[derive(Debug, Deserialize)]
pub struct UpdateFeedingInput {
    pub hive_id: Option<Uuid>,
    pub fed_on: Option<NaiveDate>,
    pub feed_type: Option<String>,
    pub amount: Option<Decimal>,
    pub unit: Option<FeedUnit>,
    pub notes: Option<String>,
}

const FEEDING_COLUMNS: &str =
    "id, user_id, hive_id, fed_on, feed_type, amount, unit, notes, created_at, updated_at";

impl FeedingService {
    /// Create a new FeedingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List feedings, newest first
    pub async fn get_feedings(&self, user_id: Uuid, filter: FeedingFilter) -> AppResult<Vec<Feeding>> {
        let feedings = sqlx::query_as::<_, Feeding>(&format!(
            r#"
            SELECT {} FROM feedings
            WHERE user_id = $1 AND ($2::uuid IS NULL OR hive_id = $2)
            ORDER BY fed_on DESC, created_at DESC
            "#,
            FEEDING_COLUMNS
        ))
        .bind(user_id)
        .bind(filter.hive_id)
        .fetch_all(&self.db)
        .await?;

        Ok(feedings)
    }

    /// Get a feeding by ID
    pub async fn get_feeding(&self, user_id: Uuid, feeding_id: Uuid) -> AppResult<Feeding> {
        sqlx::query_as::<_, Feeding>(&format!(
            "SELECT {} FROM feedings WHERE id = $1 AND user_id = $2",
            FEEDING_COLUMNS
        ))
        .bind(feeding_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Feeding".to_string()))
    }

    /// Record a feeding
    pub async fn create_feeding(&self, user_id: Uuid, input: CreateFeedingInput) -> AppResult<Feeding> {
        shared::validate_required(&input.feed_type).map_err(|m| AppError::field("feed_type", m))?;
        shared::validate_quantity(input.amount).map_err(|m| AppError::field("amount", m))?;
        ensure_owned(&self.db, "hives", user_id, input.hive_id, "Hive").await?;

        let unit = input.unit.unwrap_or_default();

        let feeding = sqlx::query_as::<_, Feeding>(&format!(
            r#"
            INSERT INTO feedings (user_id, hive_id, fed_on, feed_type, amount, unit, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            FEEDING_COLUMNS
        ))
        .bind(user_id)
        .bind(input.hive_id)
        .bind(input.fed_on)
        .bind(input.feed_type.trim())
        .bind(input.amount)
        .bind(unit.as_str())
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        tracing::debug!("Recorded feeding {} on hive {}", feeding.id, feeding.hive_id);

        Ok(feeding)
    }

    /// Update a feeding
    pub async fn update_feeding(
        &self,
        user_id: Uuid,
        feeding_id: Uuid,
        input: UpdateFeedingInput,
    ) -> AppResult<Feeding> {
        let existing = self.get_feeding(user_id, feeding_id).await?;

        if let Some(ref feed_type) = input.feed_type {
            shared::validate_required(feed_type).map_err(|m| AppError::field("feed_type", m))?;
        }
        if let Some(amount) = input.amount {
            shared::validate_quantity(amount).map_err(|m| AppError::field("amount", m))?;
        }
        if let Some(hive_id) = input.hive_id {
            ensure_owned(&self.db, "hives", user_id, hive_id, "Hive").await?;
        }

        let hive_id = input.hive_id.unwrap_or(existing.hive_id);
        let fed_on = input.fed_on.unwrap_or(existing.fed_on);
        let feed_type = input
            .feed_type
            .map(|f| f.trim().to_string())
            .unwrap_or(existing.feed_type);
        let amount = input.amount.unwrap_or(existing.amount);
        let unit = input
            .unit
            .map(|u| u.as_str().to_string())
            .unwrap_or(existing.unit);
        let notes = input.notes.or(existing.notes);

        let feeding = sqlx::query_as::<_, Feeding>(&format!(
            r#"
            UPDATE feedings
            SET hive_id = $1, fed_on = $2, feed_type = $3, amount = $4, unit = $5, notes = $6,
                updated_at = NOW()
            WHERE id = $7 AND user_id = $8
            RETURNING {}
            "#,
            FEEDING_COLUMNS
        ))
        .bind(hive_id)
        .bind(fed_on)
        .bind(&feed_type)
        .bind(amount)
        .bind(&unit)
        .bind(&notes)
        .bind(feeding_id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(feeding)
    }

    /// Delete a feeding
    pub async fn delete_feeding(&self, user_id: Uuid, feeding_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM feedings WHERE id = $1 AND user_id = $2")
            .bind(feeding_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Feeding".to_string()));
        }

        Ok(())
    }
}
