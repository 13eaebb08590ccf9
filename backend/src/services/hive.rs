//! Hive management service

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::ensure_owned;
use shared::models::HiveStatus;

/// Hive service for managing colonies
#[derive(Clone)]
pub struct HiveService {
    db: PgPool,
}

/// Hive information
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Hive {
    pub id: Uuid,
    pub user_id: Uuid,
    pub apiary_id: Option<Uuid>,
    pub queen_id: Option<Uuid>,
    pub name: String,
    pub hive_type: Option<String>,
    pub status: String,
    pub installed_on: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query parameters for listing hives
#[derive(Debug, Default, Deserialize)]
pub struct HiveFilter {
    pub apiary_id: Option<Uuid>,
    pub status: Option<HiveStatus>,
}

/// Input for creating a hive
#[derive(Debug, Deserialize)]
pub struct CreateHiveInput {
    pub name: String,
    pub apiary_id: Option<Uuid>,
    pub queen_id: Option<Uuid>,
    pub hive_type: Option<String>,
    pub status: Option<HiveStatus>,
    pub installed_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Input for updating a hive
#[derive(Debug, Deserialize)]
pub struct UpdateHiveInput {
    pub name: Option<String>,
    pub apiary_id: Option<Uuid>,
    pub queen_id: Option<Uuid>,
    pub hive_type: Option<String>,
    pub status: Option<HiveStatus>,
    pub installed_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

pub(crate) const HIVE_COLUMNS: &str = "id, user_id, apiary_id, queen_id, name, hive_type, status, \
     installed_on, notes, created_at, updated_at";

impl HiveService {
    /// Create a new HiveService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List hives, optionally limited to one apiary or status
    pub async fn get_hives(&self, user_id: Uuid, filter: HiveFilter) -> AppResult<Vec<Hive>> {
        let hives = sqlx::query_as::<_, Hive>(&format!(
            r#"
            SELECT {} FROM hives
            WHERE user_id = $1
              AND ($2::uuid IS NULL OR apiary_id = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY name ASC
            "#,
            HIVE_COLUMNS
        ))
        .bind(user_id)
        .bind(filter.apiary_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.db)
        .await?;

        Ok(hives)
    }

    /// Get a hive by ID
    pub async fn get_hive(&self, user_id: Uuid, hive_id: Uuid) -> AppResult<Hive> {
        sqlx::query_as::<_, Hive>(&format!(
            "SELECT {} FROM hives WHERE id = $1 AND user_id = $2",
            HIVE_COLUMNS
        ))
        .bind(hive_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Hive".to_string()))
    }

    /// Create a new hive
    pub async fn create_hive(&self, user_id: Uuid, input: CreateHiveInput) -> AppResult<Hive> {
        shared::validate_required(&input.name).map_err(|m| AppError::field("name", m))?;
        self.check_references(user_id, None, input.apiary_id, input.queen_id)
            .await?;

        let status = input.status.unwrap_or_default();

        let hive = sqlx::query_as::<_, Hive>(&format!(
            r#"
            INSERT INTO hives (user_id, apiary_id, queen_id, name, hive_type, status, installed_on, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            HIVE_COLUMNS
        ))
        .bind(user_id)
        .bind(input.apiary_id)
        .bind(input.queen_id)
        .bind(input.name.trim())
        .bind(&input.hive_type)
        .bind(status.as_str())
        .bind(input.installed_on)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Created hive {} for user {}", hive.id, user_id);

        Ok(hive)
    }

    /// Update a hive
    pub async fn update_hive(
        &self,
        user_id: Uuid,
        hive_id: Uuid,
        input: UpdateHiveInput,
    ) -> AppResult<Hive> {
        let existing = self.get_hive(user_id, hive_id).await?;

        if let Some(ref name) = input.name {
            shared::validate_required(name).map_err(|m| AppError::field("name", m))?;
        }
        self.check_references(user_id, Some(hive_id), input.apiary_id, input.queen_id)
            .await?;

        let name = input.name.map(|n| n.trim().to_string()).unwrap_or(existing.name);
        let apiary_id = input.apiary_id.or(existing.apiary_id);
        let queen_id = input.queen_id.or(existing.queen_id);
        let hive_type = input.hive_type.or(existing.hive_type);
        let status = input
            .status
            .map(|s| s.as_str().to_string())
            .unwrap_or(existing.status);
        let installed_on = input.installed_on.or(existing.installed_on);
        let notes = input.notes.or(existing.notes);
        let replaced_queen = existing.queen_id.filter(|previous| queen_id != Some(*previous));

        let mut tx = self.db.begin().await?;

        let hive = sqlx::query_as::<_, Hive>(&format!(
            r#"
            UPDATE hives
            SET name = $1, apiary_id = $2, queen_id = $3, hive_type = $4, status = $5,
                installed_on = $6, notes = $7, updated_at = NOW()
            WHERE id = $8 AND user_id = $9
            RETURNING {}
            "#,
            HIVE_COLUMNS
        ))
        .bind(&name)
        .bind(apiary_id)
        .bind(queen_id)
        .bind(&hive_type)
        .bind(&status)
        .bind(installed_on)
        .bind(&notes)
        .bind(hive_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        // Requeening retires the queen that headed the hive
        if let Some(previous) = replaced_queen {
            sqlx::query(
                r#"
                UPDATE queens SET status = 'superseded', updated_at = NOW()
                WHERE id = $1 AND user_id = $2 AND status = 'active'
                "#,
            )
            .bind(previous)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

            tracing::info!("Queen {} superseded in hive {}", previous, hive_id);
        }

        tx.commit().await?;

        Ok(hive)
    }

    /// Delete a hive together with its inspections, feedings and varroa records
    pub async fn delete_hive(&self, user_id: Uuid, hive_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM hives WHERE id = $1 AND user_id = $2")
            .bind(hive_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Hive".to_string()));
        }

        tracing::info!("Deleted hive {} for user {}", hive_id, user_id);

        Ok(())
    }

    /// Verify the apiary and queen belong to the caller and the queen is free
    async fn check_references(
        &self,
        user_id: Uuid,
        hive_id: Option<Uuid>,
        apiary_id: Option<Uuid>,
        queen_id: Option<Uuid>,
    ) -> AppResult<()> {
        if let Some(apiary_id) = apiary_id {
            ensure_owned(&self.db, "apiaries", user_id, apiary_id, "Apiary").await?;
        }

        if let Some(queen_id) = queen_id {
            ensure_owned(&self.db, "queens", user_id, queen_id, "Queen").await?;

            let heading = sqlx::query_scalar::<_, Uuid>(
                "SELECT id FROM hives WHERE queen_id = $1 AND ($2::uuid IS NULL OR id != $2)",
            )
            .bind(queen_id)
            .bind(hive_id)
            .fetch_optional(&self.db)
            .await?;

            if heading.is_some() {
                return Err(AppError::Conflict {
                    resource: "queen_id".to_string(),
                    message: "This queen already heads another hive".to_string(),
                });
            }
        }

        Ok(())
    }
}
