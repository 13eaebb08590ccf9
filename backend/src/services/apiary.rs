//! Apiary management service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::hive::{Hive, HIVE_COLUMNS};

/// Apiary service for managing bee yards
#[derive(Clone)]
pub struct ApiaryService {
    db: PgPool,
}

/// Apiary information
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Apiary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Apiary with the number of hives it holds
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ApiarySummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub apiary: Apiary,
    pub hive_count: i64,
}

/// Input for creating an apiary
#[derive(Debug, Deserialize)]
pub struct CreateApiaryInput {
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub notes: Option<String>,
}

/// Input for updating an apiary
#[derive(Debug, Deserialize)]
pub struct UpdateApiaryInput {
    pub name: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub notes: Option<String>,
}

const APIARY_COLUMNS: &str =
    "id, user_id, name, location, latitude, longitude, notes, created_at, updated_at";

impl ApiaryService {
    /// Create a new ApiaryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all apiaries for a user with their hive counts
    pub async fn get_apiaries(&self, user_id: Uuid) -> AppResult<Vec<ApiarySummary>> {
        let apiaries = sqlx::query_as::<_, ApiarySummary>(
            r#"
            SELECT a.id, a.user_id, a.name, a.location, a.latitude, a.longitude,
                   a.notes, a.created_at, a.updated_at,
                   COUNT(h.id) AS hive_count
            FROM apiaries a
            LEFT JOIN hives h ON h.apiary_id = a.id
            WHERE a.user_id = $1
            GROUP BY a.id
            ORDER BY a.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(apiaries)
    }

    /// Get an apiary by ID
    pub async fn get_apiary(&self, user_id: Uuid, apiary_id: Uuid) -> AppResult<Apiary> {
        sqlx::query_as::<_, Apiary>(&format!(
            "SELECT {} FROM apiaries WHERE id = $1 AND user_id = $2",
            APIARY_COLUMNS
        ))
        .bind(apiary_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Apiary".to_string()))
    }

    /// Get the hives placed in an apiary
    pub async fn get_apiary_hives(&self, user_id: Uuid, apiary_id: Uuid) -> AppResult<Vec<Hive>> {
        // Ensure the apiary is the caller's
        self.get_apiary(user_id, apiary_id).await?;

        let hives = sqlx::query_as::<_, Hive>(&format!(
            "SELECT {} FROM hives WHERE apiary_id = $1 AND user_id = $2 ORDER BY name ASC",
            HIVE_COLUMNS
        ))
        .bind(apiary_id)
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(hives)
    }

    /// Create a new apiary
    pub async fn create_apiary(&self, user_id: Uuid, input: CreateApiaryInput) -> AppResult<Apiary> {
        shared::validate_required(&input.name).map_err(|m| AppError::field("name", m))?;
        shared::validate_coordinates(input.latitude, input.longitude)
            .map_err(|m| AppError::field("latitude", m))?;

        self.ensure_unique_name(user_id, &input.name, None).await?;

        let apiary = sqlx::query_as::<_, Apiary>(&format!(
            r#"
            INSERT INTO apiaries (user_id, name, location, latitude, longitude, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            APIARY_COLUMNS
        ))
        .bind(user_id)
        .bind(input.name.trim())
        .bind(&input.location)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Created apiary {} for user {}", apiary.id, user_id);

        Ok(apiary)
    }

    /// Update an apiary
    pub async fn update_apiary(
        &self,
        user_id: Uuid,
        apiary_id: Uuid,
        input: UpdateApiaryInput,
    ) -> AppResult<Apiary> {
        let existing = self.get_apiary(user_id, apiary_id).await?;

        if let Some(ref name) = input.name {
            shared::validate_required(name).map_err(|m| AppError::field("name", m))?;
            self.ensure_unique_name(user_id, name, Some(apiary_id)).await?;
        }

        let name = input.name.map(|n| n.trim().to_string()).unwrap_or(existing.name);
        let location = input.location.or(existing.location);
        let latitude = input.latitude.or(existing.latitude);
        let longitude = input.longitude.or(existing.longitude);
        let notes = input.notes.or(existing.notes);

        shared::validate_coordinates(latitude, longitude)
            .map_err(|m| AppError::field("latitude", m))?;

        let apiary = sqlx::query_as::<_, Apiary>(&format!(
            r#"
            UPDATE apiaries
            SET name = $1, location = $2, latitude = $3, longitude = $4, notes = $5,
                updated_at = NOW()
            WHERE id = $6 AND user_id = $7
            RETURNING {}
            "#,
            APIARY_COLUMNS
        ))
        .bind(&name)
        .bind(&location)
        .bind(latitude)
        .bind(longitude)
        .bind(&notes)
        .bind(apiary_id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(apiary)
    }

    /// Delete an apiary; its hives stay and become unassigned
    pub async fn delete_apiary(&self, user_id: Uuid, apiary_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM apiaries WHERE id = $1 AND user_id = $2")
            .bind(apiary_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Apiary".to_string()));
        }

        tracing::info!("Deleted apiary {} for user {}", apiary_id, user_id);

        Ok(())
    }

    async fn ensure_unique_name(
        &self,
        user_id: Uuid,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> AppResult<()> {
        let duplicate = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM apiaries
            WHERE user_id = $1 AND LOWER(name) = LOWER($2)
              AND ($3::uuid IS NULL OR id != $3)
            "#,
        )
        .bind(user_id)
        .bind(name.trim())
        .bind(exclude_id)
        .fetch_one(&self.db)
        .await?;

        if duplicate > 0 {
            return Err(AppError::Conflict {
                resource: "apiary".to_string(),
                message: "An apiary with this name already exists".to_string(),
            });
        }

        Ok(())
    }
}
