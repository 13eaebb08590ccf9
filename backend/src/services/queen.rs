//! Queen tracking service

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::ensure_owned;
use shared::models::{QueenProfile, QueenStatus};

/// Queen service for tracking queens and their lineage
#[derive(Clone)]
pub struct QueenService {
    db: PgPool,
}

/// Queen row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Queen {
    pub id: Uuid,
    pub user_id: Uuid,
    pub label: String,
    pub breed: Option<String>,
    pub birth_year: i32,
    pub mother_queen_id: Option<Uuid>,
    pub source: Option<String>,
    pub is_marked: bool,
    pub is_clipped: bool,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Queen with her age, marking colour and replacement flag
#[derive(Debug, Clone, Serialize)]
pub struct QueenWithProfile {
    #[serde(flatten)]
    pub queen: Queen,
    #[serde(flatten)]
    pub profile: QueenProfile,
}

impl QueenWithProfile {
    pub fn new(queen: Queen, reference_year: i32) -> Self {
        let profile = QueenProfile::describe(queen.birth_year, reference_year);
        Self { queen, profile }
    }
}

/// Input for registering a queen
#[derive(Debug, Deserialize)]
pub struct CreateQueenInput {
    pub label: String,
    pub breed: Option<String>,
    pub birth_year: i32,
    pub mother_queen_id: Option<Uuid>,
    pub source: Option<String>,
    #[serde(default)]
    pub is_marked: bool,
    #[serde(default)]
    pub is_clipped: bool,
    pub status: Option<QueenStatus>,
    pub notes: Option<String>,
}

/// Input for updating a queen
#[derive(Debug, Deserialize)]
pub struct UpdateQueenInput {
    pub label: Option<String>,
    pub breed: Option<String>,
    pub birth_year: Option<i32>,
    pub mother_queen_id: Option<Uuid>,
    pub source: Option<String>,
    pub is_marked: Option<bool>,
    pub is_clipped: Option<bool>,
    pub status: Option<QueenStatus>,
    pub notes: Option<String>,
}

const QUEEN_COLUMNS: &str = "id, user_id, label, breed, birth_year, mother_queen_id, source, \
     is_marked, is_clipped, status, notes, created_at, updated_at";

fn current_year() -> i32 {
    Utc::now().year()
}

impl QueenService {
    /// Create a new QueenService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all queens for a user, newest first
    pub async fn get_queens(&self, user_id: Uuid) -> AppResult<Vec<QueenWithProfile>> {
        let queens = sqlx::query_as::<_, Queen>(&format!(
            "SELECT {} FROM queens WHERE user_id = $1 ORDER BY birth_year DESC, label ASC",
            QUEEN_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        let year = current_year();
        Ok(queens
            .into_iter()
            .map(|q| QueenWithProfile::new(q, year))
            .collect())
    }

    /// Get a queen by ID
    pub async fn get_queen(&self, user_id: Uuid, queen_id: Uuid) -> AppResult<QueenWithProfile> {
        let queen = self.fetch_queen(user_id, queen_id).await?;
        Ok(QueenWithProfile::new(queen, current_year()))
    }

    /// Register a queen
    pub async fn create_queen(
        &self,
        user_id: Uuid,
        input: CreateQueenInput,
    ) -> AppResult<QueenWithProfile> {
        let year = current_year();
        shared::validate_required(&input.label).map_err(|m| AppError::field("label", m))?;
        shared::validate_birth_year(input.birth_year, year)
            .map_err(|m| AppError::field("birth_year", m))?;
        if let Some(mother_id) = input.mother_queen_id {
            ensure_owned(&self.db, "queens", user_id, mother_id, "Mother queen").await?;
        }

        let status = input.status.unwrap_or_default();

        let queen = sqlx::query_as::<_, Queen>(&format!(
            r#"
            INSERT INTO queens (user_id, label, breed, birth_year, mother_queen_id, source,
                                is_marked, is_clipped, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            QUEEN_COLUMNS
        ))
        .bind(user_id)
        .bind(input.label.trim())
        .bind(&input.breed)
        .bind(input.birth_year)
        .bind(input.mother_queen_id)
        .bind(&input.source)
        .bind(input.is_marked)
        .bind(input.is_clipped)
        .bind(status.as_str())
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Registered queen {} for user {}", queen.id, user_id);

        Ok(QueenWithProfile::new(queen, year))
    }

    /// Update a queen
    pub async fn update_queen(
        &self,
        user_id: Uuid,
        queen_id: Uuid,
        input: UpdateQueenInput,
    ) -> AppResult<QueenWithProfile> {
        let existing = self.fetch_queen(user_id, queen_id).await?;
        let year = current_year();

        if let Some(ref label) = input.label {
            shared::validate_required(label).map_err(|m| AppError::field("label", m))?;
        }
        if let Some(birth_year) = input.birth_year {
            shared::validate_birth_year(birth_year, year)
                .map_err(|m| AppError::field("birth_year", m))?;
        }
        if let Some(mother_id) = input.mother_queen_id {
            if mother_id == queen_id {
                return Err(AppError::field(
                    "mother_queen_id",
                    "A queen cannot be her own mother",
                ));
            }
            ensure_owned(&self.db, "queens", user_id, mother_id, "Mother queen").await?;
        }

        let label = input.label.map(|l| l.trim().to_string()).unwrap_or(existing.label);
        let breed = input.breed.or(existing.breed);
        let birth_year = input.birth_year.unwrap_or(existing.birth_year);
        let mother_queen_id = input.mother_queen_id.or(existing.mother_queen_id);
        let source = input.source.or(existing.source);
        let is_marked = input.is_marked.unwrap_or(existing.is_marked);
        let is_clipped = input.is_clipped.unwrap_or(existing.is_clipped);
        let status = input
            .status
            .map(|s| s.as_str().to_string())
            .unwrap_or(existing.status);
        let notes = input.notes.or(existing.notes);

        let queen = sqlx::query_as::<_, Queen>(&format!(
            r#"
            UPDATE queens
            SET label = $1, breed = $2, birth_year = $3, mother_queen_id = $4, source = $5,
                is_marked = $6, is_clipped = $7, status = $8, notes = $9, updated_at = NOW()
            WHERE id = $10 AND user_id = $11
            RETURNING {}
            "#,
            QUEEN_COLUMNS
        ))
        .bind(&label)
        .bind(&breed)
        .bind(birth_year)
        .bind(mother_queen_id)
        .bind(&source)
        .bind(is_marked)
        .bind(is_clipped)
        .bind(&status)
        .bind(&notes)
        .bind(queen_id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(QueenWithProfile::new(queen, year))
    }

    /// Delete a queen; hives she headed become queenless
    pub async fn delete_queen(&self, user_id: Uuid, queen_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM queens WHERE id = $1 AND user_id = $2")
            .bind(queen_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Queen".to_string()));
        }

        tracing::info!("Deleted queen {} for user {}", queen_id, user_id);

        Ok(())
    }

    /// Daughters recorded with this queen as their mother
    pub async fn get_daughters(
        &self,
        user_id: Uuid,
        queen_id: Uuid,
    ) -> AppResult<Vec<QueenWithProfile>> {
        self.fetch_queen(user_id, queen_id).await?;

        let daughters = sqlx::query_as::<_, Queen>(&format!(
            r#"
            SELECT {} FROM queens
            WHERE user_id = $1 AND mother_queen_id = $2
            ORDER BY birth_year DESC, label ASC
            "#,
            QUEEN_COLUMNS
        ))
        .bind(user_id)
        .bind(queen_id)
        .fetch_all(&self.db)
        .await?;

        let year = current_year();
        Ok(daughters
            .into_iter()
            .map(|q| QueenWithProfile::new(q, year))
            .collect())
    }

    async fn fetch_queen(&self, user_id: Uuid, queen_id: Uuid) -> AppResult<Queen> {
        sqlx::query_as::<_, Queen>(&format!(
            "SELECT {} FROM queens WHERE id = $1 AND user_id = $2",
            QUEEN_COLUMNS
        ))
        .bind(queen_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Queen".to_string()))
    }
}
