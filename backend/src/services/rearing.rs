//! Queen rearing batch service

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::ensure_owned;
use shared::models::{rearing_timeline, RearingCounts, RearingRates, RearingTimeline};

/// Rearing service for grafting rounds
#[derive(Clone)]
pub struct RearingService {
    db: PgPool,
}

/// Rearing batch row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RearingBatch {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mother_queen_id: Option<Uuid>,
    pub name: String,
    pub method: Option<String>,
    pub grafted_on: NaiveDate,
    pub cells_grafted: i32,
    pub cells_accepted: Option<i32>,
    pub cells_capped: Option<i32>,
    pub queens_emerged: Option<i32>,
    pub queens_mated: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RearingBatch {
    pub fn counts(&self) -> RearingCounts {
        RearingCounts {
            cells_grafted: self.cells_grafted,
            cells_accepted: self.cells_accepted,
            cells_capped: self.cells_capped,
            queens_emerged: self.queens_emerged,
            queens_mated: self.queens_mated,
        }
    }
}

/// Batch with stage success rates
#[derive(Debug, Clone, Serialize)]
pub struct RearingBatchRecord {
    #[serde(flatten)]
    pub batch: RearingBatch,
    #[serde(flatten)]
    pub rates: RearingRates,
}

impl From<RearingBatch> for RearingBatchRecord {
    fn from(batch: RearingBatch) -> Self {
        let rates = batch.counts().rates();
        Self { batch, rates }
    }
}

/// Key dates of a batch and the next one coming up
#[derive(Debug, Clone, Serialize)]
pub struct BatchTimeline {
    pub batch_id: Uuid,
    #[serde(flatten)]
    pub timeline: RearingTimeline,
    pub next_step: Option<NextStep>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NextStep {
    pub step: &'static str,
    pub due_on: NaiveDate,
}

/// Input for starting a batch
#[derive(Debug, Deserialize)]
pub struct CreateBatchInput {
    pub name: String,
    pub mother_queen_id: Option<Uuid>,
    pub method: Option<String>,
    pub grafted_on: NaiveDate,
    pub cells_grafted: i32,
    pub cells_accepted: Option<i32>,
    pub cells_capped: Option<i32>,
    pub queens_emerged: Option<i32>,
    pub queens_mated: Option<i32>,
    pub notes: Option<String>,
}

/// Input for updating a batch as it progresses
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBatchInput {
    pub name: Option<String>,
    pub mother_queen_id: Option<Uuid>,
    pub method: Option<String>,
    pub grafted_on: Option<NaiveDate>,
    pub cells_grafted: Option<i32>,
    pub cells_accepted: Option<i32>,
    pub cells_capped: Option<i32>,
    pub queens_emerged: Option<i32>,
    pub queens_mated: Option<i32>,
    pub notes: Option<String>,
}

const BATCH_COLUMNS: &str = "id, user_id, mother_queen_id, name, method, grafted_on, \
     cells_grafted, cells_accepted, cells_capped, queens_emerged, queens_mated, notes, \
     created_at, updated_at";

/// Reject graft dates whose calendar would run past the last representable date
fn check_graft_date(grafted_on: NaiveDate) -> AppResult<()> {
    rearing_timeline(grafted_on)
        .map(|_| ())
        .map_err(|e| AppError::field("grafted_on", e.to_string()))
}

fn check_counts(counts: &RearingCounts) -> AppResult<()> {
    counts
        .check_progression()
        .map_err(|m| AppError::field("cells_grafted", m))
}

/// Apply a partial update over a stored batch
fn merge_batch(existing: RearingBatch, input: UpdateBatchInput) -> RearingBatch {
    RearingBatch {
        name: input.name.map(|n| n.trim().to_string()).unwrap_or(existing.name),
        mother_queen_id: input.mother_queen_id.or(existing.mother_queen_id),
        method: input.method.or(existing.method),
        grafted_on: input.grafted_on.unwrap_or(existing.grafted_on),
        cells_grafted: input.cells_grafted.unwrap_or(existing.cells_grafted),
        cells_accepted: input.cells_accepted.or(existing.cells_accepted),
        cells_capped: input.cells_capped.or(existing.cells_capped),
        queens_emerged: input.queens_emerged.or(existing.queens_emerged),
        queens_mated: input.queens_mated.or(existing.queens_mated),
        notes: input.notes.or(existing.notes),
        ..existing
    }
}

impl RearingService {
    /// Create a new RearingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List batches, most recent graft first
    pub async fn get_batches(&self, user_id: Uuid) -> AppResult<Vec<RearingBatchRecord>> {
        let batches = sqlx::query_as::<_, RearingBatch>(&format!(
            "SELECT {} FROM rearing_batches WHERE user_id = $1 ORDER BY grafted_on DESC",
            BATCH_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(batches.into_iter().map(RearingBatchRecord::from).collect())
    }

    /// Get a batch by ID
    pub async fn get_batch(&self, user_id: Uuid, batch_id: Uuid) -> AppResult<RearingBatchRecord> {
        self.fetch_batch(user_id, batch_id).await.map(RearingBatchRecord::from)
    }

    /// Key dates for a batch as of `today`
    pub async fn get_timeline(
        &self,
        user_id: Uuid,
        batch_id: Uuid,
        today: NaiveDate,
    ) -> AppResult<BatchTimeline> {
        let batch = self.fetch_batch(user_id, batch_id).await?;
        build_timeline(batch.id, batch.grafted_on, today)
    }

    /// Start a batch
    pub async fn create_batch(
        &self,
        user_id: Uuid,
        input: CreateBatchInput,
    ) -> AppResult<RearingBatchRecord> {
        shared::validate_required(&input.name).map_err(|m| AppError::field("name", m))?;
        check_graft_date(input.grafted_on)?;
        check_counts(&RearingCounts {
            cells_grafted: input.cells_grafted,
            cells_accepted: input.cells_accepted,
            cells_capped: input.cells_capped,
            queens_emerged: input.queens_emerged,
            queens_mated: input.queens_mated,
        })?;
        if let Some(mother_id) = input.mother_queen_id {
            ensure_owned(&self.db, "queens", user_id, mother_id, "Mother queen").await?;
        }

        let batch = sqlx::query_as::<_, RearingBatch>(&format!(
            r#"
            INSERT INTO rearing_batches (user_id, mother_queen_id, name, method, grafted_on,
                                         cells_grafted, cells_accepted, cells_capped,
                                         queens_emerged, queens_mated, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            BATCH_COLUMNS
        ))
        .bind(user_id)
        .bind(input.mother_queen_id)
        .bind(input.name.trim())
        .bind(&input.method)
        .bind(input.grafted_on)
        .bind(input.cells_grafted)
        .bind(input.cells_accepted)
        .bind(input.cells_capped)
        .bind(input.queens_emerged)
        .bind(input.queens_mated)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            "Started rearing batch {} with {} cells for user {}",
            batch.id,
            batch.cells_grafted,
            user_id
        );

        Ok(batch.into())
    }

    /// Update a batch
    pub async fn update_batch(
        &self,
        user_id: Uuid,
        batch_id: Uuid,
        input: UpdateBatchInput,
    ) -> AppResult<RearingBatchRecord> {
        let existing = self.fetch_batch(user_id, batch_id).await?;

        if let Some(ref name) = input.name {
            shared::validate_required(name).map_err(|m| AppError::field("name", m))?;
        }
        if let Some(grafted_on) = input.grafted_on {
            check_graft_date(grafted_on)?;
        }
        if let Some(mother_id) = input.mother_queen_id {
            ensure_owned(&self.db, "queens", user_id, mother_id, "Mother queen").await?;
        }

        let merged = merge_batch(existing, input);
        check_counts(&merged.counts())?;

        let batch = sqlx::query_as::<_, RearingBatch>(&format!(
            r#"
            UPDATE rearing_batches
            SET mother_queen_id = $1, name = $2, method = $3, grafted_on = $4,
                cells_grafted = $5, cells_accepted = $6, cells_capped = $7,
                queens_emerged = $8, queens_mated = $9, notes = $10, updated_at = NOW()
            WHERE id = $11 AND user_id = $12
            RETURNING {}
            "#,
            BATCH_COLUMNS
        ))
        .bind(merged.mother_queen_id)
        .bind(&merged.name)
        .bind(&merged.method)
        .bind(merged.grafted_on)
        .bind(merged.cells_grafted)
        .bind(merged.cells_accepted)
        .bind(merged.cells_capped)
        .bind(merged.queens_emerged)
        .bind(merged.queens_mated)
        .bind(&merged.notes)
        .bind(batch_id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(batch.into())
    }

    /// Delete a batch
    pub async fn delete_batch(&self, user_id: Uuid, batch_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM rearing_batches WHERE id = $1 AND user_id = $2")
            .bind(batch_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Rearing batch".to_string()));
        }

        Ok(())
    }

    async fn fetch_batch(&self, user_id: Uuid, batch_id: Uuid) -> AppResult<RearingBatch> {
        sqlx::query_as::<_, RearingBatch>(&format!(
            "SELECT {} FROM rearing_batches WHERE id = $1 AND user_id = $2",
            BATCH_COLUMNS
        ))
        .bind(batch_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Rearing batch".to_string()))
    }
}

fn build_timeline(
    batch_id: Uuid,
    grafted_on: NaiveDate,
    today: NaiveDate,
) -> AppResult<BatchTimeline> {
    let timeline =
        rearing_timeline(grafted_on).map_err(|e| AppError::field("grafted_on", e.to_string()))?;
    let next_step = timeline
        .next_step(today)
        .map(|(step, due_on)| NextStep { step, due_on });
    Ok(BatchTimeline {
        batch_id,
        timeline,
        next_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn batch() -> RearingBatch {
        RearingBatch {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            mother_queen_id: None,
            name: "June graft".to_string(),
            method: Some("grafting".to_string()),
            grafted_on: date(2024, 6, 1),
            cells_grafted: 30,
            cells_accepted: Some(24),
            cells_capped: None,
            queens_emerged: None,
            queens_mated: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_merge_then_check_rejects_growing_stage() {
        let merged = merge_batch(
            batch(),
            UpdateBatchInput {
                cells_capped: Some(26),
                ..Default::default()
            },
        );
        assert_eq!(merged.cells_accepted, Some(24));
        assert!(check_counts(&merged.counts()).is_err());
    }

    #[test]
    fn test_merge_progresses_batch() {
        let merged = merge_batch(
            batch(),
            UpdateBatchInput {
                cells_capped: Some(22),
                queens_emerged: Some(20),
                ..Default::default()
            },
        );
        assert!(check_counts(&merged.counts()).is_ok());
        assert_eq!(merged.name, "June graft");
    }

    #[test]
    fn test_record_includes_rates() {
        let record = RearingBatchRecord::from(batch());
        assert_eq!(record.rates.acceptance_rate, Some(rust_decimal::Decimal::from(80)));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "June graft");
        assert!(!json["acceptance_rate"].is_null());
        assert!(json["mating_rate"].is_null());
    }

    #[test]
    fn test_timeline_next_step() {
        let id = Uuid::new_v4();
        let timeline = build_timeline(id, date(2024, 6, 1), date(2024, 6, 3)).unwrap();
        let next = timeline.next_step.unwrap();
        assert_eq!(next.due_on, date(2024, 6, 6));

        let done = build_timeline(id, date(2024, 6, 1), date(2024, 8, 1)).unwrap();
        assert!(done.next_step.is_none());
    }

    #[test]
    fn test_timeline_for_last_calendar_day_is_rejected() {
        let result = build_timeline(Uuid::new_v4(), NaiveDate::MAX, NaiveDate::MAX);
        assert!(matches!(
            result,
            Err(AppError::Validation { ref field, .. }) if field == "grafted_on"
        ));
    }

    #[test]
    fn test_graft_date_check() {
        assert!(check_graft_date(date(2024, 6, 1)).is_ok());
        assert!(check_graft_date(NaiveDate::MAX).is_err());
    }
}
