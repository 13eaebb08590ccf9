//! Hive inspection service

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::ensure_owned;
use shared::models::{inspection_averages, InspectionAverages, InspectionSample};
use shared::types::DateRange;

/// Inspection service for recording colony inspections
#[derive(Clone)]
pub struct InspectionService {
    db: PgPool,
}

/// Inspection row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Inspection {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hive_id: Uuid,
    pub inspected_on: NaiveDate,
    pub temperament: Option<i32>,
    pub brood_pattern: Option<i32>,
    pub frames_of_bees: Option<i32>,
    pub frames_of_brood: Option<i32>,
    pub honey_frames: Option<i32>,
    pub queen_seen: bool,
    pub eggs_seen: bool,
    pub queen_cells_seen: bool,
    pub weather: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Inspection> for InspectionSample {
    fn from(inspection: &Inspection) -> Self {
        InspectionSample {
            inspected_on: inspection.inspected_on,
            temperament: inspection.temperament,
            brood_pattern: inspection.brood_pattern,
            frames_of_bees: inspection.frames_of_bees,
            frames_of_brood: inspection.frames_of_brood,
            honey_frames: inspection.honey_frames,
            queen_seen: inspection.queen_seen,
        }
    }
}

/// Query parameters for listing and averaging inspections
#[derive(Debug, Default, Deserialize)]
pub struct InspectionFilter {
    pub hive_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl InspectionFilter {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }
}

/// Input for recording an inspection
#[derive(Debug, Deserialize)]
pub struct CreateInspectionInput {
    pub hive_id: Uuid,
    pub inspected_on: NaiveDate,
    pub temperament: Option<i32>,
    pub brood_pattern: Option<i32>,
    pub frames_of_bees: Option<i32>,
    pub frames_of_brood: Option<i32>,
    pub honey_frames: Option<i32>,
    #[serde(default)]
    pub queen_seen: bool,
    #[serde(default)]
    pub eggs_seen: bool,
    #[serde(default)]
    pub queen_cells_seen: bool,
    pub weather: Option<String>,
    pub notes: Option<String>,
}

/// Input for updating an inspection
#[derive(Debug, Default, Deserialize)]
pub struct UpdateInspectionInput {
    pub hive_id: Option<Uuid>,
    pub inspected_on: Option<NaiveDate>,
    pub temperament: Option<i32>,
    pub brood_pattern: Option<i32>,
    pub frames_of_bees: Option<i32>,
    pub frames_of_brood: Option<i32>,
    pub honey_frames: Option<i32>,
    pub queen_seen: Option<bool>,
    pub eggs_seen: Option<bool>,
    pub queen_cells_seen: Option<bool>,
    pub weather: Option<String>,
    pub notes: Option<String>,
}

const INSPECTION_COLUMNS: &str = "id, user_id, hive_id, inspected_on, temperament, brood_pattern, \
     frames_of_bees, frames_of_brood, honey_frames, queen_seen, eggs_seen, queen_cells_seen, \
     weather, notes, created_at, updated_at";

/// Range-check the ratings and frame counts of an inspection
fn validate_measurements(
    temperament: Option<i32>,
    brood_pattern: Option<i32>,
    frames_of_bees: Option<i32>,
    frames_of_brood: Option<i32>,
    honey_frames: Option<i32>,
) -> AppResult<()> {
    let ratings = [("temperament", temperament), ("brood_pattern", brood_pattern)];
    for (field, value) in ratings {
        if let Some(v) = value {
            shared::validate_rating(v).map_err(|m| AppError::field(field, m))?;
        }
    }

    let counts = [
        ("frames_of_bees", frames_of_bees),
        ("frames_of_brood", frames_of_brood),
        ("honey_frames", honey_frames),
    ];
    for (field, value) in counts {
        if let Some(v) = value {
            shared::validate_count(v).map_err(|m| AppError::field(field, m))?;
        }
    }

    Ok(())
}

impl InspectionService {
    /// Create a new InspectionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List inspections, newest first, by hive and inclusive date range
    pub async fn get_inspections(
        &self,
        user_id: Uuid,
        filter: &InspectionFilter,
    ) -> AppResult<Vec<Inspection>> {
        if !filter.range().is_valid() {
            return Err(AppError::field("end_date", "End date cannot be before start date"));
        }

        let inspections = sqlx::query_as::<_, Inspection>(&format!(
            r#"
            SELECT {} FROM inspections
            WHERE user_id = $1
              AND ($2::uuid IS NULL OR hive_id = $2)
              AND ($3::date IS NULL OR inspected_on >= $3)
              AND ($4::date IS NULL OR inspected_on <= $4)
            ORDER BY inspected_on DESC, created_at DESC
            "#,
            INSPECTION_COLUMNS
        ))
        .bind(user_id)
        .bind(filter.hive_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.db)
        .await?;

        Ok(inspections)
    }

    /// Inspections of a single hive
    pub async fn get_hive_inspections(
        &self,
        user_id: Uuid,
        hive_id: Uuid,
    ) -> AppResult<Vec<Inspection>> {
        ensure_owned(&self.db, "hives", user_id, hive_id, "Hive").await?;

        let filter = InspectionFilter {
            hive_id: Some(hive_id),
            ..Default::default()
        };
        self.get_inspections(user_id, &filter).await
    }

    /// Average the inspections matching a filter
    pub async fn get_averages(
        &self,
        user_id: Uuid,
        filter: &InspectionFilter,
    ) -> AppResult<InspectionAverages> {
        if let Some(hive_id) = filter.hive_id {
            ensure_owned(&self.db, "hives", user_id, hive_id, "Hive").await?;
        }

        let inspections = self.get_inspections(user_id, filter).await?;
        let samples: Vec<InspectionSample> = inspections.iter().map(InspectionSample::from).collect();

        Ok(inspection_averages(&samples, filter.range()))
    }

    /// Get an inspection by ID
    pub async fn get_inspection(&self, user_id: Uuid, inspection_id: Uuid) -> AppResult<Inspection> {
        sqlx::query_as::<_, Inspection>(&format!(
            "SELECT {} FROM inspections WHERE id = $1 AND user_id = $2",
            INSPECTION_COLUMNS
        ))
        .bind(inspection_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inspection".to_string()))
    }

    /// Record an inspection
    pub async fn create_inspection(
        &self,
        user_id: Uuid,
        input: CreateInspectionInput,
    ) -> AppResult<Inspection> {
        validate_measurements(
            input.temperament,
            input.brood_pattern,
            input.frames_of_bees,
            input.frames_of_brood,
            input.honey_frames,
        )?;
        ensure_owned(&self.db, "hives", user_id, input.hive_id, "Hive").await?;

        let inspection = sqlx::query_as::<_, Inspection>(&format!(
            r#"
            INSERT INTO inspections (user_id, hive_id, inspected_on, temperament, brood_pattern,
                                     frames_of_bees, frames_of_brood, honey_frames, queen_seen,
                                     eggs_seen, queen_cells_seen, weather, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            INSPECTION_COLUMNS
        ))
        .bind(user_id)
        .bind(input.hive_id)
        .bind(input.inspected_on)
        .bind(input.temperament)
        .bind(input.brood_pattern)
        .bind(input.frames_of_bees)
        .bind(input.frames_of_brood)
        .bind(input.honey_frames)
        .bind(input.queen_seen)
        .bind(input.eggs_seen)
        .bind(input.queen_cells_seen)
        .bind(&input.weather)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        tracing::debug!(
            "Recorded inspection {} on hive {}",
            inspection.id,
            inspection.hive_id
        );

        Ok(inspection)
    }

    /// Update an inspection
    pub async fn update_inspection(
        &self,
        user_id: Uuid,
        inspection_id: Uuid,
        input: UpdateInspectionInput,
    ) -> AppResult<Inspection> {
        let existing = self.get_inspection(user_id, inspection_id).await?;
        let merged = merge_inspection(existing, input);

        validate_measurements(
            merged.temperament,
            merged.brood_pattern,
            merged.frames_of_bees,
            merged.frames_of_brood,
            merged.honey_frames,
        )?;
        ensure_owned(&self.db, "hives", user_id, merged.hive_id, "Hive").await?;

        let inspection = sqlx::query_as::<_, Inspection>(&format!(
            r#"
            UPDATE inspections
            SET hive_id = $1, inspected_on = $2, temperament = $3, brood_pattern = $4,
                frames_of_bees = $5, frames_of_brood = $6, honey_frames = $7, queen_seen = $8,
                eggs_seen = $9, queen_cells_seen = $10, weather = $11, notes = $12,
                updated_at = NOW()
            WHERE id = $13 AND user_id = $14
            RETURNING {}
            "#,
            INSPECTION_COLUMNS
        ))
        .bind(merged.hive_id)
        .bind(merged.inspected_on)
        .bind(merged.temperament)
        .bind(merged.brood_pattern)
        .bind(merged.frames_of_bees)
        .bind(merged.frames_of_brood)
        .bind(merged.honey_frames)
        .bind(merged.queen_seen)
        .bind(merged.eggs_seen)
        .bind(merged.queen_cells_seen)
        .bind(&merged.weather)
        .bind(&merged.notes)
        .bind(inspection_id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(inspection)
    }

    /// Delete an inspection
    pub async fn delete_inspection(&self, user_id: Uuid, inspection_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM inspections WHERE id = $1 AND user_id = $2")
            .bind(inspection_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Inspection".to_string()));
        }

        Ok(())
    }
}

/// Apply a partial update over a stored inspection
fn merge_inspection(existing: Inspection, input: UpdateInspectionInput) -> Inspection {
    Inspection {
        hive_id: input.hive_id.unwrap_or(existing.hive_id),
        inspected_on: input.inspected_on.unwrap_or(existing.inspected_on),
        temperament: input.temperament.or(existing.temperament),
        brood_pattern: input.brood_pattern.or(existing.brood_pattern),
        frames_of_bees: input.frames_of_bees.or(existing.frames_of_bees),
        frames_of_brood: input.frames_of_brood.or(existing.frames_of_brood),
        honey_frames: input.honey_frames.or(existing.honey_frames),
        queen_seen: input.queen_seen.unwrap_or(existing.queen_seen),
        eggs_seen: input.eggs_seen.unwrap_or(existing.eggs_seen),
        queen_cells_seen: input.queen_cells_seen.unwrap_or(existing.queen_cells_seen),
        weather: input.weather.or(existing.weather),
        notes: input.notes.or(existing.notes),
        ..existing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> Inspection {
        Inspection {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            hive_id: Uuid::new_v4(),
            inspected_on: NaiveDate::from_ymd_opt(2024, 5, 12).unwrap(),
            temperament: Some(4),
            brood_pattern: Some(3),
            frames_of_bees: Some(8),
            frames_of_brood: Some(5),
            honey_frames: None,
            queen_seen: true,
            eggs_seen: true,
            queen_cells_seen: false,
            weather: Some("sunny".to_string()),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let existing = stored();
        let id = existing.id;
        let merged = merge_inspection(
            existing,
            UpdateInspectionInput {
                brood_pattern: Some(5),
                queen_seen: Some(false),
                ..Default::default()
            },
        );

        assert_eq!(merged.id, id);
        assert_eq!(merged.temperament, Some(4));
        assert_eq!(merged.brood_pattern, Some(5));
        assert!(!merged.queen_seen);
        assert!(merged.eggs_seen);
        assert_eq!(merged.weather.as_deref(), Some("sunny"));
    }

    #[test]
    fn test_validate_measurements() {
        assert!(validate_measurements(Some(1), Some(5), Some(0), None, None).is_ok());
        assert!(matches!(
            validate_measurements(Some(6), None, None, None, None),
            Err(AppError::Validation { ref field, .. }) if field == "temperament"
        ));
        assert!(matches!(
            validate_measurements(None, None, None, None, Some(-1)),
            Err(AppError::Validation { ref field, .. }) if field == "honey_frames"
        ));
    }

    #[test]
    fn test_sample_conversion() {
        let inspection = stored();
        let sample = InspectionSample::from(&inspection);
        assert_eq!(sample.inspected_on, inspection.inspected_on);
        assert_eq!(sample.frames_of_bees, Some(8));
        assert!(sample.queen_seen);
    }
}
