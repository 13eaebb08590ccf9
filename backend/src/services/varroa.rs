//! Varroa monitoring and treatment service

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::ensure_owned;
use shared::models::{
    assess_varroa_check, is_treatment_active, treatment_duration_days, VarroaAssessment,
    VarroaMethod,
};

/// Varroa service for mite counts and treatments
#[derive(Clone)]
pub struct VarroaService {
    db: PgPool,
}

/// Mite count row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct VarroaCheck {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hive_id: Uuid,
    pub checked_on: NaiveDate,
    pub method: String,
    pub mite_count: i32,
    pub sample_size: Option<i32>,
    pub days: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mite count with its infestation assessment
#[derive(Debug, Clone, Serialize)]
pub struct VarroaCheckRecord {
    #[serde(flatten)]
    pub check: VarroaCheck,
    pub assessment: Option<VarroaAssessment>,
}

impl From<VarroaCheck> for VarroaCheckRecord {
    fn from(check: VarroaCheck) -> Self {
        let assessment = check
            .method
            .parse::<VarroaMethod>()
            .ok()
            .and_then(|method| {
                assess_varroa_check(method, check.mite_count, check.sample_size, check.days).ok()
            });
        Self { check, assessment }
    }
}

/// Treatment row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct VarroaTreatment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hive_id: Uuid,
    pub product: String,
    pub active_ingredient: Option<String>,
    pub dosage: Option<String>,
    pub started_on: NaiveDate,
    pub ended_on: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Treatment with its duration so far and whether it is still in place
#[derive(Debug, Clone, Serialize)]
pub struct VarroaTreatmentRecord {
    #[serde(flatten)]
    pub treatment: VarroaTreatment,
    pub duration_days: i64,
    pub active: bool,
}

impl VarroaTreatmentRecord {
    pub fn new(treatment: VarroaTreatment, today: NaiveDate) -> Self {
        let duration_days = treatment_duration_days(treatment.started_on, treatment.ended_on, today);
        let active = is_treatment_active(treatment.started_on, treatment.ended_on, today);
        Self {
            treatment,
            duration_days,
            active,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VarroaFilter {
    pub hive_id: Option<Uuid>,
}

/// Input for recording a mite count
#[derive(Debug, Deserialize)]
pub struct CreateVarroaCheckInput {
    pub hive_id: Uuid,
    pub checked_on: NaiveDate,
    pub method: VarroaMethod,
    pub mite_count: i32,
    pub sample_size: Option<i32>,
    pub days: Option<i32>,
    pub notes: Option<String>,
}

/// Input for updating a mite count
#[derive(Debug, Deserialize)]
pub struct UpdateVarroaCheckInput {
    pub hive_id: Option<Uuid>,
    pub checked_on: Option<NaiveDate>,
    pub method: Option<VarroaMethod>,
    pub mite_count: Option<i32>,
    pub sample_size: Option<i32>,
    pub days: Option<i32>,
    pub notes: Option<String>,
}

/// Input for recording a treatment
#[derive(Debug, Deserialize)]
pub struct CreateTreatmentInput {
    pub hive_id: Uuid,
    pub product: String,
    pub active_ingredient: Option<String>,
    pub dosage: Option<String>,
    pub started_on: NaiveDate,
    pub ended_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Input for updating a treatment
#[derive(Debug, Deserialize)]
pub struct UpdateTreatmentInput {
    pub hive_id: Option<Uuid>,
    pub product: Option<String>,
    pub active_ingredient: Option<String>,
    pub dosage: Option<String>,
    pub started_on: Option<NaiveDate>,
    pub ended_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

const CHECK_COLUMNS: &str = "id, user_id, hive_id, checked_on, method, mite_count, sample_size, \
     days, notes, created_at, updated_at";

const TREATMENT_COLUMNS: &str = "id, user_id, hive_id, product, active_ingredient, dosage, \
     started_on, ended_on, notes, created_at, updated_at";

/// Reject counts the method cannot be assessed from
fn validate_check(
    method: VarroaMethod,
    mite_count: i32,
    sample_size: Option<i32>,
    days: Option<i32>,
) -> AppResult<()> {
    shared::validate_count(mite_count).map_err(|m| AppError::field("mite_count", m))?;
    if method.uses_bee_sample() {
        match sample_size {
            Some(size) if size > 0 => {}
            _ => {
                return Err(AppError::field(
                    "sample_size",
                    "Sample size must be a positive number of bees",
                ))
            }
        }
    } else {
        match days {
            Some(d) if d > 0 => {}
            _ => {
                return Err(AppError::field(
                    "days",
                    "A sticky board needs the number of days it was in place",
                ))
            }
        }
    }
    Ok(())
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl VarroaService {
    /// Create a new VarroaService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------------
    // Mite counts
    // ------------------------------------------------------------------------

    /// List mite counts, newest first
    pub async fn get_checks(
        &self,
        user_id: Uuid,
        filter: VarroaFilter,
    ) -> AppResult<Vec<VarroaCheckRecord>> {
        let checks = sqlx::query_as::<_, VarroaCheck>(&format!(
            r#"
            SELECT {} FROM varroa_checks
            WHERE user_id = $1 AND ($2::uuid IS NULL OR hive_id = $2)
            ORDER BY checked_on DESC, created_at DESC
            "#,
            CHECK_COLUMNS
        ))
        .bind(user_id)
        .bind(filter.hive_id)
        .fetch_all(&self.db)
        .await?;

        Ok(checks.into_iter().map(VarroaCheckRecord::from).collect())
    }

    /// Get a mite count by ID
    pub async fn get_check(&self, user_id: Uuid, check_id: Uuid) -> AppResult<VarroaCheckRecord> {
        self.fetch_check(user_id, check_id).await.map(VarroaCheckRecord::from)
    }

    /// Record a mite count
    pub async fn create_check(
        &self,
        user_id: Uuid,
        input: CreateVarroaCheckInput,
    ) -> AppResult<VarroaCheckRecord> {
        validate_check(input.method, input.mite_count, input.sample_size, input.days)?;
        ensure_owned(&self.db, "hives", user_id, input.hive_id, "Hive").await?;

        let check = sqlx::query_as::<_, VarroaCheck>(&format!(
            r#"
            INSERT INTO varroa_checks (user_id, hive_id, checked_on, method, mite_count,
                                       sample_size, days, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            CHECK_COLUMNS
        ))
        .bind(user_id)
        .bind(input.hive_id)
        .bind(input.checked_on)
        .bind(input.method.as_str())
        .bind(input.mite_count)
        .bind(input.sample_size)
        .bind(input.days)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        let record = VarroaCheckRecord::from(check);
        if let Some(ref assessment) = record.assessment {
            if assessment.treatment_recommended {
                tracing::info!(
                    "Hive {} varroa level {} on {}",
                    record.check.hive_id,
                    assessment.level,
                    record.check.checked_on
                );
            }
        }

        Ok(record)
    }

    /// Update a mite count
    pub async fn update_check(
        &self,
        user_id: Uuid,
        check_id: Uuid,
        input: UpdateVarroaCheckInput,
    ) -> AppResult<VarroaCheckRecord> {
        let existing = self.fetch_check(user_id, check_id).await?;

        let method = match input.method {
            Some(method) => method,
            None => existing.method.parse::<VarroaMethod>().map_err(AppError::Internal)?,
        };
        let hive_id = input.hive_id.unwrap_or(existing.hive_id);
        let checked_on = input.checked_on.unwrap_or(existing.checked_on);
        let mite_count = input.mite_count.unwrap_or(existing.mite_count);
        let sample_size = input.sample_size.or(existing.sample_size);
        let days = input.days.or(existing.days);
        let notes = input.notes.or(existing.notes);

        validate_check(method, mite_count, sample_size, days)?;
        if input.hive_id.is_some() {
            ensure_owned(&self.db, "hives", user_id, hive_id, "Hive").await?;
        }

        let check = sqlx::query_as::<_, VarroaCheck>(&format!(
            r#"
            UPDATE varroa_checks
            SET hive_id = $1, checked_on = $2, method = $3, mite_count = $4, sample_size = $5,
                days = $6, notes = $7, updated_at = NOW()
            WHERE id = $8 AND user_id = $9
            RETURNING {}
            "#,
            CHECK_COLUMNS
        ))
        .bind(hive_id)
        .bind(checked_on)
        .bind(method.as_str())
        .bind(mite_count)
        .bind(sample_size)
        .bind(days)
        .bind(&notes)
        .bind(check_id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(check.into())
    }

    /// Delete a mite count
    pub async fn delete_check(&self, user_id: Uuid, check_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM varroa_checks WHERE id = $1 AND user_id = $2")
            .bind(check_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Varroa check".to_string()));
        }

        Ok(())
    }

    async fn fetch_check(&self, user_id: Uuid, check_id: Uuid) -> AppResult<VarroaCheck> {
        sqlx::query_as::<_, VarroaCheck>(&format!(
            "SELECT {} FROM varroa_checks WHERE id = $1 AND user_id = $2",
            CHECK_COLUMNS
        ))
        .bind(check_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Varroa check".to_string()))
    }

    // ------------------------------------------------------------------------
    // Treatments
    // ------------------------------------------------------------------------

    /// List treatments, most recently started first
    pub async fn get_treatments(
        &self,
        user_id: Uuid,
        filter: VarroaFilter,
    ) -> AppResult<Vec<VarroaTreatmentRecord>> {
        let treatments = sqlx::query_as::<_, VarroaTreatment>(&format!(
            r#"
            SELECT {} FROM varroa_treatments
            WHERE user_id = $1 AND ($2::uuid IS NULL OR hive_id = $2)
            ORDER BY started_on DESC, created_at DESC
            "#,
            TREATMENT_COLUMNS
        ))
        .bind(user_id)
        .bind(filter.hive_id)
        .fetch_all(&self.db)
        .await?;

        let today = today();
        Ok(treatments
            .into_iter()
            .map(|t| VarroaTreatmentRecord::new(t, today))
            .collect())
    }

    /// Get a treatment by ID
    pub async fn get_treatment(
        &self,
        user_id: Uuid,
        treatment_id: Uuid,
    ) -> AppResult<VarroaTreatmentRecord> {
        let treatment = self.fetch_treatment(user_id, treatment_id).await?;
        Ok(VarroaTreatmentRecord::new(treatment, today()))
    }

    /// Record a treatment
    pub async fn create_treatment(
        &self,
        user_id: Uuid,
        input: CreateTreatmentInput,
    ) -> AppResult<VarroaTreatmentRecord> {
        shared::validate_required(&input.product).map_err(|m| AppError::field("product", m))?;
        shared::validate_date_order(input.started_on, input.ended_on)
            .map_err(|m| AppError::field("ended_on", m))?;
        ensure_owned(&self.db, "hives", user_id, input.hive_id, "Hive").await?;

        let treatment = sqlx::query_as::<_, VarroaTreatment>(&format!(
            r#"
            INSERT INTO varroa_treatments (user_id, hive_id, product, active_ingredient, dosage,
                                           started_on, ended_on, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            TREATMENT_COLUMNS
        ))
        .bind(user_id)
        .bind(input.hive_id)
        .bind(input.product.trim())
        .bind(&input.active_ingredient)
        .bind(&input.dosage)
        .bind(input.started_on)
        .bind(input.ended_on)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            "Started treatment {} ({}) on hive {}",
            treatment.id,
            treatment.product,
            treatment.hive_id
        );

        Ok(VarroaTreatmentRecord::new(treatment, today()))
    }

    /// Update a treatment, typically to record its end date
    pub async fn update_treatment(
        &self,
        user_id: Uuid,
        treatment_id: Uuid,
        input: UpdateTreatmentInput,
    ) -> AppResult<VarroaTreatmentRecord> {
        let existing = self.fetch_treatment(user_id, treatment_id).await?;

        if let Some(ref product) = input.product {
            shared::validate_required(product).map_err(|m| AppError::field("product", m))?;
        }
        if let Some(hive_id) = input.hive_id {
            ensure_owned(&self.db, "hives", user_id, hive_id, "Hive").await?;
        }

        let hive_id = input.hive_id.unwrap_or(existing.hive_id);
        let product = input
            .product
            .map(|p| p.trim().to_string())
            .unwrap_or(existing.product);
        let active_ingredient = input.active_ingredient.or(existing.active_ingredient);
        let dosage = input.dosage.or(existing.dosage);
        let started_on = input.started_on.unwrap_or(existing.started_on);
        let ended_on = input.ended_on.or(existing.ended_on);
        let notes = input.notes.or(existing.notes);

        shared::validate_date_order(started_on, ended_on)
            .map_err(|m| AppError::field("ended_on", m))?;

        let treatment = sqlx::query_as::<_, VarroaTreatment>(&format!(
            r#"
            UPDATE varroa_treatments
            SET hive_id = $1, product = $2, active_ingredient = $3, dosage = $4,
                started_on = $5, ended_on = $6, notes = $7, updated_at = NOW()
            WHERE id = $8 AND user_id = $9
            RETURNING {}
            "#,
            TREATMENT_COLUMNS
        ))
        .bind(hive_id)
        .bind(&product)
        .bind(&active_ingredient)
        .bind(&dosage)
        .bind(started_on)
        .bind(ended_on)
        .bind(&notes)
        .bind(treatment_id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(VarroaTreatmentRecord::new(treatment, today()))
    }

    /// Delete a treatment
    pub async fn delete_treatment(&self, user_id: Uuid, treatment_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM varroa_treatments WHERE id = $1 AND user_id = $2")
            .bind(treatment_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Varroa treatment".to_string()));
        }

        Ok(())
    }

    async fn fetch_treatment(&self, user_id: Uuid, treatment_id: Uuid) -> AppResult<VarroaTreatment> {
        sqlx::query_as::<_, VarroaTreatment>(&format!(
            "SELECT {} FROM varroa_treatments WHERE id = $1 AND user_id = $2",
            TREATMENT_COLUMNS
        ))
        .bind(treatment_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Varroa treatment".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::InfestationLevel;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn check(method: &str, mite_count: i32, sample_size: Option<i32>, days: Option<i32>) -> VarroaCheck {
        VarroaCheck {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            hive_id: Uuid::new_v4(),
            checked_on: date(2024, 8, 1),
            method: method.to_string(),
            mite_count,
            sample_size,
            days,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_check_record_carries_assessment() {
        let record = VarroaCheckRecord::from(check("alcohol_wash", 12, Some(300), None));
        let assessment = record.assessment.unwrap();
        assert_eq!(assessment.level, InfestationLevel::High);
        assert!(assessment.treatment_recommended);

        let record = VarroaCheckRecord::from(check("sticky_board", 14, None, Some(7)));
        assert_eq!(record.assessment.unwrap().level, InfestationLevel::Low);
    }

    #[test]
    fn test_unassessable_row_has_no_assessment() {
        let record = VarroaCheckRecord::from(check("sugar_roll", 4, None, None));
        assert!(record.assessment.is_none());
    }

    #[test]
    fn test_validate_check_requires_method_inputs() {
        assert!(validate_check(VarroaMethod::SugarRoll, 3, Some(300), None).is_ok());
        assert!(validate_check(VarroaMethod::SugarRoll, 3, None, Some(3)).is_err());
        assert!(validate_check(VarroaMethod::StickyBoard, 30, None, Some(3)).is_ok());
        assert!(validate_check(VarroaMethod::StickyBoard, 30, None, Some(0)).is_err());
        assert!(validate_check(VarroaMethod::AlcoholWash, -1, Some(300), None).is_err());
    }

    #[test]
    fn test_treatment_record() {
        let treatment = VarroaTreatment {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            hive_id: Uuid::new_v4(),
            product: "Oxalic acid".to_string(),
            active_ingredient: Some("oxalic acid dihydrate".to_string()),
            dosage: Some("5 ml per seam".to_string()),
            started_on: date(2024, 12, 1),
            ended_on: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let record = VarroaTreatmentRecord::new(treatment.clone(), date(2024, 12, 10));
        assert_eq!(record.duration_days, 10);
        assert!(record.active);

        let finished = VarroaTreatment {
            ended_on: Some(date(2024, 12, 3)),
            ..treatment
        };
        let record = VarroaTreatmentRecord::new(finished, date(2024, 12, 10));
        assert_eq!(record.duration_days, 3);
        assert!(!record.active);
    }
}
