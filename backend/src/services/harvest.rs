//! Honey harvest service for recording extractions and yearly totals

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::ensure_owned;

/// Harvest service for managing honey harvests
#[derive(Clone)]
pub struct HarvestService {
    db: PgPool,
}

/// Harvest information
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Harvest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hive_id: Option<Uuid>,
    pub apiary_id: Option<Uuid>,
    pub harvested_on: NaiveDate,
    pub honey_type: Option<String>,
    pub quantity_kg: Decimal,
    pub frames: Option<i32>,
    pub moisture_percent: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Harvest with the moisture verdict for the UI
#[derive(Debug, Clone, Serialize)]
pub struct HarvestRecord {
    #[serde(flatten)]
    pub harvest: Harvest,
    /// Whether the recorded moisture is low enough to extract without fermenting
    pub extractable: Option<bool>,
}

impl From<Harvest> for HarvestRecord {
    fn from(harvest: Harvest) -> Self {
        let extractable = harvest.moisture_percent.map(shared::is_extractable_moisture);
        Self { harvest, extractable }
    }
}

/// Query parameters for listing harvests
#[derive(Debug, Default, Deserialize)]
pub struct HarvestFilter {
    pub hive_id: Option<Uuid>,
    pub apiary_id: Option<Uuid>,
}

/// Input for recording a harvest
#[derive(Debug, Deserialize)]
pub struct RecordHarvestInput {
    pub hive_id: Option<Uuid>,
    pub apiary_id: Option<Uuid>,
    pub harvested_on: NaiveDate,
    pub honey_type: Option<String>,
    pub quantity_kg: Decimal,
    pub frames: Option<i32>,
    pub moisture_percent: Option<Decimal>,
    pub notes: Option<String>,
}

/// Input for updating a harvest
#[derive(Debug, Deserialize)]
pub struct UpdateHarvestInput {
    pub hive_id: Option<Uuid>,
    pub apiary_id: Option<Uuid>,
    pub harvested_on: Option<NaiveDate>,
    pub honey_type: Option<String>,
    pub quantity_kg: Option<Decimal>,
    pub frames: Option<i32>,
    pub moisture_percent: Option<Decimal>,
    pub notes: Option<String>,
}

/// Per-apiary harvest totals for one year
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ApiaryHarvestTotal {
    /// `None` groups harvests not tied to an apiary
    pub apiary_id: Option<Uuid>,
    pub apiary_name: Option<String>,
    pub harvest_count: i64,
    pub total_kg: Decimal,
}

/// Yearly harvest summary
#[derive(Debug, Clone, Serialize)]
pub struct HarvestSummary {
    pub year: i32,
    pub harvest_count: i64,
    pub total_kg: Decimal,
    pub apiaries: Vec<ApiaryHarvestTotal>,
}

const HARVEST_COLUMNS: &str = "id, user_id, hive_id, apiary_id, harvested_on, honey_type, \
     quantity_kg, frames, moisture_percent, notes, created_at, updated_at";

fn validate_amounts(
    quantity_kg: Decimal,
    frames: Option<i32>,
    moisture_percent: Option<Decimal>,
) -> AppResult<()> {
    shared::validate_quantity(quantity_kg).map_err(|m| AppError::field("quantity_kg", m))?;
    if let Some(frames) = frames {
        shared::validate_count(frames).map_err(|m| AppError::field("frames", m))?;
    }
    if let Some(moisture) = moisture_percent {
        shared::validate_moisture_content(moisture)
            .map_err(|m| AppError::field("moisture_percent", m))?;
    }
    Ok(())
}

impl HarvestService {
    /// Create a new HarvestService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List harvests, newest first
    pub async fn get_harvests(
        &self,
        user_id: Uuid,
        filter: HarvestFilter,
    ) -> AppResult<Vec<HarvestRecord>> {
        let harvests = sqlx::query_as::<_, Harvest>(&format!(
            r#"
            SELECT {} FROM harvests
            WHERE user_id = $1
              AND ($2::uuid IS NULL OR hive_id = $2)
              AND ($3::uuid IS NULL OR apiary_id = $3)
            ORDER BY harvested_on DESC, created_at DESC
            "#,
            HARVEST_COLUMNS
        ))
        .bind(user_id)
        .bind(filter.hive_id)
        .bind(filter.apiary_id)
        .fetch_all(&self.db)
        .await?;

        Ok(harvests.into_iter().map(HarvestRecord::from).collect())
    }

    /// Get a specific harvest
    pub async fn get_harvest(&self, user_id: Uuid, harvest_id: Uuid) -> AppResult<HarvestRecord> {
        self.fetch_harvest(user_id, harvest_id).await.map(HarvestRecord::from)
    }

    /// Record a new harvest
    ///
    /// A harvest taken from a hive defaults to that hive's apiary.
    pub async fn record_harvest(
        &self,
        user_id: Uuid,
        input: RecordHarvestInput,
    ) -> AppResult<HarvestRecord> {
        validate_amounts(input.quantity_kg, input.frames, input.moisture_percent)?;
        let apiary_id = self
            .resolve_source(user_id, input.hive_id, input.apiary_id)
            .await?;

        let harvest = sqlx::query_as::<_, Harvest>(&format!(
            r#"
            INSERT INTO harvests (user_id, hive_id, apiary_id, harvested_on, honey_type,
                                  quantity_kg, frames, moisture_percent, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            HARVEST_COLUMNS
        ))
        .bind(user_id)
        .bind(input.hive_id)
        .bind(apiary_id)
        .bind(input.harvested_on)
        .bind(&input.honey_type)
        .bind(input.quantity_kg)
        .bind(input.frames)
        .bind(input.moisture_percent)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            "Recorded harvest {} of {} kg for user {}",
            harvest.id,
            harvest.quantity_kg,
            user_id
        );

        Ok(harvest.into())
    }

    /// Update a harvest
    pub async fn update_harvest(
        &self,
        user_id: Uuid,
        harvest_id: Uuid,
        input: UpdateHarvestInput,
    ) -> AppResult<HarvestRecord> {
        let existing = self.fetch_harvest(user_id, harvest_id).await?;

        let hive_id = input.hive_id.or(existing.hive_id);
        let harvested_on = input.harvested_on.unwrap_or(existing.harvested_on);
        let honey_type = input.honey_type.or(existing.honey_type);
        let quantity_kg = input.quantity_kg.unwrap_or(existing.quantity_kg);
        let frames = input.frames.or(existing.frames);
        let moisture_percent = input.moisture_percent.or(existing.moisture_percent);
        let notes = input.notes.or(existing.notes);

        validate_amounts(quantity_kg, frames, moisture_percent)?;
        let apiary_id = match update_source(input.hive_id, input.apiary_id, existing.hive_id) {
            Some((hive, apiary)) => self.resolve_source(user_id, hive, apiary).await?,
            None => existing.apiary_id,
        };

        let harvest = sqlx::query_as::<_, Harvest>(&format!(
            r#"
            UPDATE harvests
            SET hive_id = $1, apiary_id = $2, harvested_on = $3, honey_type = $4,
                quantity_kg = $5, frames = $6, moisture_percent = $7, notes = $8,
                updated_at = NOW()
            WHERE id = $9 AND user_id = $10
            RETURNING {}
            "#,
            HARVEST_COLUMNS
        ))
        .bind(hive_id)
        .bind(apiary_id)
        .bind(harvested_on)
        .bind(&honey_type)
        .bind(quantity_kg)
        .bind(frames)
        .bind(moisture_percent)
        .bind(&notes)
        .bind(harvest_id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(harvest.into())
    }

    /// Delete a harvest
    pub async fn delete_harvest(&self, user_id: Uuid, harvest_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM harvests WHERE id = $1 AND user_id = $2")
            .bind(harvest_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Harvest".to_string()));
        }

        tracing::info!("Deleted harvest {} for user {}", harvest_id, user_id);

        Ok(())
    }

    /// Totals per apiary for a calendar year (the current year by default)
    pub async fn get_summary(&self, user_id: Uuid, year: Option<i32>) -> AppResult<HarvestSummary> {
        let year = year.unwrap_or_else(|| Utc::now().year());
        let (start, end) = year_bounds(year)?;

        let apiaries = sqlx::query_as::<_, ApiaryHarvestTotal>(
            r#"
            SELECT h.apiary_id, a.name AS apiary_name,
                   COUNT(*) AS harvest_count,
                   COALESCE(SUM(h.quantity_kg), 0) AS total_kg
            FROM harvests h
            LEFT JOIN apiaries a ON a.id = h.apiary_id
            WHERE h.user_id = $1 AND h.harvested_on >= $2 AND h.harvested_on < $3
            GROUP BY h.apiary_id, a.name
            ORDER BY total_kg DESC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(summarize(year, apiaries))
    }

    async fn fetch_harvest(&self, user_id: Uuid, harvest_id: Uuid) -> AppResult<Harvest> {
        sqlx::query_as::<_, Harvest>(&format!(
            "SELECT {} FROM harvests WHERE id = $1 AND user_id = $2",
            HARVEST_COLUMNS
        ))
        .bind(harvest_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Harvest".to_string()))
    }

    /// Check ownership of the hive and apiary and pick the apiary to store
    async fn resolve_source(
        &self,
        user_id: Uuid,
        hive_id: Option<Uuid>,
        apiary_id: Option<Uuid>,
    ) -> AppResult<Option<Uuid>> {
        if let Some(apiary_id) = apiary_id {
            ensure_owned(&self.db, "apiaries", user_id, apiary_id, "Apiary").await?;
        }

        match hive_id {
            Some(hive_id) => {
                let hive_apiary = sqlx::query_scalar::<_, Option<Uuid>>(
                    "SELECT apiary_id FROM hives WHERE id = $1 AND user_id = $2",
                )
                .bind(hive_id)
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Hive".to_string()))?;

                Ok(apiary_id.or(hive_apiary))
            }
            None => Ok(apiary_id),
        }
    }
}

/// Hive and apiary to resolve the stored apiary from on update
///
/// `None` keeps the stored apiary. A new hive given alone brings its own apiary.
fn update_source(
    input_hive: Option<Uuid>,
    input_apiary: Option<Uuid>,
    existing_hive: Option<Uuid>,
) -> Option<(Option<Uuid>, Option<Uuid>)> {
    match (input_hive, input_apiary) {
        (None, None) => None,
        (Some(hive), None) => Some((Some(hive), None)),
        (hive, Some(apiary)) => Some((hive.or(existing_hive), Some(apiary))),
    }
}

/// First day of `year` and of the year after
fn year_bounds(year: i32) -> AppResult<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1);
    let end = year.checked_add(1).and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1));
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(AppError::field("year", "Year is out of range")),
    }
}

fn summarize(year: i32, apiaries: Vec<ApiaryHarvestTotal>) -> HarvestSummary {
    let harvest_count = apiaries.iter().map(|a| a.harvest_count).sum();
    let total_kg = apiaries.iter().map(|a| a.total_kg).sum();
    HarvestSummary {
        year,
        harvest_count,
        total_kg,
        apiaries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_to_another_hive_rederives_apiary() {
        let old_hive = Uuid::new_v4();
        let new_hive = Uuid::new_v4();
        assert_eq!(
            update_source(Some(new_hive), None, Some(old_hive)),
            Some((Some(new_hive), None))
        );
    }

    #[test]
    fn test_update_source_keeps_or_overrides_apiary() {
        let hive = Uuid::new_v4();
        let apiary = Uuid::new_v4();
        assert_eq!(update_source(None, None, Some(hive)), None);
        assert_eq!(
            update_source(None, Some(apiary), Some(hive)),
            Some((Some(hive), Some(apiary)))
        );
        assert_eq!(update_source(None, Some(apiary), None), Some((None, Some(apiary))));
    }

    #[test]
    fn test_year_bounds() {
        let (start, end) = year_bounds(2024).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert!(year_bounds(i32::MAX).is_err());
    }

    #[test]
    fn test_summary_totals() {
        let summary = summarize(
            2024,
            vec![
                ApiaryHarvestTotal {
                    apiary_id: Some(Uuid::new_v4()),
                    apiary_name: Some("Orchard".to_string()),
                    harvest_count: 3,
                    total_kg: Decimal::new(4550, 2),
                },
                ApiaryHarvestTotal {
                    apiary_id: None,
                    apiary_name: None,
                    harvest_count: 1,
                    total_kg: Decimal::new(1200, 2),
                },
            ],
        );

        assert_eq!(summary.harvest_count, 4);
        assert_eq!(summary.total_kg, Decimal::new(5750, 2));
        assert_eq!(summary.apiaries.len(), 2);
    }

    #[test]
    fn test_extractable_flag() {
        let harvest = Harvest {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            hive_id: None,
            apiary_id: None,
            harvested_on: NaiveDate::from_ymd_opt(2024, 7, 20).unwrap(),
            honey_type: Some("Summer blossom".to_string()),
            quantity_kg: Decimal::new(180, 1),
            frames: Some(9),
            moisture_percent: Some(Decimal::new(172, 1)),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(HarvestRecord::from(harvest.clone()).extractable, Some(true));

        let wet = Harvest {
            moisture_percent: Some(Decimal::new(200, 1)),
            ..harvest.clone()
        };
        assert_eq!(HarvestRecord::from(wet).extractable, Some(false));

        let unmeasured = Harvest {
            moisture_percent: None,
            ..harvest
        };
        assert_eq!(HarvestRecord::from(unmeasured).extractable, None);
    }
}
