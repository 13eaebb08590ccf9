//! Reporting service for the dashboard and record exports

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::{
    apiary::ApiaryService,
    feeding::{FeedingFilter, FeedingService},
    harvest::{HarvestFilter, HarvestService},
    hive::{HiveFilter, HiveService},
    inspection::{InspectionFilter, InspectionService},
    queen::QueenService,
    varroa::{VarroaFilter, VarroaService},
};
use shared::models::TicketStatus;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Dashboard metrics
#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub apiaries: i64,
    pub active_hives: i64,
    pub active_queens: i64,
    pub inspections_last_30_days: i64,
    pub open_tickets: i64,
    pub harvest_kg_this_year: Decimal,
    pub active_treatments: i64,
}

/// Record sets that can be exported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportEntity {
    Apiaries,
    Hives,
    Queens,
    Inspections,
    Feedings,
    Harvests,
    VarroaChecks,
    VarroaTreatments,
}

impl ExportEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportEntity::Apiaries => "apiaries",
            ExportEntity::Hives => "hives",
            ExportEntity::Queens => "queens",
            ExportEntity::Inspections => "inspections",
            ExportEntity::Feedings => "feedings",
            ExportEntity::Harvests => "harvests",
            ExportEntity::VarroaChecks => "varroa_checks",
            ExportEntity::VarroaTreatments => "varroa_treatments",
        }
    }
}

impl std::str::FromStr for ExportEntity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "apiaries" => Ok(ExportEntity::Apiaries),
            "hives" => Ok(ExportEntity::Hives),
            "queens" => Ok(ExportEntity::Queens),
            "inspections" => Ok(ExportEntity::Inspections),
            "feedings" => Ok(ExportEntity::Feedings),
            "harvests" => Ok(ExportEntity::Harvests),
            "varroa_checks" => Ok(ExportEntity::VarroaChecks),
            "varroa_treatments" => Ok(ExportEntity::VarroaTreatments),
            _ => Err(AppError::NotFound(format!("Export '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

/// A rendered export ready to be sent as a download
#[derive(Debug)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

impl ReportingService {
    /// Create a new ReportingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get dashboard metrics
    pub async fn get_dashboard_metrics(&self, user_id: Uuid) -> AppResult<DashboardMetrics> {
        let apiaries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM apiaries WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;

        let active_hives: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM hives WHERE user_id = $1 AND status = 'active'",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        let active_queens: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM queens WHERE user_id = $1 AND status = 'active'",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        // Inspections (last 30 days)
        let inspections_last_30_days: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM inspections
            WHERE user_id = $1 AND inspected_on >= CURRENT_DATE - INTERVAL '30 days'
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        let open_tickets: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM support_tickets
            WHERE user_id = $1 AND status = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(TicketStatus::open_statuses())
        .fetch_one(&self.db)
        .await?;

        let harvest_kg_this_year: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(quantity_kg), 0) FROM harvests
            WHERE user_id = $1 AND EXTRACT(YEAR FROM harvested_on)::int = $2
            "#,
        )
        .bind(user_id)
        .bind(Utc::now().year())
        .fetch_one(&self.db)
        .await?;

        let active_treatments: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM varroa_treatments
            WHERE user_id = $1 AND started_on <= CURRENT_DATE
              AND (ended_on IS NULL OR ended_on >= CURRENT_DATE)
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(DashboardMetrics {
            apiaries,
            active_hives,
            active_queens,
            inspections_last_30_days,
            open_tickets,
            harvest_kg_this_year,
            active_treatments,
        })
    }

    /// Export one record set of the caller's data
    pub async fn export(
        &self,
        user_id: Uuid,
        entity: ExportEntity,
        format: ExportFormat,
    ) -> AppResult<ExportFile> {
        let db = self.db.clone();
        let body = match entity {
            ExportEntity::Apiaries => {
                let rows: Vec<_> = ApiaryService::new(db)
                    .get_apiaries(user_id)
                    .await?
                    .into_iter()
                    .map(|s| s.apiary)
                    .collect();
                render(&rows, format)?
            }
            ExportEntity::Hives => {
                let rows = HiveService::new(db)
                    .get_hives(user_id, HiveFilter::default())
                    .await?;
                render(&rows, format)?
            }
            ExportEntity::Queens => {
                let rows: Vec<_> = QueenService::new(db)
                    .get_queens(user_id)
                    .await?
                    .into_iter()
                    .map(|q| q.queen)
                    .collect();
                render(&rows, format)?
            }
            ExportEntity::Inspections => {
                let rows = InspectionService::new(db)
                    .get_inspections(user_id, &InspectionFilter::default())
                    .await?;
                render(&rows, format)?
            }
            ExportEntity::Feedings => {
                let rows = FeedingService::new(db)
                    .get_feedings(user_id, FeedingFilter::default())
                    .await?;
                render(&rows, format)?
            }
            ExportEntity::Harvests => {
                let rows: Vec<_> = HarvestService::new(db)
                    .get_harvests(user_id, HarvestFilter::default())
                    .await?
                    .into_iter()
                    .map(|h| h.harvest)
                    .collect();
                render(&rows, format)?
            }
            ExportEntity::VarroaChecks => {
                let rows: Vec<_> = VarroaService::new(db)
                    .get_checks(user_id, VarroaFilter::default())
                    .await?
                    .into_iter()
                    .map(|c| c.check)
                    .collect();
                render(&rows, format)?
            }
            ExportEntity::VarroaTreatments => {
                let rows: Vec<_> = VarroaService::new(db)
                    .get_treatments(user_id, VarroaFilter::default())
                    .await?
                    .into_iter()
                    .map(|t| t.treatment)
                    .collect();
                render(&rows, format)?
            }
        };

        tracing::debug!("Exported {} for user {}", entity.as_str(), user_id);

        Ok(export_file(entity, format, body))
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}

fn render<T: Serialize>(rows: &[T], format: ExportFormat) -> AppResult<String> {
    match format {
        ExportFormat::Csv => ReportingService::export_to_csv(rows),
        ExportFormat::Json => serde_json::to_string_pretty(rows)
            .map_err(|e| AppError::Internal(format!("JSON serialization error: {}", e))),
    }
}

fn export_file(entity: ExportEntity, format: ExportFormat, body: String) -> ExportFile {
    let date = Utc::now().date_naive();
    let (extension, content_type) = match format {
        ExportFormat::Csv => ("csv", "text/csv; charset=utf-8"),
        ExportFormat::Json => ("json", "application/json"),
    };
    ExportFile {
        filename: format!("{}_{}.{}", entity.as_str(), date.format("%Y-%m-%d"), extension),
        content_type,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[derive(Serialize)]
    struct Row {
        id: u32,
        inspected_on: NaiveDate,
        temperament: Option<i32>,
        notes: Option<String>,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                id: 1,
                inspected_on: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                temperament: Some(4),
                notes: Some("calm, lots of nectar".to_string()),
            },
            Row {
                id: 2,
                inspected_on: NaiveDate::from_ymd_opt(2024, 5, 8).unwrap(),
                temperament: None,
                notes: None,
            },
        ]
    }

    #[test]
    fn test_csv_has_header_and_quotes_commas() {
        let csv = ReportingService::export_to_csv(&rows()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "id,inspected_on,temperament,notes");
        assert_eq!(lines[1], "1,2024-05-01,4,\"calm, lots of nectar\"");
        assert_eq!(lines[2], "2,2024-05-08,,");
    }

    #[test]
    fn test_json_render() {
        let json = render(&rows(), ExportFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_entity_names() {
        assert_eq!("varroa-checks".parse::<ExportEntity>().unwrap(), ExportEntity::VarroaChecks);
        assert_eq!("harvests".parse::<ExportEntity>().unwrap(), ExportEntity::Harvests);
        assert!("users".parse::<ExportEntity>().is_err());
    }

    #[test]
    fn test_export_filename() {
        let file = export_file(ExportEntity::Inspections, ExportFormat::Csv, String::new());
        assert!(file.filename.starts_with("inspections_"));
        assert!(file.filename.ends_with(".csv"));
        assert_eq!(file.content_type, "text/csv; charset=utf-8");
    }
}
