//! Business logic services for the Apiary Records Platform

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub mod apiary;
pub mod dropdown;
pub mod feeding;
pub mod harvest;
pub mod hive;
pub mod inspection;
pub mod profile;
pub mod queen;
pub mod rearing;
pub mod reporting;
pub mod support;
pub mod varroa;

/// Fail with NotFound unless `id` is a row of `table` owned by `user_id`
///
/// `table` must be one of the fixed table names used by the services.
pub(crate) async fn ensure_owned(
    db: &PgPool,
    table: &'static str,
    user_id: Uuid,
    id: Uuid,
    resource: &str,
) -> AppResult<()> {
    let owned = sqlx::query_scalar::<_, bool>(&format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1 AND user_id = $2)",
        table
    ))
    .bind(id)
    .bind(user_id)
    .fetch_one(db)
    .await?;

    if owned {
        Ok(())
    } else {
        Err(AppError::NotFound(resource.to_string()))
    }
}
