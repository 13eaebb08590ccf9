//! Dropdown lookup lists managed by admins

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Dropdown service for form lookup lists
#[derive(Clone)]
pub struct DropdownService {
    db: PgPool,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DropdownCategory {
    pub id: Uuid,
    pub key: String,
    pub label: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DropdownValue {
    pub id: Uuid,
    pub category_id: Uuid,
    pub value: String,
    pub label: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Category with its values in display order
#[derive(Debug, Clone, Serialize)]
pub struct CategoryWithValues {
    #[serde(flatten)]
    pub category: DropdownCategory,
    pub values: Vec<DropdownValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DropdownQuery {
    /// Admins may ask for deactivated values too
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryInput {
    pub key: String,
    pub label: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryInput {
    pub label: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateValueInput {
    pub value: String,
    pub label: String,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateValueInput {
    pub value: Option<String>,
    pub label: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

const CATEGORY_COLUMNS: &str = "id, key, label, description, created_at";
const VALUE_COLUMNS: &str = "id, category_id, value, label, sort_order, is_active, created_at";

fn group_values(
    categories: Vec<DropdownCategory>,
    values: Vec<DropdownValue>,
) -> Vec<CategoryWithValues> {
    let mut by_category: HashMap<Uuid, Vec<DropdownValue>> = HashMap::new();
    for value in values {
        by_category.entry(value.category_id).or_default().push(value);
    }

    categories
        .into_iter()
        .map(|category| {
            let mut values = by_category.remove(&category.id).unwrap_or_default();
            values.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.label.cmp(&b.label)));
            CategoryWithValues { category, values }
        })
        .collect()
}

impl DropdownService {
    /// Create a new DropdownService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All categories with their values
    pub async fn get_categories(&self, include_inactive: bool) -> AppResult<Vec<CategoryWithValues>> {
        let categories = sqlx::query_as::<_, DropdownCategory>(&format!(
            "SELECT {} FROM dropdown_categories ORDER BY label ASC",
            CATEGORY_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        let values = sqlx::query_as::<_, DropdownValue>(&format!(
            "SELECT {} FROM dropdown_values WHERE ($1 OR is_active)",
            VALUE_COLUMNS
        ))
        .bind(include_inactive)
        .fetch_all(&self.db)
        .await?;

        Ok(group_values(categories, values))
    }

    /// One category by its key, e.g. `feed_type`
    pub async fn get_category(&self, key: &str, include_inactive: bool) -> AppResult<CategoryWithValues> {
        let category = sqlx::query_as::<_, DropdownCategory>(&format!(
            "SELECT {} FROM dropdown_categories WHERE key = $1",
            CATEGORY_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Dropdown category".to_string()))?;

        let values = sqlx::query_as::<_, DropdownValue>(&format!(
            "SELECT {} FROM dropdown_values WHERE category_id = $1 AND ($2 OR is_active)",
            VALUE_COLUMNS
        ))
        .bind(category.id)
        .bind(include_inactive)
        .fetch_all(&self.db)
        .await?;

        group_values(vec![category], values)
            .pop()
            .ok_or_else(|| AppError::NotFound("Dropdown category".to_string()))
    }

    pub async fn create_category(&self, input: CreateCategoryInput) -> AppResult<DropdownCategory> {
        shared::validate_dropdown_key(&input.key).map_err(|m| AppError::field("key", m))?;
        shared::validate_required(&input.label).map_err(|m| AppError::field("label", m))?;

        let category = sqlx::query_as::<_, DropdownCategory>(&format!(
            r#"
            INSERT INTO dropdown_categories (key, label, description)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(&input.key)
        .bind(input.label.trim())
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Created dropdown category {}", category.key);

        Ok(category)
    }

    pub async fn update_category(
        &self,
        category_id: Uuid,
        input: UpdateCategoryInput,
    ) -> AppResult<DropdownCategory> {
        if let Some(ref label) = input.label {
            shared::validate_required(label).map_err(|m| AppError::field("label", m))?;
        }

        let category = sqlx::query_as::<_, DropdownCategory>(&format!(
            r#"
            UPDATE dropdown_categories
            SET label = COALESCE($1, label), description = COALESCE($2, description)
            WHERE id = $3
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(input.label.as_deref().map(str::trim))
        .bind(&input.description)
        .bind(category_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Dropdown category".to_string()))?;

        Ok(category)
    }

    /// Delete a category and all of its values
    pub async fn delete_category(&self, category_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM dropdown_categories WHERE id = $1")
            .bind(category_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Dropdown category".to_string()));
        }

        tracing::info!("Deleted dropdown category {}", category_id);

        Ok(())
    }

    pub async fn create_value(
        &self,
        category_id: Uuid,
        input: CreateValueInput,
    ) -> AppResult<DropdownValue> {
        shared::validate_required(&input.value).map_err(|m| AppError::field("value", m))?;
        shared::validate_required(&input.label).map_err(|m| AppError::field("label", m))?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM dropdown_categories WHERE id = $1)",
        )
        .bind(category_id)
        .fetch_one(&self.db)
        .await?;
        if !exists {
            return Err(AppError::NotFound("Dropdown category".to_string()));
        }

        let value = sqlx::query_as::<_, DropdownValue>(&format!(
            r#"
            INSERT INTO dropdown_values (category_id, value, label, sort_order, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            VALUE_COLUMNS
        ))
        .bind(category_id)
        .bind(input.value.trim())
        .bind(input.label.trim())
        .bind(input.sort_order.unwrap_or(0))
        .bind(input.is_active.unwrap_or(true))
        .fetch_one(&self.db)
        .await?;

        Ok(value)
    }

    pub async fn update_value(&self, value_id: Uuid, input: UpdateValueInput) -> AppResult<DropdownValue> {
        if let Some(ref value) = input.value {
            shared::validate_required(value).map_err(|m| AppError::field("value", m))?;
        }
        if let Some(ref label) = input.label {
            shared::validate_required(label).map_err(|m| AppError::field("label", m))?;
        }

        let value = sqlx::query_as::<_, DropdownValue>(&format!(
            r#"
            UPDATE dropdown_values
            SET value = COALESCE($1, value),
                label = COALESCE($2, label),
                sort_order = COALESCE($3, sort_order),
                is_active = COALESCE($4, is_active)
            WHERE id = $5
            RETURNING {}
            "#,
            VALUE_COLUMNS
        ))
        .bind(input.value.as_deref().map(str::trim))
        .bind(input.label.as_deref().map(str::trim))
        .bind(input.sort_order)
        .bind(input.is_active)
        .bind(value_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Dropdown value".to_string()))?;

        Ok(value)
    }

    pub async fn delete_value(&self, value_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM dropdown_values WHERE id = $1")
            .bind(value_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Dropdown value".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(key: &str) -> DropdownCategory {
        DropdownCategory {
            id: Uuid::new_v4(),
            key: key.to_string(),
            label: key.to_string(),
            description: None,
            created_at: Utc::now(),
        }
    }

    fn value(category_id: Uuid, value: &str, sort_order: i32) -> DropdownValue {
        DropdownValue {
            id: Uuid::new_v4(),
            category_id,
            value: value.to_string(),
            label: value.to_string(),
            sort_order,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_group_values_orders_and_keeps_empty_categories() {
        let feeds = category("feed_type");
        let breeds = category("queen_breed");
        let values = vec![
            value(feeds.id, "fondant", 3),
            value(feeds.id, "syrup_1_1", 1),
            value(feeds.id, "syrup_2_1", 2),
        ];

        let grouped = group_values(vec![feeds, breeds], values);

        assert_eq!(grouped.len(), 2);
        let order: Vec<&str> = grouped[0].values.iter().map(|v| v.value.as_str()).collect();
        assert_eq!(order, ["syrup_1_1", "syrup_2_1", "fondant"]);
        assert!(grouped[1].values.is_empty());
    }
}
