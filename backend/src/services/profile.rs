//! User profile service: role lookup and admin role management

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::models::AppRole;

/// Profile service for the signed-in user's profile and roles
#[derive(Clone)]
pub struct ProfileService {
    db: PgPool,
}

/// Profile row mirrored from the hosted auth user
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for updating one's own profile
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 100, message = "Display name must be 1-100 characters"))]
    pub display_name: Option<String>,
}

/// Input for changing a user's role
#[derive(Debug, Deserialize)]
pub struct SetRoleInput {
    pub role: AppRole,
}

/// Upsert returning the stored role, whether or not this call inserted the row
const ENSURE_PROFILE_SQL: &str = r#"
    INSERT INTO user_profiles (id, email)
    VALUES ($1, $2)
    ON CONFLICT (id) DO UPDATE
        SET email = COALESCE(user_profiles.email, EXCLUDED.email)
    RETURNING role
"#;

fn parse_role(role: &str) -> AppResult<AppRole> {
    role.parse::<AppRole>().map_err(AppError::Internal)
}

impl ProfileService {
    /// Create a new ProfileService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Return the caller's role, creating a `user` profile on first sight
    pub async fn ensure_profile(&self, user_id: Uuid, email: Option<&str>) -> AppResult<AppRole> {
        let role = sqlx::query_scalar::<_, String>(ENSURE_PROFILE_SQL)
            .bind(user_id)
            .bind(email)
            .fetch_one(&self.db)
            .await?;

        parse_role(&role)
    }

    /// Get a profile by user ID
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, email, display_name, role, created_at, updated_at
            FROM user_profiles
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile".to_string()))
    }

    /// Update the caller's own profile
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> AppResult<UserProfile> {
        input.validate()?;
        let existing = self.get_profile(user_id).await?;
        let display_name = input.display_name.or(existing.display_name);

        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE user_profiles
            SET display_name = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, email, display_name, role, created_at, updated_at
            "#,
        )
        .bind(&display_name)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(profile)
    }

    /// List every profile (admin)
    pub async fn list_profiles(&self) -> AppResult<Vec<UserProfile>> {
        let profiles = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, email, display_name, role, created_at, updated_at
            FROM user_profiles
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(profiles)
    }

    /// Change another user's role (admin)
    pub async fn set_role(
        &self,
        acting_user_id: Uuid,
        target_user_id: Uuid,
        role: AppRole,
    ) -> AppResult<UserProfile> {
        if acting_user_id == target_user_id && role != AppRole::Admin {
            return Err(AppError::Conflict {
                resource: "role".to_string(),
                message: "Admins cannot remove their own admin role".to_string(),
            });
        }

        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE user_profiles
            SET role = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, email, display_name, role, created_at, updated_at
            "#,
        )
        .bind(role.as_str())
        .bind(target_user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile".to_string()))?;

        tracing::info!(
            "User {} set role of {} to {}",
            acting_user_id,
            target_user_id,
            role
        );

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_profile_always_returns_row() {
        let sql = ENSURE_PROFILE_SQL.to_uppercase();
        assert!(sql.contains("ON CONFLICT (ID) DO UPDATE"));
        assert!(!sql.contains("DO NOTHING"));
        assert!(sql.trim_end().ends_with("RETURNING ROLE"));
    }

    #[test]
    fn test_ensure_profile_keeps_stored_email() {
        assert!(ENSURE_PROFILE_SQL.contains("COALESCE(user_profiles.email, EXCLUDED.email)"));
    }

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role("admin").unwrap(), AppRole::Admin);
        assert!(parse_role("beekeeper").is_err());
    }
}
