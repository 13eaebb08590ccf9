//! Authentication middleware
//!
//! Verifies access tokens issued by the hosted auth service and attaches
//! the caller's profile role to the request.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::profile::ProfileService;
use crate::AppState;
use shared::models::AppRole;

/// Authenticated user information extracted from the access token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: AppRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Fail with 403 unless the caller is an admin
    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::InsufficientPermissions)
        }
    }
}

/// Claims carried by the hosted auth service's access tokens
#[derive(Debug, Deserialize)]
pub struct Claims {
    /// Auth user id
    pub sub: String,
    pub email: Option<String>,
    pub exp: i64,
}

/// Authentication middleware that validates bearer tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = bearer_token(&request).map(str::to_owned);

    match authenticate(&state, token).await {
        Ok(auth_user) => {
            request.extensions_mut().insert(auth_user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

async fn authenticate(state: &AppState, token: Option<String>) -> AppResult<AuthUser> {
    let token = token
        .ok_or_else(|| AppError::Unauthorized("Missing or invalid Authorization header".into()))?;

    let claims = decode_jwt(&token, &state.config.auth.jwt_secret, &state.config.auth.jwt_audience)?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user ID in token".into()))?;

    let role = ProfileService::new(state.db.clone())
        .ensure_profile(user_id, claims.email.as_deref())
        .await?;

    Ok(AuthUser {
        user_id,
        email: claims.email,
        role,
    })
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

/// Decode and validate an HS256 access token
pub fn decode_jwt(token: &str, secret: &str, audience: &str) -> AppResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[audience]);

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        })
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    const SECRET: &str = "test-secret";

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        email: &'a str,
        aud: &'a str,
        exp: i64,
    }

    fn token(aud: &str, exp: i64) -> String {
        let claims = TestClaims {
            sub: "6f1c2a56-86a4-4a53-9b0e-7c1f4f2d9a10",
            email: "keeper@example.com",
            aud,
            exp,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    fn in_one_hour() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn test_decode_valid_token() {
        let claims = decode_jwt(&token("authenticated", in_one_hour()), SECRET, "authenticated").unwrap();
        assert_eq!(claims.sub, "6f1c2a56-86a4-4a53-9b0e-7c1f4f2d9a10");
        assert_eq!(claims.email.as_deref(), Some("keeper@example.com"));
    }

    #[test]
    fn test_wrong_audience_is_rejected() {
        let result = decode_jwt(&token("anon", in_one_hour()), SECRET, "authenticated");
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_is_reported() {
        let an_hour_ago = chrono::Utc::now().timestamp() - 3600;
        let result = decode_jwt(&token("authenticated", an_hour_ago), SECRET, "authenticated");
        assert!(matches!(result, Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let result = decode_jwt(&token("authenticated", in_one_hour()), "other", "authenticated");
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_require_admin() {
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            email: None,
            role: AppRole::User,
        };
        assert!(matches!(user.require_admin(), Err(AppError::InsufficientPermissions)));

        let admin = AuthUser { role: AppRole::Admin, ..user };
        assert!(admin.require_admin().is_ok());
    }
}
