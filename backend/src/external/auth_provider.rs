//! Hosted auth API client
//!
//! Sign-up, password sign-in and token refresh are handled by the hosted
//! auth service. The API forwards those calls so the browser only talks to
//! one origin, and returns the session payload untouched.

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::{Validate, ValidationError};

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};

/// Hosted auth API client
#[derive(Clone)]
pub struct AuthProviderClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// Email check shared with the browser forms
fn check_email(email: &str) -> Result<(), ValidationError> {
    shared::validate_email(email).map_err(|message| {
        let mut error = ValidationError::new("email");
        error.message = Some(message.into());
        error
    })
}

/// Sign-up request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupInput {
    #[validate(custom = "check_email")]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "Display name must be 1-100 characters"))]
    pub display_name: Option<String>,
}

/// Password sign-in request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(custom = "check_email")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct RefreshInput {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

impl AuthProviderClient {
    /// Create a client for the configured project
    pub fn new(config: &AuthConfig) -> Self {
        Self::with_base_url(config.provider_url.clone(), config.api_key.clone())
    }

    /// Create a client against a custom base URL (for testing)
    pub fn with_base_url(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Register a new account
    pub async fn signup(&self, input: &SignupInput) -> AppResult<Value> {
        let body = json!({
            "email": input.email,
            "password": input.password,
            "data": { "display_name": input.display_name },
        });
        self.post("signup", &body).await
    }

    /// Exchange email and password for a session
    pub async fn login(&self, input: &LoginInput) -> AppResult<Value> {
        let body = json!({ "email": input.email, "password": input.password });
        self.post("token?grant_type=password", &body).await
    }

    /// Exchange a refresh token for a new session
    pub async fn refresh(&self, input: &RefreshInput) -> AppResult<Value> {
        self.post("token?grant_type=refresh_token", &json!(input))
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: &Value) -> AppResult<Value> {
        let response = self
            .client
            .post(self.url(path))
            .header("apikey", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Auth request failed: {}", e)))?;

        read_response(response).await
    }
}

async fn read_response(response: Response) -> AppResult<Value> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| AppError::ExternalService(format!("Failed to read auth response: {}", e)))?;
    let body = parse_body(&text);

    if status.is_success() {
        Ok(body)
    } else {
        Err(AppError::AuthProvider {
            status: status.as_u16(),
            body,
        })
    }
}

/// Parse the upstream body, wrapping non-JSON text in a message object
fn parse_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "message": text }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let client = AuthProviderClient::with_base_url(
            "https://project.example.co/".to_string(),
            "anon-key".to_string(),
        );
        assert_eq!(
            client.url("token?grant_type=password"),
            "https://project.example.co/auth/v1/token?grant_type=password"
        );
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(r#"{"msg":"Invalid login credentials"}"#)["msg"], "Invalid login credentials");
        assert_eq!(parse_body("Bad Gateway")["message"], "Bad Gateway");
    }

    #[test]
    fn test_signup_validation() {
        let input = SignupInput {
            email: "keeper@example.com".to_string(),
            password: "12345".to_string(),
            display_name: None,
        };
        let error = AppError::from(input.validate().unwrap_err());
        assert!(matches!(error, AppError::Validation { ref field, .. } if field == "password"));
    }

    #[test]
    fn test_login_rejects_email_without_domain_dot() {
        let input = LoginInput {
            email: "keeper@localhost".to_string(),
            password: "secret".to_string(),
        };
        let error = AppError::from(input.validate().unwrap_err());
        assert!(matches!(
            error,
            AppError::Validation { ref field, ref message }
                if field == "email" && message == "Invalid email format"
        ));
    }
}
