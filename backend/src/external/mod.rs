//! External API integrations

pub mod auth_provider;
