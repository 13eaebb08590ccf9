//! Shared types and models for the Apiary Records Platform
//!
//! This crate contains the domain enums, the record calculations and the
//! input validation used by both the backend and the browser (via WASM).

pub mod error;
pub mod models;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use types::*;
pub use validation::*;
