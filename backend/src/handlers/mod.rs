//! HTTP request handlers

pub mod apiary;
pub mod auth;
pub mod dropdown;
pub mod feeding;
pub mod harvest;
pub mod health;
pub mod hive;
pub mod inspection;
pub mod queen;
pub mod rearing;
pub mod reporting;
pub mod support;
pub mod varroa;

pub use apiary::*;
pub use auth::*;
pub use dropdown::*;
pub use feeding::*;
pub use harvest::*;
pub use health::*;
pub use hive::*;
pub use inspection::*;
pub use queen::*;
pub use rearing::*;
pub use reporting::*;
pub use support::*;
pub use varroa::*;
