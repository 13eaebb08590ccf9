//! Domain models for the Apiary Records Platform

mod hive;
mod inspection;
mod queen;
mod rearing;
mod support;
mod user;
mod varroa;

pub use hive::*;
pub use inspection::*;
pub use queen::*;
pub use rearing::*;
pub use support::*;
pub use user::*;
pub use varroa::*;
