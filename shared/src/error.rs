//! Errors raised by the pure domain calculations

use chrono::NaiveDate;
use thiserror::Error;

/// Reasons a calculation cannot produce a value
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalculationError {
    #[error("birth year {birth_year} is after reference year {reference_year}")]
    BirthYearInFuture { birth_year: i32, reference_year: i32 },

    #[error("sample size must be greater than zero")]
    EmptySample,

    #[error("observation period must be at least one day")]
    EmptyPeriod,

    #[error("{0} cannot be negative")]
    Negative(&'static str),

    #[error("{method} check requires {field}")]
    MissingField {
        method: &'static str,
        field: &'static str,
    },

    #[error("{0} is too close to the end of the calendar")]
    DateOutOfRange(NaiveDate),
}
