//! Validation utilities for the Apiary Records Platform
//!
//! Range and format checks applied before a record is written.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{MAX_RATING, MIN_RATING};

/// Earliest birth year accepted for a queen record
pub const MIN_BIRTH_YEAR: i32 = 1900;

/// Honey above this moisture percentage is at risk of fermenting
pub const MAX_EXTRACTABLE_MOISTURE: Decimal = Decimal::from_parts(186, 0, 0, false, 1);

// ============================================================================
// Colony Record Validations
// ============================================================================

/// Validate a 1-5 inspection rating
pub fn validate_rating(rating: i32) -> Result<(), &'static str> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err("Rating must be between 1 and 5");
    }
    Ok(())
}

/// Validate a frame, mite or cell count
pub fn validate_count(count: i32) -> Result<(), &'static str> {
    if count < 0 {
        return Err("Count cannot be negative");
    }
    Ok(())
}

/// Validate a weight or volume
pub fn validate_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity < Decimal::ZERO {
        return Err("Quantity cannot be negative");
    }
    Ok(())
}

/// Validate honey moisture content is a percentage
pub fn validate_moisture_content(moisture: Decimal) -> Result<(), &'static str> {
    if moisture < Decimal::ZERO || moisture > Decimal::ONE_HUNDRED {
        return Err("Moisture content must be between 0 and 100%");
    }
    Ok(())
}

/// Check if honey is dry enough to extract and store
pub fn is_extractable_moisture(moisture: Decimal) -> bool {
    moisture >= Decimal::ZERO && moisture <= MAX_EXTRACTABLE_MOISTURE
}

/// Validate a queen birth year against the current year
pub fn validate_birth_year(birth_year: i32, reference_year: i32) -> Result<(), &'static str> {
    if birth_year < MIN_BIRTH_YEAR {
        return Err("Birth year is too far in the past");
    }
    if birth_year > reference_year {
        return Err("Birth year cannot be in the future");
    }
    Ok(())
}

/// Validate that an end date does not precede its start date
pub fn validate_date_order(start: NaiveDate, end: Option<NaiveDate>) -> Result<(), &'static str> {
    match end {
        Some(end) if end < start => Err("End date cannot be before start date"),
        _ => Ok(()),
    }
}

/// Validate GPS coordinates of an apiary
pub fn validate_coordinates(
    latitude: Option<Decimal>,
    longitude: Option<Decimal>,
) -> Result<(), &'static str> {
    if let Some(lat) = latitude {
        if lat < Decimal::from(-90) || lat > Decimal::from(90) {
            return Err("Latitude must be between -90 and 90");
        }
    }
    if let Some(lon) = longitude {
        if lon < Decimal::from(-180) || lon > Decimal::from(180) {
            return Err("Longitude must be between -180 and 180");
        }
    }
    if latitude.is_some() != longitude.is_some() {
        return Err("Latitude and longitude must be provided together");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format");
    };
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Invalid email format");
    }
    Ok(())
}

/// Validate a dropdown category key (lowercase snake_case, 2-50 chars)
pub fn validate_dropdown_key(key: &str) -> Result<(), &'static str> {
    if key.len() < 2 {
        return Err("Key must be at least 2 characters");
    }
    if key.len() > 50 {
        return Err("Key must be at most 50 characters");
    }
    if !key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
        return Err("Key must be lowercase letters, digits and underscores only");
    }
    if key.starts_with('_') || key.ends_with('_') {
        return Err("Key cannot start or end with an underscore");
    }
    Ok(())
}

/// Validate that a required text field is not blank
pub fn validate_required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Value cannot be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ========================================================================
    // Colony Record Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_rating() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn test_validate_count_and_quantity() {
        assert!(validate_count(0).is_ok());
        assert!(validate_count(-1).is_err());
        assert!(validate_quantity(Decimal::new(125, 1)).is_ok());
        assert!(validate_quantity(Decimal::new(-1, 1)).is_err());
    }

    #[test]
    fn test_moisture_content_validation() {
        assert!(validate_moisture_content(Decimal::from(17)).is_ok());
        assert!(validate_moisture_content(Decimal::from(101)).is_err());
        assert!(validate_moisture_content(Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_extractable_moisture() {
        assert!(is_extractable_moisture(Decimal::from(17)));
        assert!(is_extractable_moisture(Decimal::new(186, 1)));
        assert!(!is_extractable_moisture(Decimal::new(187, 1)));
        assert!(!is_extractable_moisture(Decimal::from(20)));
    }

    #[test]
    fn test_validate_birth_year() {
        assert!(validate_birth_year(2024, 2026).is_ok());
        assert!(validate_birth_year(2026, 2026).is_ok());
        assert!(validate_birth_year(2027, 2026).is_err());
        assert!(validate_birth_year(1850, 2026).is_err());
    }

    #[test]
    fn test_validate_date_order() {
        assert!(validate_date_order(date(2024, 8, 1), None).is_ok());
        assert!(validate_date_order(date(2024, 8, 1), Some(date(2024, 8, 1))).is_ok());
        assert!(validate_date_order(date(2024, 8, 2), Some(date(2024, 8, 1))).is_err());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(None, None).is_ok());
        assert!(validate_coordinates(Some(Decimal::new(5150, 2)), Some(Decimal::new(-12, 2))).is_ok());
        assert!(validate_coordinates(Some(Decimal::from(91)), Some(Decimal::ZERO)).is_err());
        assert!(validate_coordinates(Some(Decimal::ZERO), Some(Decimal::from(181))).is_err());
        assert!(validate_coordinates(Some(Decimal::ZERO), None).is_err());
    }

    // ========================================================================
    // General Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_email() {
        assert!(validate_email("keeper@example.com").is_ok());
        assert!(validate_email("first.last@bees.co.uk").is_ok());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_validate_dropdown_key() {
        assert!(validate_dropdown_key("feed_type").is_ok());
        assert!(validate_dropdown_key("hive_type2").is_ok());
        assert!(validate_dropdown_key("x").is_err());
        assert!(validate_dropdown_key("Feed Type").is_err());
        assert!(validate_dropdown_key("_feed").is_err());
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("Home yard").is_ok());
        assert!(validate_required("   ").is_err());
    }
}
