//! Support ticket and validation tests
//!
//! Property-based and unit tests for:
//! - Ticket status transitions
//! - Dropdown key and coordinate validation
//! - Honey moisture checks

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::models::TicketStatus;
use shared::validation::{
    is_extractable_moisture, validate_coordinates, validate_dropdown_key, validate_email,
    validate_moisture_content,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn status_strategy() -> impl Strategy<Value = TicketStatus> {
    prop_oneof![
        Just(TicketStatus::Open),
        Just(TicketStatus::InProgress),
        Just(TicketStatus::Resolved),
        Just(TicketStatus::Closed),
    ]
}

/// Lowercase snake_case keys such as `hive_type` or `feed_kind2`
fn dropdown_key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{1,10}(_[a-z0-9]{1,10}){0,3}"
}

fn coordinate_strategy() -> impl Strategy<Value = (Decimal, Decimal)> {
    (-90_000_000i64..=90_000_000, -180_000_000i64..=180_000_000)
        .prop_map(|(lat, lon)| (Decimal::new(lat, 6), Decimal::new(lon, 6)))
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Keeping the current status is always allowed
    #[test]
    fn test_same_status_allowed(status in status_strategy()) {
        prop_assert!(status.can_transition_to(status));
    }

    /// A closed ticket can only be reopened
    #[test]
    fn test_closed_only_reopens(next in status_strategy()) {
        let allowed = TicketStatus::Closed.can_transition_to(next);
        prop_assert_eq!(
            allowed,
            matches!(next, TicketStatus::Open | TicketStatus::Closed)
        );
    }

    /// Every status can reach closed
    #[test]
    fn test_any_status_can_close(status in status_strategy()) {
        prop_assert!(status.can_transition_to(TicketStatus::Closed));
    }

    /// Well-formed keys pass validation
    #[test]
    fn test_valid_dropdown_keys(key in dropdown_key_strategy()) {
        prop_assert!(validate_dropdown_key(&key).is_ok(), "{} should be valid", key);
    }

    /// Keys with uppercase letters are rejected
    #[test]
    fn test_uppercase_keys_rejected(key in "[A-Z]{2,10}") {
        prop_assert!(validate_dropdown_key(&key).is_err());
    }

    /// Coordinates on the globe are accepted as a pair
    #[test]
    fn test_coordinates_in_range((lat, lon) in coordinate_strategy()) {
        prop_assert!(validate_coordinates(Some(lat), Some(lon)).is_ok());
        prop_assert!(validate_coordinates(Some(lat), None).is_err());
    }

    /// Extractable honey is always a valid moisture reading
    #[test]
    fn test_extractable_moisture_is_valid(tenths in 0i64..=1000) {
        let moisture = Decimal::new(tenths, 1);
        if is_extractable_moisture(moisture) {
            prop_assert!(validate_moisture_content(moisture).is_ok());
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod ticket_tests {
    use super::*;

    #[test]
    fn test_resolved_cannot_go_back_to_in_progress() {
        assert!(!TicketStatus::Resolved.can_transition_to(TicketStatus::InProgress));
        assert!(TicketStatus::Resolved.can_transition_to(TicketStatus::Open));
    }

    #[test]
    fn test_open_states() {
        assert!(TicketStatus::Open.is_open());
        assert!(TicketStatus::InProgress.is_open());
        assert!(!TicketStatus::Resolved.is_open());
        assert!(!TicketStatus::Closed.is_open());
    }
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    #[test]
    fn test_out_of_range_coordinates() {
        assert!(validate_coordinates(Some(Decimal::from(91)), Some(Decimal::ZERO)).is_err());
        assert!(validate_coordinates(Some(Decimal::ZERO), Some(Decimal::from(-181))).is_err());
        assert!(validate_coordinates(None, None).is_ok());
    }

    #[test]
    fn test_moisture_threshold() {
        assert!(is_extractable_moisture(Decimal::new(186, 1)));
        assert!(!is_extractable_moisture(Decimal::new(187, 1)));
    }

    #[test]
    fn test_email_format() {
        assert!(validate_email("keeper@example.org").is_ok());
        assert!(validate_email("keeper@localhost").is_err());
        assert!(validate_email("@example.org").is_err());
    }

    #[test]
    fn test_dropdown_key_edges() {
        assert!(validate_dropdown_key("a").is_err());
        assert!(validate_dropdown_key("_hive").is_err());
        assert!(validate_dropdown_key("hive_").is_err());
        assert!(validate_dropdown_key("hive type").is_err());
    }
}
