//! Queen record tests
//!
//! Property-based and unit tests for:
//! - Marking colour cycle
//! - Queen age and replacement
//! - Birth year validation

use proptest::prelude::*;
use shared::models::{
    is_due_for_replacement, marking_color, queen_age, MarkingColor, QueenProfile,
    QUEEN_REPLACEMENT_AGE_YEARS,
};
use shared::validation::{validate_birth_year, MIN_BIRTH_YEAR};

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Birth years a beekeeper might plausibly record
fn birth_year_strategy() -> impl Strategy<Value = i32> {
    MIN_BIRTH_YEAR..2100
}

/// Colour for the last digit of a year, written out as the lookup table
fn last_digit_color(year: i32) -> MarkingColor {
    match year.rem_euclid(10) {
        1 | 6 => MarkingColor::White,
        2 | 7 => MarkingColor::Yellow,
        3 | 8 => MarkingColor::Red,
        4 | 9 => MarkingColor::Green,
        _ => MarkingColor::Blue,
    }
}

/// A birth year together with a reference year on or after it
fn birth_and_reference_strategy() -> impl Strategy<Value = (i32, i32)> {
    birth_year_strategy().prop_flat_map(|birth| (Just(birth), birth..birth + 30))
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// The marking colour repeats every five years
    #[test]
    fn test_marking_color_has_five_year_cycle(year in -5000i32..5000) {
        prop_assert_eq!(marking_color(year), marking_color(year + 5));
    }

    /// Five consecutive years use five different colours
    #[test]
    fn test_consecutive_years_use_distinct_colors(start in birth_year_strategy()) {
        let colors: std::collections::HashSet<MarkingColor> =
            (start..start + 5).map(marking_color).collect();
        prop_assert_eq!(colors.len(), 5);
    }

    /// Age is never negative for a birth year not in the future
    #[test]
    fn test_age_non_negative((birth, reference) in birth_and_reference_strategy()) {
        let age = queen_age(birth, reference);
        prop_assert_eq!(age, Ok(reference - birth));
    }

    /// A birth year after the reference year has no age
    #[test]
    fn test_future_birth_year_rejected(birth in birth_year_strategy(), ahead in 1i32..50) {
        prop_assert!(queen_age(birth + ahead, birth).is_err());
        prop_assert!(validate_birth_year(birth + ahead, birth).is_err());
    }

    /// The profile flags replacement exactly from the replacement age on
    #[test]
    fn test_profile_replacement_flag((birth, reference) in birth_and_reference_strategy()) {
        let profile = QueenProfile::describe(birth, reference);
        let age = reference - birth;
        prop_assert_eq!(profile.age_years, Some(age));
        prop_assert_eq!(profile.due_for_replacement, age >= QUEEN_REPLACEMENT_AGE_YEARS);
        prop_assert_eq!(profile.marking_color, marking_color(birth));
    }

    /// Queens recorded ahead of the reference year still get the table colour
    #[test]
    fn test_future_birth_year_colour_follows_last_digit(
        reference in birth_year_strategy(),
        ahead in 1i32..50,
    ) {
        let birth = reference + ahead;
        let profile = QueenProfile::describe(birth, reference);
        prop_assert_eq!(profile.age_years, None);
        prop_assert_eq!(profile.marking_color, last_digit_color(birth));
    }

    /// The colour cycle matches the last-digit table for any year
    #[test]
    fn test_marking_color_matches_last_digit(year in -5000i32..5000) {
        prop_assert_eq!(marking_color(year), last_digit_color(year));
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod marking_tests {
    use super::*;

    #[test]
    fn test_international_colour_code() {
        assert_eq!(marking_color(2021), MarkingColor::White);
        assert_eq!(marking_color(2022), MarkingColor::Yellow);
        assert_eq!(marking_color(2023), MarkingColor::Red);
        assert_eq!(marking_color(2024), MarkingColor::Green);
        assert_eq!(marking_color(2025), MarkingColor::Blue);
        assert_eq!(marking_color(2026), MarkingColor::White);
    }

    #[test]
    fn test_future_queen_profile_keeps_colour() {
        let profile = QueenProfile::describe(2027, 2026);
        assert_eq!(profile.age_years, None);
        assert!(!profile.due_for_replacement);
        assert_eq!(profile.marking_color, MarkingColor::Yellow);
    }
}

#[cfg(test)]
mod replacement_tests {
    use super::*;

    #[test]
    fn test_replacement_threshold() {
        assert!(!is_due_for_replacement(0));
        assert!(!is_due_for_replacement(1));
        assert!(is_due_for_replacement(2));
        assert!(is_due_for_replacement(5));
    }

    #[test]
    fn test_birth_year_bounds() {
        assert!(validate_birth_year(MIN_BIRTH_YEAR, 2026).is_ok());
        assert!(validate_birth_year(MIN_BIRTH_YEAR - 1, 2026).is_err());
        assert!(validate_birth_year(2026, 2026).is_ok());
    }
}
