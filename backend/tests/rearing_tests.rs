//! Queen rearing tests
//!
//! Property-based and unit tests for:
//! - Timeline ordering from the graft date
//! - Next-step lookup
//! - Stage progression and success rates

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::models::{rearing_timeline, success_rate, RearingCounts, DAYS_TO_LAYING_CHECK};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn graft_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..3650).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(offset)
    })
}

/// Counts where every stage keeps or loses cells
fn progressing_counts_strategy() -> impl Strategy<Value = RearingCounts> {
    (1i32..120)
        .prop_flat_map(|grafted| (Just(grafted), 0..=grafted))
        .prop_flat_map(|(grafted, accepted)| (Just(grafted), Just(accepted), 0..=accepted))
        .prop_flat_map(|(grafted, accepted, capped)| {
            (Just(grafted), Just(accepted), Just(capped), 0..=capped)
        })
        .prop_flat_map(|(grafted, accepted, capped, emerged)| {
            (Just(grafted), Just(accepted), Just(capped), Just(emerged), 0..=emerged)
        })
        .prop_map(|(grafted, accepted, capped, emerged, mated)| RearingCounts {
            cells_grafted: grafted,
            cells_accepted: Some(accepted),
            cells_capped: Some(capped),
            queens_emerged: Some(emerged),
            queens_mated: Some(mated),
        })
}

fn in_percent_range(rate: Option<Decimal>) -> bool {
    rate.map_or(true, |r| r >= Decimal::ZERO && r <= Decimal::ONE_HUNDRED)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Steps follow the graft in strict order
    #[test]
    fn test_timeline_strictly_ordered(grafted in graft_date_strategy()) {
        let t = rearing_timeline(grafted).unwrap();
        prop_assert!(t.grafted_on < t.cells_capped_on);
        prop_assert!(t.cells_capped_on < t.move_to_mating_nucs_on);
        prop_assert!(t.move_to_mating_nucs_on < t.emergence_on);
        prop_assert!(t.emergence_on < t.mating_check_on);
        prop_assert!(t.mating_check_on < t.laying_check_on);
    }

    /// The next step is never in the past, and none remain after the laying check
    #[test]
    fn test_next_step_not_in_past(grafted in graft_date_strategy(), elapsed in 0i64..40) {
        let t = rearing_timeline(grafted).unwrap();
        let today = grafted + Duration::days(elapsed);
        match t.next_step(today) {
            Some((_, due_on)) => prop_assert!(due_on >= today),
            None => prop_assert!(elapsed > DAYS_TO_LAYING_CHECK),
        }
    }

    /// Graft dates within the last four weeks of the calendar have no timeline
    #[test]
    fn test_graft_near_calendar_end_rejected(back in 0i64..DAYS_TO_LAYING_CHECK) {
        let grafted = NaiveDate::MAX - Duration::days(back);
        prop_assert!(rearing_timeline(grafted).is_err());
    }

    /// Counts that only shrink are accepted and yield percentage rates
    #[test]
    fn test_progressing_counts_accepted(counts in progressing_counts_strategy()) {
        prop_assert!(counts.check_progression().is_ok());
        let rates = counts.rates();
        prop_assert!(in_percent_range(rates.acceptance_rate));
        prop_assert!(in_percent_range(rates.emergence_rate));
        prop_assert!(in_percent_range(rates.mating_rate));
        prop_assert!(in_percent_range(rates.overall_rate));
    }

    /// A stage larger than the one before it is rejected
    #[test]
    fn test_growing_stage_rejected(grafted in 0i32..100, extra in 1i32..20) {
        let counts = RearingCounts {
            cells_grafted: grafted,
            cells_accepted: Some(grafted + extra),
            ..Default::default()
        };
        prop_assert!(counts.check_progression().is_err());
    }

    /// Success rate of a part over a whole is a percentage
    #[test]
    fn test_success_rate_bounds((part, whole) in (1i32..1000).prop_flat_map(|w| (0..=w, Just(w)))) {
        let rate = success_rate(part, whole).unwrap();
        prop_assert!(rate >= Decimal::ZERO && rate <= Decimal::ONE_HUNDRED);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod rate_tests {
    use super::*;

    #[test]
    fn test_no_attempts_has_no_rate() {
        assert_eq!(success_rate(0, 0), None);
        assert_eq!(success_rate(3, -1), None);
    }

    #[test]
    fn test_partial_batch_rates() {
        let counts = RearingCounts {
            cells_grafted: 30,
            cells_accepted: Some(24),
            cells_capped: None,
            queens_emerged: None,
            queens_mated: None,
        };
        let rates = counts.rates();
        assert_eq!(rates.acceptance_rate, Some(Decimal::from(80)));
        assert_eq!(rates.emergence_rate, None);
        assert_eq!(rates.overall_rate, None);
    }

    #[test]
    fn test_emergence_falls_back_to_accepted() {
        let counts = RearingCounts {
            cells_grafted: 20,
            cells_accepted: Some(10),
            cells_capped: None,
            queens_emerged: Some(5),
            queens_mated: None,
        };
        assert_eq!(counts.rates().emergence_rate, Some(Decimal::from(50)));
    }
}
