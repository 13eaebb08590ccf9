//! Queen rearing (QueenCraft) batch models

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CalculationError;

/// Days after grafting at which each rearing step falls
pub const DAYS_TO_CAPPED: i64 = 5;
pub const DAYS_TO_MATING_NUCS: i64 = 10;
pub const DAYS_TO_EMERGENCE: i64 = 12;
pub const DAYS_TO_MATING_CHECK: i64 = 19;
pub const DAYS_TO_LAYING_CHECK: i64 = 26;

/// Key dates for a batch, derived from its graft date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RearingTimeline {
    pub grafted_on: NaiveDate,
    pub cells_capped_on: NaiveDate,
    pub move_to_mating_nucs_on: NaiveDate,
    pub emergence_on: NaiveDate,
    pub mating_check_on: NaiveDate,
    pub laying_check_on: NaiveDate,
}

impl RearingTimeline {
    /// The next step on or after `today`, if the batch is not finished
    pub fn next_step(&self, today: NaiveDate) -> Option<(&'static str, NaiveDate)> {
        [
            ("cells_capped", self.cells_capped_on),
            ("move_to_mating_nucs", self.move_to_mating_nucs_on),
            ("emergence", self.emergence_on),
            ("mating_check", self.mating_check_on),
            ("laying_check", self.laying_check_on),
        ]
        .into_iter()
        .find(|(_, on)| *on >= today)
    }
}

/// Build the rearing calendar for a graft date
///
/// Fails when a step would fall past the last representable date.
pub fn rearing_timeline(grafted_on: NaiveDate) -> Result<RearingTimeline, CalculationError> {
    let after = |days: i64| {
        grafted_on
            .checked_add_signed(Duration::days(days))
            .ok_or(CalculationError::DateOutOfRange(grafted_on))
    };
    Ok(RearingTimeline {
        grafted_on,
        cells_capped_on: after(DAYS_TO_CAPPED)?,
        move_to_mating_nucs_on: after(DAYS_TO_MATING_NUCS)?,
        emergence_on: after(DAYS_TO_EMERGENCE)?,
        mating_check_on: after(DAYS_TO_MATING_CHECK)?,
        laying_check_on: after(DAYS_TO_LAYING_CHECK)?,
    })
}

/// Percentage of `numerator` over `denominator`, rounded to two places
pub fn success_rate(numerator: i32, denominator: i32) -> Option<Decimal> {
    if denominator <= 0 || numerator < 0 {
        return None;
    }
    Some((Decimal::from(numerator) * Decimal::ONE_HUNDRED / Decimal::from(denominator)).round_dp(2))
}

/// Cell counts recorded as a batch progresses
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RearingCounts {
    pub cells_grafted: i32,
    pub cells_accepted: Option<i32>,
    pub cells_capped: Option<i32>,
    pub queens_emerged: Option<i32>,
    pub queens_mated: Option<i32>,
}

/// Success rates of each stage against the one before it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RearingRates {
    pub acceptance_rate: Option<Decimal>,
    pub emergence_rate: Option<Decimal>,
    pub mating_rate: Option<Decimal>,
    /// Mated queens per grafted cell
    pub overall_rate: Option<Decimal>,
}

impl RearingCounts {
    /// Each stage can only keep or lose cells
    pub fn check_progression(&self) -> Result<(), &'static str> {
        if self.cells_grafted < 0 {
            return Err("Grafted cell count cannot be negative");
        }
        let stages = [
            self.cells_accepted,
            self.cells_capped,
            self.queens_emerged,
            self.queens_mated,
        ];
        let mut previous = self.cells_grafted;
        for stage in stages.into_iter().flatten() {
            if stage < 0 {
                return Err("Cell counts cannot be negative");
            }
            if stage > previous {
                return Err("A rearing stage cannot exceed the stage before it");
            }
            previous = stage;
        }
        Ok(())
    }

    pub fn rates(&self) -> RearingRates {
        let rate = |num: Option<i32>, den: Option<i32>| match (num, den) {
            (Some(n), Some(d)) => success_rate(n, d),
            _ => None,
        };
        RearingRates {
            acceptance_rate: rate(self.cells_accepted, Some(self.cells_grafted)),
            emergence_rate: rate(self.queens_emerged, self.cells_capped.or(self.cells_accepted)),
            mating_rate: rate(self.queens_mated, self.queens_emerged),
            overall_rate: rate(self.queens_mated, Some(self.cells_grafted)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_timeline_offsets() {
        let timeline = rearing_timeline(date(2024, 5, 25)).unwrap();
        assert_eq!(timeline.cells_capped_on, date(2024, 5, 30));
        assert_eq!(timeline.move_to_mating_nucs_on, date(2024, 6, 4));
        assert_eq!(timeline.emergence_on, date(2024, 6, 6));
        assert_eq!(timeline.mating_check_on, date(2024, 6, 13));
        assert_eq!(timeline.laying_check_on, date(2024, 6, 20));
    }

    #[test]
    fn test_next_step() {
        let timeline = rearing_timeline(date(2024, 5, 25)).unwrap();
        assert_eq!(timeline.next_step(date(2024, 5, 25)), Some(("cells_capped", date(2024, 5, 30))));
        assert_eq!(timeline.next_step(date(2024, 6, 6)), Some(("emergence", date(2024, 6, 6))));
        assert_eq!(timeline.next_step(date(2024, 7, 1)), None);
    }

    #[test]
    fn test_timeline_near_end_of_calendar() {
        let late = NaiveDate::MAX - Duration::days(DAYS_TO_LAYING_CHECK - 1);
        assert_eq!(
            rearing_timeline(late),
            Err(CalculationError::DateOutOfRange(late))
        );
        assert!(rearing_timeline(NaiveDate::MAX - Duration::days(DAYS_TO_LAYING_CHECK)).is_ok());
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(success_rate(15, 20), Some(Decimal::from(75)));
        assert_eq!(success_rate(0, 20), Some(Decimal::ZERO));
        assert_eq!(success_rate(3, 0), None);
    }

    #[test]
    fn test_progression_rejects_growth() {
        let counts = RearingCounts {
            cells_grafted: 20,
            cells_accepted: Some(15),
            cells_capped: Some(16),
            ..Default::default()
        };
        assert!(counts.check_progression().is_err());
    }

    #[test]
    fn test_progression_skips_unrecorded_stages() {
        let counts = RearingCounts {
            cells_grafted: 20,
            cells_accepted: Some(15),
            cells_capped: None,
            queens_emerged: Some(12),
            queens_mated: Some(9),
        };
        assert!(counts.check_progression().is_ok());

        let rates = counts.rates();
        assert_eq!(rates.acceptance_rate, Some(Decimal::from(75)));
        assert_eq!(rates.emergence_rate, Some(Decimal::from(80)));
        assert_eq!(rates.mating_rate, Some(Decimal::from(75)));
        assert_eq!(rates.overall_rate, Some(Decimal::new(4500, 2)));
    }
}
