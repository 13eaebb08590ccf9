//! Hive inspection models and date-range aggregation

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::DateRange;

/// Lowest value of a 1-5 inspection rating
pub const MIN_RATING: i32 = 1;
/// Highest value of a 1-5 inspection rating
pub const MAX_RATING: i32 = 5;

/// The numeric parts of an inspection that can be averaged
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InspectionSample {
    pub inspected_on: NaiveDate,
    /// Colony temperament, 1 (aggressive) to 5 (calm)
    pub temperament: Option<i32>,
    /// Brood pattern, 1 (spotty) to 5 (solid)
    pub brood_pattern: Option<i32>,
    pub frames_of_bees: Option<i32>,
    pub frames_of_brood: Option<i32>,
    pub honey_frames: Option<i32>,
    pub queen_seen: bool,
}

/// Averages over the inspections in a date range
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InspectionAverages {
    pub range: DateRange,
    pub inspection_count: u32,
    pub first_inspection: Option<NaiveDate>,
    pub last_inspection: Option<NaiveDate>,
    pub avg_temperament: Option<Decimal>,
    pub avg_brood_pattern: Option<Decimal>,
    pub avg_frames_of_bees: Option<Decimal>,
    pub avg_frames_of_brood: Option<Decimal>,
    pub avg_honey_frames: Option<Decimal>,
    /// Share of inspections where the queen was seen, in percent
    pub queen_seen_percent: Option<Decimal>,
}

#[derive(Default)]
struct Mean {
    sum: i64,
    count: i64,
}

impl Mean {
    fn push(&mut self, value: Option<i32>) {
        if let Some(v) = value {
            self.sum += i64::from(v);
            self.count += 1;
        }
    }

    fn value(&self) -> Option<Decimal> {
        if self.count == 0 {
            return None;
        }
        Some((Decimal::from(self.sum) / Decimal::from(self.count)).round_dp(2))
    }
}

/// Average each inspection field over the samples inside `range`
///
/// Missing values are skipped per field, so a field nobody recorded
/// averages to `None` rather than zero.
pub fn inspection_averages<'a, I>(samples: I, range: DateRange) -> InspectionAverages
where
    I: IntoIterator<Item = &'a InspectionSample>,
{
    let mut count: u32 = 0;
    let mut queen_seen: u32 = 0;
    let mut first: Option<NaiveDate> = None;
    let mut last: Option<NaiveDate> = None;
    let mut temperament = Mean::default();
    let mut brood_pattern = Mean::default();
    let mut frames_of_bees = Mean::default();
    let mut frames_of_brood = Mean::default();
    let mut honey_frames = Mean::default();

    for sample in samples.into_iter().filter(|s| range.contains(s.inspected_on)) {
        count += 1;
        if sample.queen_seen {
            queen_seen += 1;
        }
        first = Some(first.map_or(sample.inspected_on, |d| d.min(sample.inspected_on)));
        last = Some(last.map_or(sample.inspected_on, |d| d.max(sample.inspected_on)));
        temperament.push(sample.temperament);
        brood_pattern.push(sample.brood_pattern);
        frames_of_bees.push(sample.frames_of_bees);
        frames_of_brood.push(sample.frames_of_brood);
        honey_frames.push(sample.honey_frames);
    }

    let queen_seen_percent = if count > 0 {
        Some((Decimal::from(queen_seen) * Decimal::ONE_HUNDRED / Decimal::from(count)).round_dp(2))
    } else {
        None
    };

    InspectionAverages {
        range,
        inspection_count: count,
        first_inspection: first,
        last_inspection: last,
        avg_temperament: temperament.value(),
        avg_brood_pattern: brood_pattern.value(),
        avg_frames_of_bees: frames_of_bees.value(),
        avg_frames_of_brood: frames_of_brood.value(),
        avg_honey_frames: honey_frames.value(),
        queen_seen_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample(day: u32, temperament: Option<i32>, bees: Option<i32>, queen_seen: bool) -> InspectionSample {
        InspectionSample {
            inspected_on: date(2024, 6, day),
            temperament,
            brood_pattern: None,
            frames_of_bees: bees,
            frames_of_brood: None,
            honey_frames: None,
            queen_seen,
        }
    }

    #[test]
    fn test_averages_skip_missing_values() {
        let samples = vec![
            sample(1, Some(4), Some(8), true),
            sample(8, None, Some(10), false),
            sample(15, Some(3), None, true),
        ];
        let averages = inspection_averages(&samples, DateRange::unbounded());

        assert_eq!(averages.inspection_count, 3);
        assert_eq!(averages.avg_temperament, Some(Decimal::new(350, 2)));
        assert_eq!(averages.avg_frames_of_bees, Some(Decimal::from(9)));
        assert_eq!(averages.avg_brood_pattern, None);
        assert_eq!(averages.queen_seen_percent, Some(Decimal::new(6667, 2)));
        assert_eq!(averages.first_inspection, Some(date(2024, 6, 1)));
        assert_eq!(averages.last_inspection, Some(date(2024, 6, 15)));
    }

    #[test]
    fn test_averages_respect_range_bounds() {
        let samples = vec![
            sample(1, Some(1), None, false),
            sample(8, Some(5), None, false),
            sample(15, Some(3), None, false),
        ];
        let range = DateRange::new(Some(date(2024, 6, 8)), Some(date(2024, 6, 15)));
        let averages = inspection_averages(&samples, range);

        assert_eq!(averages.inspection_count, 2);
        assert_eq!(averages.avg_temperament, Some(Decimal::from(4)));
    }

    #[test]
    fn test_empty_range_yields_no_averages() {
        let samples = vec![sample(1, Some(3), Some(5), true)];
        let range = DateRange::new(Some(date(2025, 1, 1)), None);
        let averages = inspection_averages(&samples, range);

        assert_eq!(averages.inspection_count, 0);
        assert_eq!(averages.avg_temperament, None);
        assert_eq!(averages.queen_seen_percent, None);
        assert_eq!(averages.first_inspection, None);
    }
}
