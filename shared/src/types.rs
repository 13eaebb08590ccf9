//! Common types used across the platform

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive date range for queries and aggregations
///
/// Either bound may be open. An open start means "since forever",
/// an open end means "up to and including today and beyond".
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Range with both bounds open
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Check whether a date falls within the range, bounds included
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }

    /// A range is valid when its end is not before its start
    pub fn is_valid(&self) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => end >= start,
            _ => true,
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
    fn test_contains_is_inclusive() {
        let range = DateRange::new(Some(date(2024, 5, 1)), Some(date(2024, 5, 31)));
        assert!(range.contains(date(2024, 5, 1)));
        assert!(range.contains(date(2024, 5, 31)));
        assert!(!range.contains(date(2024, 4, 30)));
        assert!(!range.contains(date(2024, 6, 1)));
    }

    #[test]
    fn test_open_bounds() {
        let since = DateRange::new(Some(date(2024, 5, 1)), None);
        assert!(since.contains(date(2030, 1, 1)));
        assert!(!since.contains(date(2024, 4, 1)));
        assert!(DateRange::unbounded().contains(date(1999, 1, 1)));
    }

    #[test]
    fn test_validity() {
        assert!(DateRange::new(Some(date(2024, 5, 1)), Some(date(2024, 5, 1))).is_valid());
        assert!(!DateRange::new(Some(date(2024, 5, 2)), Some(date(2024, 5, 1))).is_valid());
        assert!(DateRange::new(None, Some(date(2024, 5, 1))).is_valid());
    }
}
