//! Varroa monitoring and treatment models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CalculationError;

/// Percentage below which a wash or roll count is considered low
pub const LOW_INFESTATION_PERCENT: Decimal = Decimal::ONE;
/// Percentage at which treatment is recommended
pub const TREATMENT_THRESHOLD_PERCENT: Decimal = Decimal::from_parts(3, 0, 0, false, 0);
/// Daily natural mite drop below which a sticky board is considered low
pub const LOW_DAILY_DROP: Decimal = Decimal::from_parts(5, 0, 0, false, 0);
/// Daily natural mite drop above which treatment is recommended
pub const HIGH_DAILY_DROP: Decimal = Decimal::TEN;

/// How mites were counted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VarroaMethod {
    /// Bees washed in alcohol, mites counted per sample
    AlcoholWash,
    /// Bees rolled in powdered sugar, mites counted per sample
    SugarRoll,
    /// Natural mite fall onto a board over a number of days
    StickyBoard,
}

impl VarroaMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarroaMethod::AlcoholWash => "alcohol_wash",
            VarroaMethod::SugarRoll => "sugar_roll",
            VarroaMethod::StickyBoard => "sticky_board",
        }
    }

    /// Whether the method samples a counted number of bees
    pub fn uses_bee_sample(&self) -> bool {
        !matches!(self, VarroaMethod::StickyBoard)
    }
}

impl std::fmt::Display for VarroaMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VarroaMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alcohol_wash" => Ok(VarroaMethod::AlcoholWash),
            "sugar_roll" => Ok(VarroaMethod::SugarRoll),
            "sticky_board" => Ok(VarroaMethod::StickyBoard),
            other => Err(format!("unknown varroa method '{}'", other)),
        }
    }
}

/// Infestation severity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum InfestationLevel {
    Low,
    Moderate,
    High,
}

impl InfestationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfestationLevel::Low => "low",
            InfestationLevel::Moderate => "moderate",
            InfestationLevel::High => "high",
        }
    }
}

impl std::str::FromStr for InfestationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(InfestationLevel::Low),
            "moderate" => Ok(InfestationLevel::Moderate),
            "high" => Ok(InfestationLevel::High),
            other => Err(format!("unknown infestation level '{}'", other)),
        }
    }
}

impl std::fmt::Display for InfestationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfestationLevel::Low => write!(f, "Low"),
            InfestationLevel::Moderate => write!(f, "Moderate"),
            InfestationLevel::High => write!(f, "High"),
        }
    }
}

/// Result of evaluating one varroa check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VarroaAssessment {
    /// Mites per 100 bees, for sample based methods
    pub infestation_rate: Option<Decimal>,
    /// Mites per day, for sticky boards
    pub daily_mite_drop: Option<Decimal>,
    pub level: InfestationLevel,
    pub treatment_recommended: bool,
}

/// Mites per hundred bees, rounded to two decimal places
pub fn infestation_rate(mite_count: i32, sample_size: i32) -> Result<Decimal, CalculationError> {
    if mite_count < 0 {
        return Err(CalculationError::Negative("mite count"));
    }
    if sample_size <= 0 {
        return Err(CalculationError::EmptySample);
    }
    Ok((Decimal::from(mite_count) * Decimal::ONE_HUNDRED / Decimal::from(sample_size)).round_dp(2))
}

/// Average natural mite fall per day, rounded to two decimal places
pub fn daily_mite_drop(mite_count: i32, days: i32) -> Result<Decimal, CalculationError> {
    if mite_count < 0 {
        return Err(CalculationError::Negative("mite count"));
    }
    if days <= 0 {
        return Err(CalculationError::EmptyPeriod);
    }
    Ok((Decimal::from(mite_count) / Decimal::from(days)).round_dp(2))
}

/// Severity of a wash or roll percentage
pub fn classify_infestation_rate(rate: Decimal) -> InfestationLevel {
    if rate < LOW_INFESTATION_PERCENT {
        InfestationLevel::Low
    } else if rate < TREATMENT_THRESHOLD_PERCENT {
        InfestationLevel::Moderate
    } else {
        InfestationLevel::High
    }
}

/// Severity of a sticky board daily drop
pub fn classify_daily_drop(drop: Decimal) -> InfestationLevel {
    if drop < LOW_DAILY_DROP {
        InfestationLevel::Low
    } else if drop <= HIGH_DAILY_DROP {
        InfestationLevel::Moderate
    } else {
        InfestationLevel::High
    }
}

/// Evaluate a check using the metric that matches its method
pub fn assess_varroa_check(
    method: VarroaMethod,
    mite_count: i32,
    sample_size: Option<i32>,
    days: Option<i32>,
) -> Result<VarroaAssessment, CalculationError> {
    if method.uses_bee_sample() {
        let sample_size = sample_size.ok_or(CalculationError::MissingField {
            method: method.as_str(),
            field: "sample_size",
        })?;
        let rate = infestation_rate(mite_count, sample_size)?;
        let level = classify_infestation_rate(rate);
        Ok(VarroaAssessment {
            infestation_rate: Some(rate),
            daily_mite_drop: None,
            level,
            treatment_recommended: level == InfestationLevel::High,
        })
    } else {
        let days = days.ok_or(CalculationError::MissingField {
            method: method.as_str(),
            field: "days",
        })?;
        let drop = daily_mite_drop(mite_count, days)?;
        let level = classify_daily_drop(drop);
        Ok(VarroaAssessment {
            infestation_rate: None,
            daily_mite_drop: Some(drop),
            level,
            treatment_recommended: level == InfestationLevel::High,
        })
    }
}

/// Days a treatment has been (or was) applied, counting both ends
///
/// An open-ended treatment is measured up to `today`.
pub fn treatment_duration_days(
    started_on: NaiveDate,
    ended_on: Option<NaiveDate>,
    today: NaiveDate,
) -> i64 {
    let end = ended_on.unwrap_or(today);
    if end < started_on {
        return 0;
    }
    (end - started_on).num_days() + 1
}

/// Whether a treatment is in place on `today`
pub fn is_treatment_active(started_on: NaiveDate, ended_on: Option<NaiveDate>, today: NaiveDate) -> bool {
    started_on <= today && ended_on.map_or(true, |end| end >= today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_infestation_level_names() {
        assert_eq!(InfestationLevel::Moderate.as_str(), "moderate");
        assert_eq!("High".parse::<InfestationLevel>(), Ok(InfestationLevel::High));
        assert_eq!(
            InfestationLevel::Low.to_string().parse::<InfestationLevel>(),
            Ok(InfestationLevel::Low)
        );
        assert!("severe".parse::<InfestationLevel>().is_err());
        assert_eq!(VarroaMethod::StickyBoard.to_string(), "sticky_board");
    }

    #[test]
    fn test_infestation_rate() {
        assert_eq!(infestation_rate(9, 300), Ok(Decimal::new(300, 2)));
        assert_eq!(infestation_rate(0, 300), Ok(Decimal::ZERO));
        assert_eq!(infestation_rate(1, 3), Ok(Decimal::new(3333, 2)));
    }

    #[test]
    fn test_infestation_rate_rejects_bad_input() {
        assert_eq!(infestation_rate(5, 0), Err(CalculationError::EmptySample));
        assert_eq!(
            infestation_rate(-1, 300),
            Err(CalculationError::Negative("mite count"))
        );
    }

    #[test]
    fn test_daily_drop() {
        assert_eq!(daily_mite_drop(21, 7), Ok(Decimal::from(3)));
        assert_eq!(daily_mite_drop(10, 3), Ok(Decimal::new(333, 2)));
        assert_eq!(daily_mite_drop(10, 0), Err(CalculationError::EmptyPeriod));
    }

    #[test]
    fn test_classification_thresholds() {
        assert_eq!(classify_infestation_rate(Decimal::new(99, 2)), InfestationLevel::Low);
        assert_eq!(classify_infestation_rate(Decimal::ONE), InfestationLevel::Moderate);
        assert_eq!(classify_infestation_rate(Decimal::new(299, 2)), InfestationLevel::Moderate);
        assert_eq!(classify_infestation_rate(Decimal::from(3)), InfestationLevel::High);

        assert_eq!(classify_daily_drop(Decimal::from(4)), InfestationLevel::Low);
        assert_eq!(classify_daily_drop(Decimal::from(10)), InfestationLevel::Moderate);
        assert_eq!(classify_daily_drop(Decimal::new(1001, 2)), InfestationLevel::High);
    }

    #[test]
    fn test_assess_alcohol_wash() {
        let assessment = assess_varroa_check(VarroaMethod::AlcoholWash, 12, Some(300), None).unwrap();
        assert_eq!(assessment.infestation_rate, Some(Decimal::from(4)));
        assert_eq!(assessment.daily_mite_drop, None);
        assert_eq!(assessment.level, InfestationLevel::High);
        assert!(assessment.treatment_recommended);
    }

    #[test]
    fn test_assess_sticky_board_needs_days() {
        let err = assess_varroa_check(VarroaMethod::StickyBoard, 12, Some(300), None).unwrap_err();
        assert_eq!(
            err,
            CalculationError::MissingField {
                method: "sticky_board",
                field: "days"
            }
        );

        let assessment = assess_varroa_check(VarroaMethod::StickyBoard, 14, None, Some(7)).unwrap();
        assert_eq!(assessment.daily_mite_drop, Some(Decimal::from(2)));
        assert_eq!(assessment.level, InfestationLevel::Low);
        assert!(!assessment.treatment_recommended);
    }

    #[test]
    fn test_treatment_duration() {
        let start = date(2024, 8, 1);
        assert_eq!(treatment_duration_days(start, Some(date(2024, 8, 28)), date(2024, 9, 30)), 28);
        assert_eq!(treatment_duration_days(start, None, date(2024, 8, 10)), 10);
        assert_eq!(treatment_duration_days(start, None, date(2024, 7, 1)), 0);
    }

    #[test]
    fn test_treatment_active() {
        let start = date(2024, 8, 1);
        assert!(is_treatment_active(start, None, date(2024, 8, 15)));
        assert!(is_treatment_active(start, Some(date(2024, 8, 15)), date(2024, 8, 15)));
        assert!(!is_treatment_active(start, Some(date(2024, 8, 14)), date(2024, 8, 15)));
        assert!(!is_treatment_active(start, None, date(2024, 7, 31)));
    }
}
