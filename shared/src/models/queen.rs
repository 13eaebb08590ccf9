//! Queen models and birth-year calculations

use serde::{Deserialize, Serialize};

use crate::error::CalculationError;

/// Age in years at which a queen is normally replaced
pub const QUEEN_REPLACEMENT_AGE_YEARS: i32 = 2;

/// Lifecycle status of a tracked queen
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueenStatus {
    #[default]
    Active,
    Superseded,
    Dead,
    Sold,
}

impl QueenStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueenStatus::Active => "active",
            QueenStatus::Superseded => "superseded",
            QueenStatus::Dead => "dead",
            QueenStatus::Sold => "sold",
        }
    }
}

impl std::fmt::Display for QueenStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QueenStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(QueenStatus::Active),
            "superseded" => Ok(QueenStatus::Superseded),
            "dead" => Ok(QueenStatus::Dead),
            "sold" => Ok(QueenStatus::Sold),
            other => Err(format!("unknown queen status '{}'", other)),
        }
    }
}

/// International queen marking colour
///
/// The colour cycles every five years and is chosen by the last digit
/// of the year the queen emerged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MarkingColor {
    /// Years ending in 1 or 6
    White,
    /// Years ending in 2 or 7
    Yellow,
    /// Years ending in 3 or 8
    Red,
    /// Years ending in 4 or 9
    Green,
    /// Years ending in 5 or 0
    Blue,
}

impl MarkingColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkingColor::White => "white",
            MarkingColor::Yellow => "yellow",
            MarkingColor::Red => "red",
            MarkingColor::Green => "green",
            MarkingColor::Blue => "blue",
        }
    }

    /// CSS colour used by the forms to render the marking dot
    pub fn hex(&self) -> &'static str {
        match self {
            MarkingColor::White => "#ffffff",
            MarkingColor::Yellow => "#f5d000",
            MarkingColor::Red => "#d62828",
            MarkingColor::Green => "#2a9d3f",
            MarkingColor::Blue => "#1d4ed8",
        }
    }
}

impl std::fmt::Display for MarkingColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkingColor::White => write!(f, "White"),
            MarkingColor::Yellow => write!(f, "Yellow"),
            MarkingColor::Red => write!(f, "Red"),
            MarkingColor::Green => write!(f, "Green"),
            MarkingColor::Blue => write!(f, "Blue"),
        }
    }
}

impl std::str::FromStr for MarkingColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" => Ok(MarkingColor::White),
            "yellow" => Ok(MarkingColor::Yellow),
            "red" => Ok(MarkingColor::Red),
            "green" => Ok(MarkingColor::Green),
            "blue" => Ok(MarkingColor::Blue),
            other => Err(format!("unknown marking colour '{}'", other)),
        }
    }
}

/// Marking colour for a queen born in `birth_year`
pub fn marking_color(birth_year: i32) -> MarkingColor {
    match birth_year.rem_euclid(5) {
        1 => MarkingColor::White,
        2 => MarkingColor::Yellow,
        3 => MarkingColor::Red,
        4 => MarkingColor::Green,
        _ => MarkingColor::Blue,
    }
}

/// Whole years between the birth year and the reference year
pub fn queen_age(birth_year: i32, reference_year: i32) -> Result<i32, CalculationError> {
    if birth_year > reference_year {
        return Err(CalculationError::BirthYearInFuture {
            birth_year,
            reference_year,
        });
    }
    Ok(reference_year - birth_year)
}

/// Queens at or past the replacement age should be requeened
pub fn is_due_for_replacement(age_years: i32) -> bool {
    age_years >= QUEEN_REPLACEMENT_AGE_YEARS
}

/// Derived facts shown next to a queen record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueenProfile {
    pub age_years: Option<i32>,
    pub marking_color: MarkingColor,
    pub due_for_replacement: bool,
}

impl QueenProfile {
    /// Describe a queen as of `reference_year`
    ///
    /// A birth year recorded in the future still gets its colour but no age.
    pub fn describe(birth_year: i32, reference_year: i32) -> Self {
        let age_years = queen_age(birth_year, reference_year).ok();
        Self {
            age_years,
            marking_color: marking_color(birth_year),
            due_for_replacement: age_years.map(is_due_for_replacement).unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marking_color_by_last_digit() {
        assert_eq!(marking_color(2021), MarkingColor::White);
        assert_eq!(marking_color(2022), MarkingColor::Yellow);
        assert_eq!(marking_color(2023), MarkingColor::Red);
        assert_eq!(marking_color(2024), MarkingColor::Green);
        assert_eq!(marking_color(2025), MarkingColor::Blue);
        assert_eq!(marking_color(2026), MarkingColor::White);
        assert_eq!(marking_color(2030), MarkingColor::Blue);
    }

    #[test]
    fn test_marking_color_parses_display_name() {
        for color in [MarkingColor::White, MarkingColor::Yellow, MarkingColor::Blue] {
            assert_eq!(color.to_string().parse::<MarkingColor>(), Ok(color));
            assert_eq!(color.as_str().parse::<MarkingColor>(), Ok(color));
        }
        assert!("purple".parse::<MarkingColor>().is_err());
    }

    #[test]
    fn test_queen_status_display() {
        assert_eq!(QueenStatus::Superseded.to_string(), "superseded");
        assert_eq!("sold".parse::<QueenStatus>(), Ok(QueenStatus::Sold));
    }

    #[test]
    fn test_queen_age() {
        assert_eq!(queen_age(2024, 2026), Ok(2));
        assert_eq!(queen_age(2026, 2026), Ok(0));
        assert_eq!(
            queen_age(2027, 2026),
            Err(CalculationError::BirthYearInFuture {
                birth_year: 2027,
                reference_year: 2026
            })
        );
    }

    #[test]
    fn test_replacement_age() {
        assert!(!is_due_for_replacement(0));
        assert!(!is_due_for_replacement(1));
        assert!(is_due_for_replacement(2));
        assert!(is_due_for_replacement(4));
    }

    #[test]
    fn test_profile_for_future_birth_year() {
        let profile = QueenProfile::describe(2030, 2026);
        assert_eq!(profile.age_years, None);
        assert_eq!(profile.marking_color, MarkingColor::Blue);
        assert!(!profile.due_for_replacement);
    }
}
