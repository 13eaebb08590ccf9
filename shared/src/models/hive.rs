//! Hive and feeding models

use serde::{Deserialize, Serialize};

/// Whether a colony is still being managed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HiveStatus {
    #[default]
    Active,
    Dead,
    Merged,
    Sold,
}

impl HiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HiveStatus::Active => "active",
            HiveStatus::Dead => "dead",
            HiveStatus::Merged => "merged",
            HiveStatus::Sold => "sold",
        }
    }
}

impl std::fmt::Display for HiveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HiveStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(HiveStatus::Active),
            "dead" => Ok(HiveStatus::Dead),
            "merged" => Ok(HiveStatus::Merged),
            "sold" => Ok(HiveStatus::Sold),
            other => Err(format!("unknown hive status '{}'", other)),
        }
    }
}

/// Unit a feeding amount is recorded in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedUnit {
    /// Kilograms (fondant, candy, pollen patties)
    #[default]
    Kg,
    /// Litres (syrup)
    L,
}

impl FeedUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedUnit::Kg => "kg",
            FeedUnit::L => "l",
        }
    }
}

impl std::fmt::Display for FeedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FeedUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kg" => Ok(FeedUnit::Kg),
            "l" | "litre" | "liter" => Ok(FeedUnit::L),
            other => Err(format!("unknown feed unit '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_unit_accepts_spelled_out_litres() {
        assert_eq!("Litre".parse::<FeedUnit>(), Ok(FeedUnit::L));
        assert_eq!("liter".parse::<FeedUnit>(), Ok(FeedUnit::L));
        assert!("gallon".parse::<FeedUnit>().is_err());
    }

    #[test]
    fn test_hive_status_rejects_unknown() {
        assert!("swarmed".parse::<HiveStatus>().is_err());
        assert_eq!("merged".parse::<HiveStatus>(), Ok(HiveStatus::Merged));
    }

    #[test]
    fn test_display_uses_stored_names() {
        assert_eq!(HiveStatus::Merged.to_string(), "merged");
        assert_eq!(format!("{} {}", 12, FeedUnit::L), "12 l");
    }
}
