//! WebAssembly module for the Apiary Records Platform
//!
//! Provides client-side computation for:
//! - Queen marking colours and ages
//! - Varroa infestation rates and assessments
//! - Inspection averages over a date range
//! - Queen rearing calendars
//! - Offline form validation

use chrono::NaiveDate;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("apiary-records wasm loaded"));
}

fn js_error(message: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&message.to_string())
}

fn parse_date(value: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| js_error(format!("Invalid date '{}': {}", value, e)))
}

fn to_f64(value: Decimal) -> f64 {
    value.to_string().parse().unwrap_or(0.0)
}

/// The browser's current calendar year
fn current_year() -> i32 {
    js_sys::Date::new_0().get_full_year() as i32
}

// ============================================================================
// Queens
// ============================================================================

/// Marking colour name for a birth year
#[wasm_bindgen]
pub fn queen_marking_color(birth_year: i32) -> String {
    marking_color(birth_year).to_string()
}

/// Hex swatch of the marking colour for a birth year
#[wasm_bindgen]
pub fn queen_marking_hex(birth_year: i32) -> String {
    marking_color(birth_year).hex().to_string()
}

/// Age of a queen as of a given year
#[wasm_bindgen]
pub fn queen_age_in(birth_year: i32, reference_year: i32) -> Result<i32, JsValue> {
    queen_age(birth_year, reference_year).map_err(js_error)
}

/// Age of a queen as of the current year
#[wasm_bindgen]
pub fn queen_age_now(birth_year: i32) -> Result<i32, JsValue> {
    queen_age_in(birth_year, current_year())
}

/// Whether a queen born in `birth_year` should be replaced this year
#[wasm_bindgen]
pub fn queen_due_for_replacement(birth_year: i32) -> bool {
    QueenProfile::describe(birth_year, current_year()).due_for_replacement
}

// ============================================================================
// Varroa
// ============================================================================

/// Mites per hundred bees
#[wasm_bindgen]
pub fn calculate_infestation_rate(mite_count: i32, sample_size: i32) -> Result<f64, JsValue> {
    infestation_rate(mite_count, sample_size)
        .map(to_f64)
        .map_err(js_error)
}

/// Mites fallen per day on a sticky board
#[wasm_bindgen]
pub fn calculate_daily_mite_drop(mite_count: i32, days: i32) -> Result<f64, JsValue> {
    daily_mite_drop(mite_count, days).map(to_f64).map_err(js_error)
}

/// Assess a check; returns the assessment as JSON
#[wasm_bindgen]
pub fn assess_varroa(
    method: &str,
    mite_count: i32,
    sample_size: Option<i32>,
    days: Option<i32>,
) -> Result<String, JsValue> {
    let method: VarroaMethod = method.parse().map_err(js_error)?;
    let assessment =
        assess_varroa_check(method, mite_count, sample_size, days).map_err(js_error)?;
    serde_json::to_string(&assessment).map_err(js_error)
}

// ============================================================================
// Inspections
// ============================================================================

/// Averages of a JSON array of inspections between two optional dates
#[wasm_bindgen]
pub fn calculate_inspection_averages(
    inspections_json: &str,
    start: Option<String>,
    end: Option<String>,
) -> Result<String, JsValue> {
    let samples: Vec<InspectionSample> = serde_json::from_str(inspections_json)
        .map_err(|e| js_error(format!("Invalid inspections JSON: {}", e)))?;

    let range = DateRange::new(
        start.as_deref().map(parse_date).transpose()?,
        end.as_deref().map(parse_date).transpose()?,
    );
    if !range.is_valid() {
        return Err(js_error("Start date must not be after end date"));
    }

    serde_json::to_string(&inspection_averages(&samples, range)).map_err(js_error)
}

/// Check a 1-5 rating before submitting an inspection
#[wasm_bindgen]
pub fn is_valid_rating(rating: i32) -> bool {
    validate_rating(rating).is_ok()
}

// ============================================================================
// Harvests and rearing
// ============================================================================

/// Whether honey at this moisture can be extracted
#[wasm_bindgen]
pub fn is_honey_extractable(moisture_percent: f64) -> bool {
    Decimal::try_from(moisture_percent)
        .map(is_extractable_moisture)
        .unwrap_or(false)
}

/// Rearing calendar for a graft date (YYYY-MM-DD) as JSON
#[wasm_bindgen]
pub fn calculate_rearing_timeline(grafted_on: &str) -> Result<String, JsValue> {
    let timeline = rearing_timeline(parse_date(grafted_on)?).map_err(js_error)?;
    serde_json::to_string(&timeline).map_err(js_error)
}

/// Percentage of successes, or NaN when nothing was attempted
#[wasm_bindgen]
pub fn calculate_success_rate(successes: i32, attempts: i32) -> f64 {
    success_rate(successes, attempts).map(to_f64).unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marking_color_names() {
        assert_eq!(queen_marking_color(2021), "White");
        assert_eq!(queen_marking_color(2024), "Green");
        assert_eq!(queen_marking_color(2025), "Blue");
    }

    #[test]
    fn test_queen_age_in() {
        assert_eq!(queen_age_in(2022, 2024).ok(), Some(2));
    }

    #[test]
    fn test_infestation_rate() {
        let rate = calculate_infestation_rate(9, 300).unwrap();
        assert!((rate - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_assess_sugar_roll() {
        let json = assess_varroa("sugar_roll", 12, Some(300), None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["level"], "high");
        assert_eq!(value["treatment_recommended"], true);
    }

    #[test]
    fn test_inspection_averages_in_range() {
        let json = r#"[
            {"inspected_on": "2024-05-01", "temperament": 4, "brood_pattern": 5,
             "frames_of_bees": 8, "frames_of_brood": 5, "honey_frames": 2, "queen_seen": true},
            {"inspected_on": "2024-05-15", "temperament": 2, "brood_pattern": 3,
             "frames_of_bees": 10, "frames_of_brood": 6, "honey_frames": 4, "queen_seen": false},
            {"inspected_on": "2024-07-01", "temperament": 1, "brood_pattern": 1,
             "frames_of_bees": 1, "frames_of_brood": 1, "honey_frames": 1, "queen_seen": false}
        ]"#;

        let out = calculate_inspection_averages(
            json,
            Some("2024-05-01".to_string()),
            Some("2024-05-31".to_string()),
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["inspection_count"], 2);
    }

    #[test]
    fn test_rearing_timeline_json() {
        let out = calculate_rearing_timeline("2024-06-01").unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["emergence_on"], "2024-06-13");
    }

    #[test]
    fn test_honey_extractable() {
        assert!(is_honey_extractable(17.5));
        assert!(!is_honey_extractable(19.2));
    }
}
