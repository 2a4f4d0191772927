//! Locale-aware formatting of route metrics and user notices.
//!
//! Numbers carry at most two fractional digits with trailing zeros dropped.
//! Units are picked on a natural scale: meters/kilometers or feet/miles for
//! length, seconds/minutes/hours for duration.

use crate::error::PreconditionError;
use crate::models::RouteResult;
use serde::{Deserialize, Serialize};

const METERS_PER_MILE: f64 = 1_609.344;
const FEET_PER_METER: f64 = 3.280_839_895;
/// Below this many miles, imperial distances are shown in feet.
const MIN_MILES: f64 = 0.1;

pub const GENERIC_ERROR_MESSAGE: &str =
    "We couldn't plan a route right now. Please try again in a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    Metric,
    Imperial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatLocale {
    pub decimal_separator: char,
    pub grouping_separator: char,
    pub units: UnitSystem,
}

impl Default for FormatLocale {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            grouping_separator: ',',
            units: UnitSystem::Metric,
        }
    }
}

impl FormatLocale {
    /// Parse a BCP-47 style tag such as `en-US`, `de_DE` or `fr`.
    /// Unknown languages fall back to `.` / `,` separators.
    pub fn parse(tag: &str) -> Self {
        let mut parts = tag.trim().split(['-', '_']);
        let language = parts.next().unwrap_or_default().to_ascii_lowercase();
        let region = parts
            .find(|part| part.len() == 2 || part.len() == 3)
            .map(|part| part.to_ascii_uppercase());

        let (decimal_separator, grouping_separator) = match language.as_str() {
            "de" | "es" | "it" | "nl" | "pt" | "da" | "id" | "tr" => (',', '.'),
            "fr" | "ru" | "pl" | "cs" | "sv" | "nb" | "fi" | "uk" => (',', '\u{202f}'),
            _ => ('.', ','),
        };
        let units = match region.as_deref() {
            Some("US") | Some("GB") | Some("LR") | Some("MM") => UnitSystem::Imperial,
            _ => UnitSystem::Metric,
        };

        Self {
            decimal_separator,
            grouping_separator,
            units,
        }
    }

    /// Format with at most two fractional digits.
    pub fn format_number(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let fixed = format!("{:.2}", value);
        let (sign, digits) = match fixed.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", fixed.as_str()),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
        let frac_part = frac_part.trim_end_matches('0');

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(self.grouping_separator);
            }
            grouped.push(ch);
        }

        let sign = if grouped == "0" && frac_part.is_empty() { "" } else { sign };
        if frac_part.is_empty() {
            format!("{sign}{grouped}")
        } else {
            format!("{sign}{grouped}{}{frac_part}", self.decimal_separator)
        }
    }
}

/// Value as it will be printed, so unit thresholds see the rounded figure.
fn rounded(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn format_distance(meters: f64, locale: &FormatLocale) -> String {
    match locale.units {
        UnitSystem::Metric => {
            if rounded(meters).abs() >= 1_000.0 {
                format!("{} km", locale.format_number(meters / 1_000.0))
            } else {
                format!("{} m", locale.format_number(meters))
            }
        }
        UnitSystem::Imperial => {
            let miles = meters / METERS_PER_MILE;
            if rounded(miles).abs() >= MIN_MILES {
                format!("{} mi", locale.format_number(miles))
            } else {
                format!("{} ft", locale.format_number(meters * FEET_PER_METER))
            }
        }
    }
}

pub fn format_duration(minutes: f64, locale: &FormatLocale) -> String {
    if rounded(minutes).abs() >= 60.0 {
        format!("{} hr", locale.format_number(minutes / 60.0))
    } else if rounded(minutes).abs() >= 1.0 || minutes == 0.0 {
        format!("{} min", locale.format_number(minutes))
    } else {
        format!("{} sec", locale.format_number(minutes * 60.0))
    }
}

/// Formatted metrics of a presented route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSummary {
    pub distance: String,
    pub travel_time: String,
}

impl RouteSummary {
    pub fn from_result(result: &RouteResult, locale: &FormatLocale) -> Self {
        Self {
            distance: format_distance(result.total_distance_meters, locale),
            travel_time: format_duration(result.total_travel_time_minutes, locale),
        }
    }
}

/// Dismissible message with a single acknowledgement action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: Option<String>,
    pub message: String,
    pub action: String,
}

pub fn summary_notice(summary: &RouteSummary) -> Notice {
    Notice {
        title: None,
        message: format!(
            "Total distance: {}\nTravel time: {}",
            summary.distance, summary.travel_time
        ),
        action: "OK".to_string(),
    }
}

pub fn error_notice() -> Notice {
    Notice {
        title: Some("Alert".to_string()),
        message: GENERIC_ERROR_MESSAGE.to_string(),
        action: "Dismiss".to_string(),
    }
}

pub fn precondition_notice(error: PreconditionError) -> Notice {
    let message = match error {
        PreconditionError::MissingVehicleHeight => {
            "Select a vehicle with a height before planning a route."
        }
        PreconditionError::MissingDestination => "Choose a destination before planning a route.",
        PreconditionError::MissingDeviceLocation => {
            "Your current location is unavailable. Check location permissions and try again."
        }
    };
    Notice {
        title: Some("Alert".to_string()),
        message: message.to_string(),
        action: "Dismiss".to_string(),
    }
}
