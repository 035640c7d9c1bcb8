#![deny(missing_docs)]

//! # Lenient Coercion
//!
//! Numeric and date parsing with an intentionally permissive contract: a
//! value is accepted when it carries a valid numeric prefix, and trailing
//! non-numeric characters are ignored. Date and date-time checks bound the
//! field ranges without calendar awareness (day 31 passes for every month).
//! Callers rely on this exact leniency; do not tighten it.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Parses the leading base-10 integer of a string, ignoring anything after
/// the last consumed digit. `"1.5"` parses as `1`, `"2abc"` as `2`.
pub fn lenient_i64(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok().map(|n| sign * n)
}

/// Parses the leading base-10 float of a string: optional sign, digits with
/// an optional fraction, optional exponent. `".5"` parses as `0.5`; trailing
/// garbage is ignored.
pub fn lenient_f64(input: &str) -> Option<f64> {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    let re = PREFIX.get_or_init(|| {
        Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?").expect("Invalid regex constant")
    });
    let trimmed = input.trim_start();
    let matched = re.find(trimmed)?;
    matched.as_str().parse::<f64>().ok()
}

/// Coerces a value to a number under a declared type (`integer` truncates,
/// `number` keeps the fraction). Returns `None` when no numeric prefix
/// exists, in which case bound checks are skipped.
pub fn numeric_value(declared_type: &str, value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => {
            let f = n.as_f64()?;
            match declared_type {
                "integer" => Some(f.trunc()),
                _ => Some(f),
            }
        }
        Value::String(s) => match declared_type {
            "integer" => lenient_i64(s).map(|n| n as f64),
            _ => lenient_f64(s),
        },
        _ => None,
    }
}

/// `YYYY-MM-DD` with month `01..12` and day `01..31`. No per-month day count
/// or leap-year check.
pub fn is_valid_date(input: &str) -> bool {
    static DATE: OnceLock<Regex> = OnceLock::new();
    let re = DATE.get_or_init(|| {
        Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("Invalid regex constant")
    });
    let Some(caps) = re.captures(input) else {
        return false;
    };
    let month = &caps[2];
    let day = &caps[3];
    month >= "01" && month <= "12" && day >= "01" && day <= "31"
}

/// Date part per [`is_valid_date`] plus `THH:MM:SS[.fraction](Z|±HH:MM)`,
/// case-insensitive, with hour `00..23` and minute/second `00..59`.
pub fn is_valid_date_time(input: &str) -> bool {
    static TIME: OnceLock<Regex> = OnceLock::new();
    let re = TIME.get_or_init(|| {
        Regex::new(r"^([0-9]{2}):([0-9]{2}):([0-9]{2})(.[0-9]+)?(z|([+-][0-9]{2}:[0-9]{2}))$")
            .expect("Invalid regex constant")
    });
    let lowered = input.to_lowercase();
    let mut parts = lowered.splitn(2, 't');
    let date_part = parts.next().unwrap_or_default();
    let Some(time_part) = parts.next() else {
        return false;
    };
    if !is_valid_date(date_part) {
        return false;
    }
    let Some(caps) = re.captures(time_part) else {
        return false;
    };
    &caps[1] <= "23" && &caps[2] <= "59" && &caps[3] <= "59"
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_parse_stops_at_first_non_digit() {
        assert_eq!(lenient_i64("1"), Some(1));
        assert_eq!(lenient_i64("1.5"), Some(1));
        assert_eq!(lenient_i64("2abc"), Some(2));
        assert_eq!(lenient_i64("-7"), Some(-7));
        assert_eq!(lenient_i64("  10"), Some(10));
        assert_eq!(lenient_i64("fake"), None);
        assert_eq!(lenient_i64(""), None);
    }

    #[test]
    fn test_float_parse_tolerates_trailing_garbage() {
        assert_eq!(lenient_f64("1.5"), Some(1.5));
        assert_eq!(lenient_f64("1.5kg"), Some(1.5));
        assert_eq!(lenient_f64(".5"), Some(0.5));
        assert_eq!(lenient_f64("-2e3"), Some(-2000.0));
        assert_eq!(lenient_f64("abc"), None);
    }

    #[test]
    fn test_numeric_value_truncates_for_integer_type() {
        assert_eq!(numeric_value("integer", &json!("1.5")), Some(1.0));
        assert_eq!(numeric_value("number", &json!("1.5")), Some(1.5));
        assert_eq!(numeric_value("integer", &json!(3.9)), Some(3.0));
        assert_eq!(numeric_value("integer", &json!(true)), None);
    }

    #[test]
    fn test_date_bounds_without_calendar_check() {
        assert!(is_valid_date("2014-01-01"));
        // Intentionally accepted: the check bounds fields, not the calendar.
        assert!(is_valid_date("2014-02-31"));
        assert!(!is_valid_date("2014-13-01"));
        assert!(!is_valid_date("2014-01-32"));
        assert!(!is_valid_date("2014-00-10"));
        assert!(!is_valid_date("2014-1-1"));
    }

    #[test]
    fn test_date_time_field_ranges() {
        assert!(is_valid_date_time("2014-01-01T12:30:45Z"));
        assert!(is_valid_date_time("2014-01-01t23:59:59.123+05:30"));
        assert!(!is_valid_date_time("2014-01-01T24:00:00Z"));
        assert!(!is_valid_date_time("2014-01-01T12:60:00Z"));
        assert!(!is_valid_date_time("2014-01-01T12:00:61Z"));
        assert!(!is_valid_date_time("2014-01-01"));
        assert!(!is_valid_date_time("2014-01-01T12:00:00"));
    }
}
