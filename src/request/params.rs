#![deny(missing_docs)]

//! # Parameter Validation
//!
//! Validates one (name, declared constraints, raw value) triple against the
//! dialect's ordered rule chain. The first failing rule aborts the chain and
//! is the only violation reported; callers depend on that single-message
//! behavior.

use crate::request::coerce::{is_valid_date, is_valid_date_time, lenient_f64, numeric_value};
use crate::request::ContractViolation;
use crate::spec::profile::{ParamRule, VersionProfile};
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

/// Runs the dialect's parameter rule chain.
pub struct ParameterValidator<'a> {
    profile: &'a VersionProfile,
}

impl<'a> ParameterValidator<'a> {
    /// Creates a validator for the dialect.
    pub fn new(profile: &'a VersionProfile) -> Self {
        ParameterValidator { profile }
    }

    /// Validates a value against a parameter declaration. Rules run in the
    /// dialect's fixed order; the first failure is returned.
    pub fn validate(
        &self,
        name: &str,
        declaration: &Value,
        value: &Value,
    ) -> Result<(), ContractViolation> {
        for rule in self.profile.rule_chain() {
            match rule {
                ParamRule::TypeFormat => check_type_format(name, declaration, value)?,
                ParamRule::AllowableValues => check_enum(name, declaration, value)?,
                ParamRule::Maximum => check_maximum(name, declaration, value)?,
                ParamRule::MaxItems => check_max_items(name, declaration, value)?,
                ParamRule::MaxLength => check_max_length(name, declaration, value)?,
                ParamRule::Minimum => check_minimum(name, declaration, value)?,
                ParamRule::MinItems => check_min_items(name, declaration, value)?,
                ParamRule::MinLength => check_min_length(name, declaration, value)?,
                ParamRule::Pattern => check_pattern(name, declaration, value)?,
                ParamRule::UniqueItems => check_unique_items(name, declaration, value)?,
            }
        }
        Ok(())
    }
}

/// Scalar rendering for message substitution: strings bare, everything else
/// in JSON form.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn declared_str<'v>(declaration: &'v Value, key: &str) -> Option<&'v str> {
    declaration.get(key).and_then(Value::as_str)
}

/// Declared type/format for value checking; arrays check their element type.
fn effective_type_format<'v>(declaration: &'v Value) -> (Option<&'v str>, Option<&'v str>) {
    match declared_str(declaration, "type") {
        Some("array") => {
            let items = declaration.get("items");
            (
                items.and_then(|i| i.get("type")).and_then(Value::as_str),
                items.and_then(|i| i.get("format")).and_then(Value::as_str),
            )
        }
        other => (other, declared_str(declaration, "format")),
    }
}

fn scalar_matches(type_name: &str, format: Option<&str>, value: &Value) -> bool {
    match type_name {
        "boolean" => {
            value.is_boolean()
                || matches!(value.as_str(), Some("true") | Some("false"))
        }
        "integer" => numeric_value("integer", value).is_some(),
        "number" => numeric_value("number", value).is_some(),
        "string" => match format {
            Some("date") => is_valid_date(&display_value(value)),
            Some("date-time") => is_valid_date_time(&display_value(value)),
            _ => true,
        },
        // file, void and model types are not value-checked here.
        _ => true,
    }
}

fn check_type_format(
    name: &str,
    declaration: &Value,
    value: &Value,
) -> Result<(), ContractViolation> {
    let (Some(type_name), format) = effective_type_format(declaration) else {
        return Ok(());
    };

    if let Some(elements) = value.as_array() {
        for (index, element) in elements.iter().enumerate() {
            if !scalar_matches(type_name, format, element) {
                return Err(ContractViolation::param(
                    name,
                    format!(
                        "at index {} is not a valid {}: {}",
                        index,
                        type_name,
                        display_value(element)
                    ),
                ));
            }
        }
        return Ok(());
    }

    if !scalar_matches(type_name, format, value) {
        let qualifier = match format {
            Some(f) => format!("{} {}", f, type_name),
            None => type_name.to_string(),
        };
        return Err(ContractViolation::param(
            name,
            format!("is not a valid {}: {}", qualifier, display_value(value)),
        ));
    }
    Ok(())
}

fn check_enum(name: &str, declaration: &Value, value: &Value) -> Result<(), ContractViolation> {
    let Some(allowed) = declaration.get("enum").and_then(Value::as_array) else {
        return Ok(());
    };
    let rendered = display_value(value);
    if allowed.iter().any(|a| display_value(a) == rendered) {
        return Ok(());
    }
    let list: Vec<String> = allowed.iter().map(display_value).collect();
    Err(ContractViolation::param(
        name,
        format!(
            "is not an allowable value ({}): {}",
            list.join(", "),
            rendered
        ),
    ))
}

/// The declared bound may itself be a string (dialect v1 declares numeric
/// bounds as strings); it is parsed as a float either way.
fn declared_bound(declaration: &Value, key: &str) -> Option<(f64, String)> {
    let raw = declaration.get(key)?;
    let rendered = display_value(raw);
    lenient_f64(&rendered).map(|bound| (bound, rendered))
}

fn exclusive_flag(declaration: &Value, key: &str) -> bool {
    declaration.get(key).and_then(Value::as_bool) == Some(true)
}

/// Bounds only apply to the numeric types; other declared types skip them.
fn coerced_numeric(declaration: &Value, value: &Value) -> Option<f64> {
    match declared_str(declaration, "type")? {
        t @ ("integer" | "number") => numeric_value(t, value),
        _ => None,
    }
}

fn check_maximum(name: &str, declaration: &Value, value: &Value) -> Result<(), ContractViolation> {
    let Some((bound, rendered_bound)) = declared_bound(declaration, "maximum") else {
        return Ok(());
    };
    let Some(coerced) = coerced_numeric(declaration, value) else {
        return Ok(());
    };
    let exclusive = exclusive_flag(declaration, "exclusiveMaximum");
    if exclusive && coerced >= bound {
        return Err(ContractViolation::param(
            name,
            format!(
                "is greater than or equal to the configured maximum ({}): {}",
                rendered_bound,
                display_value(value)
            ),
        ));
    }
    if !exclusive && coerced > bound {
        return Err(ContractViolation::param(
            name,
            format!(
                "is greater than the configured maximum ({}): {}",
                rendered_bound,
                display_value(value)
            ),
        ));
    }
    Ok(())
}

fn check_minimum(name: &str, declaration: &Value, value: &Value) -> Result<(), ContractViolation> {
    let Some((bound, rendered_bound)) = declared_bound(declaration, "minimum") else {
        return Ok(());
    };
    let Some(coerced) = coerced_numeric(declaration, value) else {
        return Ok(());
    };
    let exclusive = exclusive_flag(declaration, "exclusiveMinimum");
    if exclusive && coerced <= bound {
        return Err(ContractViolation::param(
            name,
            format!(
                "is less than or equal to the configured minimum ({}): {}",
                rendered_bound,
                display_value(value)
            ),
        ));
    }
    if !exclusive && coerced < bound {
        return Err(ContractViolation::param(
            name,
            format!(
                "is less than the configured minimum ({}): {}",
                rendered_bound,
                display_value(value)
            ),
        ));
    }
    Ok(())
}

fn check_max_items(name: &str, declaration: &Value, value: &Value) -> Result<(), ContractViolation> {
    let Some(limit) = declaration.get("maxItems").and_then(Value::as_u64) else {
        return Ok(());
    };
    if value.as_array().map_or(false, |a| a.len() as u64 > limit) {
        return Err(ContractViolation::param(
            name,
            format!("contains more items than allowed: {}", limit),
        ));
    }
    Ok(())
}

fn check_min_items(name: &str, declaration: &Value, value: &Value) -> Result<(), ContractViolation> {
    let Some(limit) = declaration.get("minItems").and_then(Value::as_u64) else {
        return Ok(());
    };
    if value.as_array().map_or(false, |a| (a.len() as u64) < limit) {
        return Err(ContractViolation::param(
            name,
            format!("contains fewer items than allowed: {}", limit),
        ));
    }
    Ok(())
}

fn check_max_length(name: &str, declaration: &Value, value: &Value) -> Result<(), ContractViolation> {
    let Some(limit) = declaration.get("maxLength").and_then(Value::as_u64) else {
        return Ok(());
    };
    if value_length(value).map_or(false, |len| len > limit) {
        return Err(ContractViolation::param(
            name,
            format!("is longer than allowed: {}", limit),
        ));
    }
    Ok(())
}

fn check_min_length(name: &str, declaration: &Value, value: &Value) -> Result<(), ContractViolation> {
    let Some(limit) = declaration.get("minLength").and_then(Value::as_u64) else {
        return Ok(());
    };
    if value_length(value).map_or(false, |len| len < limit) {
        return Err(ContractViolation::param(
            name,
            format!("is shorter than allowed: {}", limit),
        ));
    }
    Ok(())
}

fn value_length(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => Some(s.chars().count() as u64),
        Value::Array(a) => Some(a.len() as u64),
        _ => None,
    }
}

fn check_pattern(name: &str, declaration: &Value, value: &Value) -> Result<(), ContractViolation> {
    let Some(pattern) = declared_str(declaration, "pattern") else {
        return Ok(());
    };
    let re = Regex::new(pattern).map_err(|e| {
        ContractViolation::internal(format!("Invalid parameter pattern ({}): {}", pattern, e))
    })?;
    if !re.is_match(&display_value(value)) {
        return Err(ContractViolation::param(
            name,
            format!("does not match required pattern: {}", pattern),
        ));
    }
    Ok(())
}

fn check_unique_items(
    name: &str,
    declaration: &Value,
    value: &Value,
) -> Result<(), ContractViolation> {
    if declaration.get("uniqueItems").and_then(Value::as_bool) != Some(true) {
        return Ok(());
    }
    let Some(elements) = value.as_array() else {
        return Ok(());
    };
    let mut seen: HashSet<String> = HashSet::new();
    if elements.iter().all(|e| seen.insert(display_value(e))) {
        return Ok(());
    }
    let joined: Vec<String> = elements.iter().map(display_value).collect();
    Err(ContractViolation::param(
        name,
        format!("does not allow duplicate values: {}", joined.join(", ")),
    ))
}
