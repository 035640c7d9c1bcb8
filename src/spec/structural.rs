#![deny(missing_docs)]

//! # Structural Validation Adapter
//!
//! Thin wrapper over the external `jsonschema` engine (draft-04). Raw
//! constraint violations are normalized into the crate's issue shape with
//! JSON-pointer-derived paths; nothing else in the crate touches the engine
//! directly.

use crate::error::{AppError, AppResult};
use crate::spec::issues::{codes, ValidationIssue};
use crate::spec::profile::VersionProfile;
use crate::spec::refs::pointer_segments;
use jsonschema::{Draft, ValidationError, Validator};
use serde_json::Value;
use std::collections::HashMap;

/// Compiled validators for one dialect's schema bundle.
pub struct StructuralValidator {
    validators: HashMap<&'static str, Validator>,
}

impl StructuralValidator {
    /// Compiles every schema in the profile's bundle.
    pub fn new(profile: &VersionProfile) -> AppResult<Self> {
        let mut validators = HashMap::new();
        for (name, text) in profile.schema_bundle() {
            let schema: Value = serde_json::from_str(text)
                .map_err(|e| AppError::Schema(format!("Bundle schema '{}' is invalid: {}", name, e)))?;
            validators.insert(*name, compile(&schema, name)?);
        }
        Ok(StructuralValidator { validators })
    }

    /// Validates an instance against a named bundle schema.
    pub fn validate(&self, schema_name: &str, instance: &Value) -> AppResult<Vec<ValidationIssue>> {
        let validator = self.validators.get(schema_name).ok_or_else(|| {
            AppError::Schema(format!("Unknown bundle schema: {}", schema_name))
        })?;
        Ok(collect_issues(validator, instance))
    }

    /// Bundle lookup for schema names taken from the same profile that built
    /// this validator. Every bundle schema compiles at construction, so the
    /// lookup cannot miss.
    pub(crate) fn validate_bundled(&self, schema_name: &str, instance: &Value) -> Vec<ValidationIssue> {
        let validator = self
            .validators
            .get(schema_name)
            .expect("bundle schema compiled at construction");
        collect_issues(validator, instance)
    }

    /// Validates an instance against an ad hoc schema, typically a composed
    /// model. The schema is compiled on the fly.
    pub fn validate_instance(
        &self,
        schema: &Value,
        instance: &Value,
    ) -> AppResult<Vec<ValidationIssue>> {
        let validator = compile(schema, "instance schema")?;
        Ok(collect_issues(&validator, instance))
    }
}

fn compile(schema: &Value, label: &str) -> AppResult<Validator> {
    let mut opts = jsonschema::options();
    opts.with_draft(Draft::Draft4);
    opts.build(schema)
        .map_err(|e| AppError::Schema(format!("Failed to compile {}: {}", label, e)))
}

fn collect_issues(validator: &Validator, instance: &Value) -> Vec<ValidationIssue> {
    validator
        .iter_errors(instance)
        .map(normalize_error)
        .collect()
}

fn normalize_error(error: ValidationError<'_>) -> ValidationIssue {
    let path = pointer_segments(&error.instance_path.to_string());
    let data = error.instance.as_ref().clone();
    ValidationIssue::new(issue_code(&error.kind), error.to_string(), path).with_data(data)
}

/// Maps raw engine violations onto the stable code taxonomy.
fn issue_code(kind: &jsonschema::error::ValidationErrorKind) -> &'static str {
    use jsonschema::error::ValidationErrorKind as Kind;

    match kind {
        Kind::Type { .. } => codes::INVALID_TYPE,
        Kind::Enum { .. } | Kind::Constant { .. } => codes::ENUM_MISMATCH,
        Kind::Minimum { .. } => codes::MINIMUM,
        Kind::ExclusiveMinimum { .. } => codes::MINIMUM_EXCLUSIVE,
        Kind::Maximum { .. } => codes::MAXIMUM,
        Kind::ExclusiveMaximum { .. } => codes::MAXIMUM_EXCLUSIVE,
        Kind::MinLength { .. } => codes::MIN_LENGTH,
        Kind::MaxLength { .. } => codes::MAX_LENGTH,
        Kind::MinItems { .. } => codes::ARRAY_LENGTH_SHORT,
        Kind::MaxItems { .. } => codes::ARRAY_LENGTH_LONG,
        Kind::UniqueItems => codes::ARRAY_UNIQUE,
        Kind::Pattern { .. } => codes::PATTERN,
        Kind::Required { .. } => codes::OBJECT_REQUIRED,
        Kind::AdditionalProperties { .. } => codes::ADDITIONAL_PROPERTIES,
        _ => codes::SCHEMA_VALIDATION_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::profile::Version;
    use serde_json::json;

    fn v2_validator() -> StructuralValidator {
        StructuralValidator::new(&VersionProfile::new(Version::V2_0)).unwrap()
    }

    #[test]
    fn test_empty_v2_document_reports_missing_required() {
        let issues = v2_validator().validate("schema.json", &json!({})).unwrap();
        assert!(!issues.is_empty());
        assert!(issues.iter().all(|i| i.code == codes::OBJECT_REQUIRED));
    }

    #[test]
    fn test_minimal_v2_document_is_structurally_clean() {
        let doc = json!({
            "swagger": "2.0",
            "info": {"title": "Test", "version": "1.0.0"},
            "paths": {}
        });
        let issues = v2_validator().validate("schema.json", &doc).unwrap();
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_instance_validation_paths_are_split() {
        let schema = json!({
            "type": "object",
            "properties": {
                "tags": {"type": "array", "items": {"type": "string"}}
            }
        });
        let issues = v2_validator()
            .validate_instance(&schema, &json!({"tags": ["ok", 42]}))
            .unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, codes::INVALID_TYPE);
        assert_eq!(issues[0].path, vec!["tags", "1"]);
        assert_eq!(issues[0].data, Some(json!(42)));
    }

    #[test]
    fn test_v1_bundle_compiles_and_validates() {
        let validator =
            StructuralValidator::new(&VersionProfile::new(Version::V1_2)).unwrap();
        let listing = json!({
            "swaggerVersion": "1.2",
            "apis": [{"path": "/pet"}]
        });
        let issues = validator.validate("resource-listing.json", &listing).unwrap();
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);

        let bad = json!({"swaggerVersion": "1.1", "apis": []});
        let issues = validator.validate("resource-listing.json", &bad).unwrap();
        assert!(issues.iter().any(|i| i.code == codes::ENUM_MISMATCH));
    }
}
