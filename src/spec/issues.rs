#![deny(missing_docs)]

//! # Validation Issues
//!
//! Coded, collected problem descriptions shared by the structural, graph and
//! semantic layers. Issues are advisory data: they are returned to the
//! caller, never thrown, and must never halt the host process.

use serde::Serialize;
use serde_json::Value;

/// Stable issue code taxonomy.
///
/// Codes prefixed `DUPLICATE_`, `UNRESOLVABLE_` and `UNUSED_` are produced by
/// the semantic validator; the remainder come from the model graph or are
/// normalized out of the structural engine.
pub mod codes {
    /// Two route templates normalize to the same shape.
    pub const DUPLICATE_API_PATH: &str = "DUPLICATE_API_PATH";
    /// An authorization scope is declared more than once.
    pub const DUPLICATE_AUTHORIZATION_SCOPE_DEFINITION: &str =
        "DUPLICATE_AUTHORIZATION_SCOPE_DEFINITION";
    /// A model identifier is declared more than once.
    pub const DUPLICATE_MODEL_DEFINITION: &str = "DUPLICATE_MODEL_DEFINITION";
    /// An HTTP method appears twice under one route.
    pub const DUPLICATE_OPERATION_METHOD: &str = "DUPLICATE_OPERATION_METHOD";
    /// A parameter name appears twice within one operation.
    pub const DUPLICATE_OPERATION_PARAMETER: &str = "DUPLICATE_OPERATION_PARAMETER";
    /// A parameter name appears twice in a route's shared parameter list.
    pub const DUPLICATE_API_PARAMETER: &str = "DUPLICATE_API_PARAMETER";
    /// A resource path appears twice in the resource listing.
    pub const DUPLICATE_RESOURCE_PATH: &str = "DUPLICATE_RESOURCE_PATH";
    /// A response message code appears twice within one operation.
    pub const DUPLICATE_RESPONSE_MESSAGE_CODE: &str = "DUPLICATE_RESPONSE_MESSAGE_CODE";

    /// A model's inheritance chain loops back on itself.
    pub const CYCLICAL_MODEL_INHERITANCE: &str = "CYCLICAL_MODEL_INHERITANCE";
    /// A dialect v1 model declares more than one parent.
    pub const MULTIPLE_MODEL_INHERITANCE: &str = "MULTIPLE_MODEL_INHERITANCE";
    /// A child model redeclares a property inherited from an ancestor.
    pub const CHILD_MODEL_REDECLARES_PROPERTY: &str = "CHILD_MODEL_REDECLARES_PROPERTY";
    /// A declared required property is absent from the composed schema.
    pub const MISSING_REQUIRED_MODEL_PROPERTY: &str = "MISSING_REQUIRED_MODEL_PROPERTY";

    /// An operation references an undeclared authorization.
    pub const UNRESOLVABLE_AUTHORIZATION: &str = "UNRESOLVABLE_AUTHORIZATION";
    /// An operation references an undeclared authorization scope.
    pub const UNRESOLVABLE_AUTHORIZATION_SCOPE: &str = "UNRESOLVABLE_AUTHORIZATION_SCOPE";
    /// A referenced model has no declaration.
    pub const UNRESOLVABLE_MODEL: &str = "UNRESOLVABLE_MODEL";
    /// A declaration's resource path is absent from the resource listing.
    pub const UNRESOLVABLE_RESOURCE_PATH: &str = "UNRESOLVABLE_RESOURCE_PATH";
    /// A path parameter is declared without a matching template placeholder.
    pub const UNRESOLVABLE_API_PATH_PARAMETER: &str = "UNRESOLVABLE_API_PATH_PARAMETER";
    /// A template placeholder has no declared path parameter.
    pub const MISSING_API_PATH_PARAMETER: &str = "MISSING_API_PATH_PARAMETER";

    /// A declared authorization is never referenced (warning).
    pub const UNUSED_AUTHORIZATION: &str = "UNUSED_AUTHORIZATION";
    /// A declared authorization scope is never referenced (warning).
    pub const UNUSED_AUTHORIZATION_SCOPE: &str = "UNUSED_AUTHORIZATION_SCOPE";
    /// A declared model has no inbound references (warning, dialect v1).
    pub const UNUSED_MODEL: &str = "UNUSED_MODEL";
    /// A listed resource path is claimed by no declaration (dialect v1).
    pub const UNUSED_RESOURCE_PATH: &str = "UNUSED_RESOURCE_PATH";

    /// A consumes/produces list is empty or malformed (warning).
    pub const INVALID_MIME_TYPE_LIST: &str = "INVALID_MIME_TYPE_LIST";
    /// A schemes list is empty or malformed (warning).
    pub const INVALID_SCHEMES_LIST: &str = "INVALID_SCHEMES_LIST";

    /// Instance has the wrong JSON type (structural).
    pub const INVALID_TYPE: &str = "INVALID_TYPE";
    /// Instance value not in the declared enum (structural).
    pub const ENUM_MISMATCH: &str = "ENUM_MISMATCH";
    /// Instance below the declared minimum (structural).
    pub const MINIMUM: &str = "MINIMUM";
    /// Instance at or below the exclusive minimum (structural).
    pub const MINIMUM_EXCLUSIVE: &str = "MINIMUM_EXCLUSIVE";
    /// Instance above the declared maximum (structural).
    pub const MAXIMUM: &str = "MAXIMUM";
    /// Instance at or above the exclusive maximum (structural).
    pub const MAXIMUM_EXCLUSIVE: &str = "MAXIMUM_EXCLUSIVE";
    /// Instance string shorter than allowed (structural).
    pub const MIN_LENGTH: &str = "MIN_LENGTH";
    /// Instance string longer than allowed (structural).
    pub const MAX_LENGTH: &str = "MAX_LENGTH";
    /// Instance array shorter than allowed (structural).
    pub const ARRAY_LENGTH_SHORT: &str = "ARRAY_LENGTH_SHORT";
    /// Instance array longer than allowed (structural).
    pub const ARRAY_LENGTH_LONG: &str = "ARRAY_LENGTH_LONG";
    /// Instance array contains duplicate items (structural).
    pub const ARRAY_UNIQUE: &str = "ARRAY_UNIQUE";
    /// Instance string does not match the declared pattern (structural).
    pub const PATTERN: &str = "PATTERN";
    /// Instance object is missing a required property (structural).
    pub const OBJECT_REQUIRED: &str = "OBJECT_REQUIRED";
    /// Instance object carries a property the schema forbids (structural).
    pub const ADDITIONAL_PROPERTIES: &str = "ADDITIONAL_PROPERTIES";
    /// Catch-all for structural violations without a dedicated code.
    pub const SCHEMA_VALIDATION_FAILED: &str = "SCHEMA_VALIDATION_FAILED";
}

/// A single coded problem found in a description document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Stable taxonomy token (see [`codes`]).
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// The offending raw value, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Ordered document-location segments (property names / array indices)
    /// pinpointing the offending location.
    pub path: Vec<String>,
}

impl ValidationIssue {
    /// Creates an issue without attached data.
    pub fn new(code: &str, message: impl Into<String>, path: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            data: None,
            path,
        }
    }

    /// Attaches the offending raw value.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Errors and warnings collected while validating one document.
///
/// For dialect v1 the top-level result covers the resource listing and
/// `api_declarations` holds one sub-result per declaration, in submission
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    /// Blocking problems.
    pub errors: Vec<ValidationIssue>,
    /// Advisory problems; never block validation.
    pub warnings: Vec<ValidationIssue>,
    /// Per-resource-declaration sub-results (dialect v1 only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub api_declarations: Vec<ValidationResult>,
}

impl ValidationResult {
    /// True when there are no errors, no warnings, and every sub-result is
    /// clean as well.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
            && self.warnings.is_empty()
            && self.api_declarations.iter().all(ValidationResult::is_clean)
    }

    /// True when this result or any sub-result carries errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
            || self
                .api_declarations
                .iter()
                .any(ValidationResult::has_errors)
    }

    /// Appends another result's errors and warnings into this one.
    pub fn absorb(&mut self, mut other: ValidationResult) {
        self.errors.append(&mut other.errors);
        self.warnings.append(&mut other.warnings);
    }
}
