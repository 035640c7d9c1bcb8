#![deny(missing_docs)]

//! # Runtime Contract Validation
//!
//! Validates one inbound request against one resolved operation: content-type
//! negotiation, per-parameter rule chains and body-model validation.
//! Violations are typed errors carrying the exact human-readable message the
//! transport layer is expected to surface verbatim (e.g. as an HTTP 400
//! body).
//!
//! The route match itself is the router's job; this layer receives the
//! already resolved operation descriptor as read-only input.

pub mod coerce;
pub mod params;

use crate::request::params::ParameterValidator;
use crate::spec::document::SpecDocument;
use crate::spec::profile::Version;
use crate::spec::refs::model_name;
use crate::spec::SpecValidator;
use derive_more::Display;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
const BODY_METHODS: &[&str] = &["POST", "PUT"];

/// A request-level validation failure.
///
/// `failed_validation` distinguishes contract violations (client error,
/// message is caller-facing) from internal faults such as an invalid
/// declared pattern.
#[derive(Debug, Clone, PartialEq, Display)]
#[display("{message}")]
pub struct ContractViolation {
    /// Caller-facing message, built from a fixed template per rule.
    pub message: String,
    /// True when the request violated the contract; false for internal
    /// faults.
    pub failed_validation: bool,
}

impl ContractViolation {
    /// A contract violation with a ready-made message.
    pub fn failed(message: impl Into<String>) -> Self {
        ContractViolation {
            message: message.into(),
            failed_validation: true,
        }
    }

    /// A parameter-scoped contract violation (`Parameter (<name>) <rest>`).
    pub fn param(name: &str, rest: impl Into<String>) -> Self {
        Self::failed(format!("Parameter ({}) {}", name, rest.into()))
    }

    /// An internal fault, not attributable to the request.
    pub fn internal(message: impl Into<String>) -> Self {
        ContractViolation {
            message: message.into(),
            failed_validation: false,
        }
    }
}

impl std::error::Error for ContractViolation {}

/// The resolved operation an inbound request matched, as supplied by the
/// router. Read-only input.
#[derive(Debug, Clone, Default)]
pub struct OperationDescriptor {
    /// HTTP method.
    pub method: String,
    /// Route template the operation is declared under.
    pub path: String,
    /// Parameter declarations, document order.
    pub parameters: Vec<Value>,
    /// Operation-level accepted media types.
    pub consumes: Vec<String>,
    /// Container-level accepted media types (document or declaration).
    pub shared_consumes: Vec<String>,
    /// Operation-level produced media types.
    pub produces: Vec<String>,
    /// Declared responses, when the router resolved them.
    pub responses: Option<Value>,
}

/// A normalized view of one inbound request.
#[derive(Debug, Clone, Default)]
pub struct IncomingRequest {
    /// HTTP method as received.
    pub method: String,
    /// Header map; keys are stored lowercased.
    pub headers: HashMap<String, String>,
    /// Query parameters.
    pub query: HashMap<String, Value>,
    /// Path parameters extracted by the router.
    pub path_params: HashMap<String, Value>,
    /// Form fields.
    pub form: HashMap<String, Value>,
    /// Parsed request body, when present.
    pub body: Option<Value>,
}

impl IncomingRequest {
    /// An empty request with the given method.
    pub fn new(method: &str) -> Self {
        IncomingRequest {
            method: method.to_string(),
            ..Default::default()
        }
    }

    /// Adds a header; the name is lowercased.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_lowercase(), value.to_string());
        self
    }

    /// Adds a query parameter.
    pub fn with_query(mut self, name: &str, value: Value) -> Self {
        self.query.insert(name.to_string(), value);
        self
    }

    /// Adds a router-extracted path parameter.
    pub fn with_path_param(mut self, name: &str, value: Value) -> Self {
        self.path_params.insert(name.to_string(), value);
        self
    }

    /// Adds a form field.
    pub fn with_form(mut self, name: &str, value: Value) -> Self {
        self.form.insert(name.to_string(), value);
        self
    }

    /// Sets the parsed body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A matched route that does not define the request's method.
#[derive(Debug, Clone, PartialEq, Display)]
#[display("Route defined in Swagger specification but there is no defined {method} operation.")]
pub struct MethodNotAllowed {
    /// The undefined method, lowercased as received.
    pub method: String,
    /// Methods the route does define, uppercased and alphabetical.
    pub allow: Vec<String>,
}

impl MethodNotAllowed {
    /// `Allow` header value: uppercased methods, alphabetical, comma-joined.
    pub fn allow_header(&self) -> String {
        self.allow.join(", ")
    }
}

impl std::error::Error for MethodNotAllowed {}

/// Checks a request method against the methods a route defines.
pub fn check_method_allowed(method: &str, defined: &[String]) -> Result<(), MethodNotAllowed> {
    if defined.iter().any(|m| m.eq_ignore_ascii_case(method)) {
        return Ok(());
    }
    let mut allow: Vec<String> = defined.iter().map(|m| m.to_uppercase()).collect();
    allow.sort();
    allow.dedup();
    Err(MethodNotAllowed {
        method: method.to_lowercase(),
        allow,
    })
}

/// Validates inbound requests against operations resolved from one
/// description document.
pub struct RequestValidator<'a> {
    spec: &'a SpecValidator,
}

impl<'a> RequestValidator<'a> {
    /// Creates a validator backed by a compiled document source.
    pub fn new(spec: &'a SpecValidator) -> Self {
        RequestValidator { spec }
    }

    /// Runs the full request-side chain. Validation stops at the first
    /// failing step or parameter.
    pub fn validate(
        &self,
        document: &SpecDocument,
        operation: &OperationDescriptor,
        request: &IncomingRequest,
    ) -> Result<(), ContractViolation> {
        self.check_content_type(operation, request)?;

        let params = ParameterValidator::new(self.spec.profile());
        for declaration in &operation.parameters {
            let Some(name) = declaration.get("name").and_then(Value::as_str) else {
                continue;
            };
            let Some(value) = self.parameter_value(declaration, name, request)? else {
                continue;
            };

            if self.parameter_location(declaration) == Some("body") {
                if let Some((reference, per_element)) = self.body_model_reference(declaration) {
                    self.check_body_model(document, name, &reference, per_element, &value)?;
                    continue;
                }
            }
            params.validate(name, declaration, &value)?;
        }

        debug!(method = %request.method, path = %operation.path, "request validated");
        Ok(())
    }

    /// Media-type negotiation. Only methods that carry a body participate;
    /// an empty allowed set accepts everything.
    fn check_content_type(
        &self,
        operation: &OperationDescriptor,
        request: &IncomingRequest,
    ) -> Result<(), ContractViolation> {
        if !BODY_METHODS
            .iter()
            .any(|m| m.eq_ignore_ascii_case(&request.method))
        {
            return Ok(());
        }
        let mut allowed: Vec<&str> = Vec::new();
        for media in operation
            .consumes
            .iter()
            .chain(operation.shared_consumes.iter())
        {
            if !allowed.contains(&media.as_str()) {
                allowed.push(media);
            }
        }
        if allowed.is_empty() {
            return Ok(());
        }

        let header = request
            .headers
            .get("content-type")
            .map(String::as_str)
            .unwrap_or(DEFAULT_CONTENT_TYPE);
        let media_type = header.split(';').next().unwrap_or(header).trim();

        if allowed.contains(&media_type) {
            return Ok(());
        }
        // Two spaces after the period are part of the normative message.
        Err(ContractViolation::failed(format!(
            "Invalid content type ({}).  These are valid: {}",
            media_type,
            allowed.join(", ")
        )))
    }

    fn parameter_location<'d>(&self, declaration: &'d Value) -> Option<&'d str> {
        let key = match self.spec.profile().version {
            Version::V1_2 => "paramType",
            Version::V2_0 => "in",
        };
        declaration.get(key).and_then(Value::as_str)
    }

    /// Resolves a parameter's effective value: the request value when
    /// present, else the declared default. Defaults are validated like
    /// explicit values. Absent required parameters without a default fail.
    fn parameter_value(
        &self,
        declaration: &Value,
        name: &str,
        request: &IncomingRequest,
    ) -> Result<Option<Value>, ContractViolation> {
        let supplied = match self.parameter_location(declaration) {
            Some("path") => request.path_params.get(name).cloned(),
            Some("query") => request.query.get(name).cloned(),
            Some("header") => request
                .headers
                .get(&name.to_lowercase())
                .map(|v| Value::String(v.clone())),
            Some("form") | Some("formData") => request.form.get(name).cloned(),
            Some("body") => request.body.clone(),
            _ => None,
        };
        if supplied.is_some() {
            return Ok(supplied);
        }

        let default_key = match self.spec.profile().version {
            Version::V1_2 => "defaultValue",
            Version::V2_0 => "default",
        };
        let default = declaration.get(default_key).cloned();
        if default.is_some() {
            return Ok(default);
        }

        if declaration.get("required").and_then(Value::as_bool) == Some(true) {
            return Err(ContractViolation::param(name, "is required"));
        }
        Ok(None)
    }

    /// The model reference a body parameter declares, if any, and whether it
    /// applies per array element.
    fn body_model_reference(&self, declaration: &Value) -> Option<(String, bool)> {
        match self.spec.profile().version {
            Version::V2_0 => {
                let schema = declaration.get("schema")?;
                if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
                    return Some((reference.to_string(), false));
                }
                if schema.get("type").and_then(Value::as_str) == Some("array") {
                    let reference = schema.get("items")?.get("$ref").and_then(Value::as_str)?;
                    return Some((reference.to_string(), true));
                }
                None
            }
            Version::V1_2 => {
                let type_name = declaration.get("type").and_then(Value::as_str)?;
                if type_name == "array" {
                    let items = declaration.get("items")?;
                    if let Some(reference) = items.get("$ref").and_then(Value::as_str) {
                        return Some((reference.to_string(), true));
                    }
                    let item_type = items.get("type").and_then(Value::as_str)?;
                    if !self.spec.profile().is_primitive(item_type) {
                        return Some((item_type.to_string(), true));
                    }
                    return None;
                }
                if !self.spec.profile().is_primitive(type_name) {
                    return Some((type_name.to_string(), false));
                }
                None
            }
        }
    }

    /// Composes the referenced model and validates the body (or each body
    /// element) against the composed schema.
    fn check_body_model(
        &self,
        document: &SpecDocument,
        name: &str,
        reference: &str,
        per_element: bool,
        value: &Value,
    ) -> Result<(), ContractViolation> {
        let display = if reference.starts_with("#/") {
            model_name(reference)
        } else {
            reference.to_string()
        };

        let mut check = |instance: &Value| -> Result<(), ContractViolation> {
            match self.spec.validate_model_instance(document, reference, instance) {
                Ok(None) => Ok(()),
                Ok(Some(_)) => Err(ContractViolation::param(
                    name,
                    format!("is not a valid {} model", display),
                )),
                Err(err) => Err(ContractViolation::internal(err.to_string())),
            }
        };

        match (per_element, value.as_array()) {
            (true, Some(elements)) => {
                for element in elements {
                    check(element)?;
                }
                Ok(())
            }
            _ => check(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_not_allowed_lists_alphabetical_upper() {
        let defined = vec!["get".to_string(), "DELETE".to_string()];
        let err = check_method_allowed("PUT", &defined).unwrap_err();
        assert_eq!(err.allow_header(), "DELETE, GET");
        assert_eq!(
            err.to_string(),
            "Route defined in Swagger specification but there is no defined put operation."
        );
        assert!(check_method_allowed("GET", &defined).is_ok());
    }

    #[test]
    fn test_violation_kinds() {
        let failed = ContractViolation::param("mock", "is required");
        assert!(failed.failed_validation);
        assert_eq!(failed.to_string(), "Parameter (mock) is required");

        let internal = ContractViolation::internal("bad pattern");
        assert!(!internal.failed_validation);
    }
}
