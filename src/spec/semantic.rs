#![deny(missing_docs)]

//! # Semantic Validation
//!
//! Cross-document rules that run after structural validation succeeds:
//! duplicate declarations, unresolvable references, path-parameter
//! consistency and declared-but-unused warnings. Checks run in a fixed
//! order per dialect so that multiple violations on the same data surface
//! deterministically.
//!
//! Model resolution issues are not produced here; they come out of the
//! model graph.

use crate::spec::document::SpecDocument;
use crate::spec::issues::{codes, ValidationIssue, ValidationResult};
use crate::spec::paths::PathTemplate;
use crate::spec::profile::{Version, VersionProfile};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use tracing::debug;

const HTTP_METHODS: &[&str] = &["get", "put", "post", "delete", "options", "head", "patch"];
const VALID_SCHEMES: &[&str] = &["http", "https", "ws", "wss"];

/// Dialect-specific cross-document checks.
pub struct SemanticValidator<'a> {
    profile: &'a VersionProfile,
}

impl<'a> SemanticValidator<'a> {
    /// Creates a validator for the dialect.
    pub fn new(profile: &'a VersionProfile) -> Self {
        SemanticValidator { profile }
    }

    /// Runs every semantic check. For dialect v1 the returned result carries
    /// one sub-result per API declaration, in submission order.
    pub fn validate(&self, document: &SpecDocument) -> ValidationResult {
        let result = match document {
            SpecDocument::V1 {
                resource_listing,
                api_declarations,
            } => self.validate_v1(resource_listing, api_declarations),
            SpecDocument::V2(doc) => self.validate_v2(doc),
        };
        debug!(
            version = %self.profile.version,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "semantic validation finished"
        );
        result
    }

    fn validate_v2(&self, document: &Value) -> ValidationResult {
        let mut result = ValidationResult::default();

        for key in ["consumes", "produces", "schemes"] {
            check_list("API", document.get(key), vec![key.into()], &mut result);
        }

        let mut seen_templates: Vec<PathTemplate> = Vec::new();
        let Some(paths) = document.get("paths").and_then(Value::as_object) else {
            return result;
        };

        for (route, path_item) in paths {
            if route.starts_with("x-") {
                continue;
            }
            let base = vec!["paths".to_string(), route.clone()];
            let template = PathTemplate::parse(route);
            if seen_templates.contains(&template) {
                result.errors.push(
                    ValidationIssue::new(
                        codes::DUPLICATE_API_PATH,
                        format!("API path (or equivalent) already defined: {}", route),
                        base.clone(),
                    )
                    .with_data(Value::String(route.clone())),
                );
            }
            seen_templates.push(template.clone());

            let mut declared_path_params: Vec<String> = Vec::new();

            if let Some(shared) = path_item.get("parameters").and_then(Value::as_array) {
                let mut location = base.clone();
                location.push("parameters".to_string());
                self.check_parameters(
                    shared,
                    &template,
                    location,
                    codes::DUPLICATE_API_PARAMETER,
                    "API parameter",
                    &mut declared_path_params,
                    &mut result,
                );
            }

            for method in HTTP_METHODS {
                let Some(operation) = path_item.get(*method) else {
                    continue;
                };
                let mut op_location = base.clone();
                op_location.push(method.to_string());

                for key in ["consumes", "produces", "schemes"] {
                    let mut location = op_location.clone();
                    location.push(key.to_string());
                    check_list("Operation", operation.get(key), location, &mut result);
                }

                if let Some(params) = operation.get("parameters").and_then(Value::as_array) {
                    let mut location = op_location.clone();
                    location.push("parameters".to_string());
                    self.check_parameters(
                        params,
                        &template,
                        location,
                        codes::DUPLICATE_OPERATION_PARAMETER,
                        "Operation parameter",
                        &mut declared_path_params,
                        &mut result,
                    );
                }
            }

            for arg in &template.args {
                if !declared_path_params.contains(arg) {
                    result.errors.push(
                        ValidationIssue::new(
                            codes::MISSING_API_PATH_PARAMETER,
                            format!("API requires path parameter but it is not defined: {}", arg),
                            base.clone(),
                        )
                        .with_data(Value::String(route.clone())),
                    );
                }
            }
        }

        result
    }

    /// Duplicate-name and path-placeholder checks over one parameter list.
    /// Location keys differ between dialects, hence the keys struct-style
    /// arguments.
    #[allow(clippy::too_many_arguments)]
    fn check_parameters(
        &self,
        parameters: &[Value],
        template: &PathTemplate,
        location: Vec<String>,
        duplicate_code: &str,
        duplicate_label: &str,
        declared_path_params: &mut Vec<String>,
        result: &mut ValidationResult,
    ) {
        let location_key = match self.profile.version {
            Version::V1_2 => "paramType",
            Version::V2_0 => "in",
        };
        let mut seen: IndexSet<String> = IndexSet::new();
        for (index, parameter) in parameters.iter().enumerate() {
            let Some(name) = parameter.get("name").and_then(Value::as_str) else {
                continue;
            };
            let mut name_location = location.clone();
            name_location.push(index.to_string());
            name_location.push("name".to_string());

            if !seen.insert(name.to_string()) {
                result.errors.push(
                    ValidationIssue::new(
                        duplicate_code,
                        format!("{} already defined: {}", duplicate_label, name),
                        name_location.clone(),
                    )
                    .with_data(Value::String(name.to_string())),
                );
            }

            if parameter.get(location_key).and_then(Value::as_str) == Some("path") {
                if !template.args.iter().any(|a| a == name) {
                    result.errors.push(
                        ValidationIssue::new(
                            codes::UNRESOLVABLE_API_PATH_PARAMETER,
                            format!("API path parameter could not be resolved: {}", name),
                            name_location,
                        )
                        .with_data(Value::String(name.to_string())),
                    );
                }
                if !declared_path_params.contains(&name.to_string()) {
                    declared_path_params.push(name.to_string());
                }
            }
        }
    }

    fn validate_v1(&self, listing: &Value, declarations: &[Value]) -> ValidationResult {
        let mut result = ValidationResult::default();

        // Listing-level duplicate resource paths.
        let mut listed_paths: Vec<String> = Vec::new();
        if let Some(apis) = listing.get("apis").and_then(Value::as_array) {
            for (index, api) in apis.iter().enumerate() {
                let Some(path) = api.get("path").and_then(Value::as_str) else {
                    continue;
                };
                let location = vec!["apis".to_string(), index.to_string(), "path".to_string()];
                if listed_paths.iter().any(|p| p == path) {
                    result.errors.push(
                        ValidationIssue::new(
                            codes::DUPLICATE_RESOURCE_PATH,
                            format!("Resource path already defined: {}", path),
                            location,
                        )
                        .with_data(Value::String(path.to_string())),
                    );
                } else {
                    listed_paths.push(path.to_string());
                }
            }
        }
        if !result.errors.is_empty() {
            return result;
        }

        let global_auths = declared_authorizations(listing, &mut result);
        let mut global_usage = AuthUsage::default();
        let mut claimed_paths: Vec<String> = Vec::new();

        for declaration in declarations {
            let mut sub = ValidationResult::default();
            let local_auths = declared_authorizations(declaration, &mut sub);
            let mut local_usage = AuthUsage::default();

            if let Some(resource_path) = declaration.get("resourcePath").and_then(Value::as_str) {
                let location = vec!["resourcePath".to_string()];
                if claimed_paths.iter().any(|p| p == resource_path) {
                    sub.errors.push(
                        ValidationIssue::new(
                            codes::DUPLICATE_RESOURCE_PATH,
                            format!("Resource path already defined: {}", resource_path),
                            location.clone(),
                        )
                        .with_data(Value::String(resource_path.to_string())),
                    );
                }
                if !listed_paths.iter().any(|p| p == resource_path) {
                    sub.errors.push(
                        ValidationIssue::new(
                            codes::UNRESOLVABLE_RESOURCE_PATH,
                            format!("Resource path could not be resolved: {}", resource_path),
                            location,
                        )
                        .with_data(Value::String(resource_path.to_string())),
                    );
                }
                if !claimed_paths.iter().any(|p| p == resource_path) {
                    claimed_paths.push(resource_path.to_string());
                }
            }

            for key in ["consumes", "produces"] {
                check_list("API", declaration.get(key), vec![key.into()], &mut sub);
            }

            self.check_v1_apis(
                declaration,
                &global_auths,
                &local_auths,
                &mut global_usage,
                &mut local_usage,
                &mut sub,
            );

            report_unused_auths(declaration, &local_auths, &local_usage, &mut sub);
            result.api_declarations.push(sub);
        }

        // Listed but never claimed resource paths block validation.
        for (index, path) in listed_paths.iter().enumerate() {
            if !claimed_paths.iter().any(|p| p == path) {
                result.errors.push(
                    ValidationIssue::new(
                        codes::UNUSED_RESOURCE_PATH,
                        format!("Resource path is defined but is not used: {}", path),
                        vec!["apis".to_string(), index.to_string(), "path".to_string()],
                    )
                    .with_data(Value::String(path.clone())),
                );
            }
        }
        report_unused_auths(listing, &global_auths, &global_usage, &mut result);

        result
    }

    fn check_v1_apis(
        &self,
        declaration: &Value,
        global_auths: &IndexMap<String, Vec<String>>,
        local_auths: &IndexMap<String, Vec<String>>,
        global_usage: &mut AuthUsage,
        local_usage: &mut AuthUsage,
        result: &mut ValidationResult,
    ) {
        let Some(apis) = declaration.get("apis").and_then(Value::as_array) else {
            return;
        };
        let mut seen_templates: Vec<PathTemplate> = Vec::new();

        for (api_index, api) in apis.iter().enumerate() {
            let Some(route) = api.get("path").and_then(Value::as_str) else {
                continue;
            };
            let base = vec!["apis".to_string(), api_index.to_string()];
            let template = PathTemplate::parse(route);
            if seen_templates.contains(&template) {
                let mut location = base.clone();
                location.push("path".to_string());
                result.errors.push(
                    ValidationIssue::new(
                        codes::DUPLICATE_API_PATH,
                        format!("API path (or equivalent) already defined: {}", route),
                        location,
                    )
                    .with_data(Value::String(route.to_string())),
                );
            }
            seen_templates.push(template.clone());

            let mut declared_path_params: Vec<String> = Vec::new();
            let mut seen_methods: IndexSet<String> = IndexSet::new();

            let operations = api
                .get("operations")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            for (op_index, operation) in operations.iter().enumerate() {
                let mut op_location = base.clone();
                op_location.push("operations".to_string());
                op_location.push(op_index.to_string());

                for key in ["consumes", "produces"] {
                    let mut location = op_location.clone();
                    location.push(key.to_string());
                    check_list("Operation", operation.get(key), location, result);
                }

                if let Some(method) = operation.get("method").and_then(Value::as_str) {
                    if !seen_methods.insert(method.to_string()) {
                        let mut location = op_location.clone();
                        location.push("method".to_string());
                        result.errors.push(
                            ValidationIssue::new(
                                codes::DUPLICATE_OPERATION_METHOD,
                                format!("Operation method already defined: {}", method),
                                location,
                            )
                            .with_data(Value::String(method.to_string())),
                        );
                    }
                }

                self.check_v1_authorizations(
                    operation,
                    &op_location,
                    global_auths,
                    local_auths,
                    global_usage,
                    local_usage,
                    result,
                );

                if let Some(params) = operation.get("parameters").and_then(Value::as_array) {
                    let mut location = op_location.clone();
                    location.push("parameters".to_string());
                    self.check_parameters(
                        params,
                        &template,
                        location,
                        codes::DUPLICATE_OPERATION_PARAMETER,
                        "Operation parameter",
                        &mut declared_path_params,
                        result,
                    );
                }

                check_response_messages(operation, &op_location, result);
            }

            for arg in &template.args {
                if !declared_path_params.contains(arg) {
                    let mut location = base.clone();
                    location.push("path".to_string());
                    result.errors.push(
                        ValidationIssue::new(
                            codes::MISSING_API_PATH_PARAMETER,
                            format!("API requires path parameter but it is not defined: {}", arg),
                            location,
                        )
                        .with_data(Value::String(route.to_string())),
                    );
                }
            }
        }
    }

    /// Authorization references resolve against the declaration's own
    /// authorizations first, falling back to the resource listing's.
    #[allow(clippy::too_many_arguments)]
    fn check_v1_authorizations(
        &self,
        operation: &Value,
        op_location: &[String],
        global_auths: &IndexMap<String, Vec<String>>,
        local_auths: &IndexMap<String, Vec<String>>,
        global_usage: &mut AuthUsage,
        local_usage: &mut AuthUsage,
        result: &mut ValidationResult,
    ) {
        let Some(authorizations) = operation.get("authorizations").and_then(Value::as_object)
        else {
            return;
        };
        for (name, scopes) in authorizations {
            let mut auth_location = op_location.to_vec();
            auth_location.push("authorizations".to_string());
            auth_location.push(name.clone());

            let locally_declared = local_auths.contains_key(name);
            if !locally_declared && !global_auths.contains_key(name) {
                result.errors.push(
                    ValidationIssue::new(
                        codes::UNRESOLVABLE_AUTHORIZATION,
                        format!("Authorization could not be resolved: {}", name),
                        auth_location.clone(),
                    )
                    .with_data(Value::String(name.clone())),
                );
            }

            let usage = if locally_declared {
                &mut *local_usage
            } else {
                &mut *global_usage
            };
            usage.auths.insert(name.clone());

            let declared_scopes: Vec<&String> = local_auths
                .get(name)
                .into_iter()
                .chain(global_auths.get(name))
                .flatten()
                .collect();
            let scope_entries = scopes.as_array().map(Vec::as_slice).unwrap_or_default();
            for (scope_index, entry) in scope_entries.iter().enumerate() {
                let Some(scope) = entry.get("scope").and_then(Value::as_str) else {
                    continue;
                };
                if (locally_declared || global_auths.contains_key(name))
                    && !declared_scopes.iter().any(|s| *s == scope)
                {
                    let mut location = auth_location.clone();
                    location.push(scope_index.to_string());
                    location.push("scope".to_string());
                    result.errors.push(
                        ValidationIssue::new(
                            codes::UNRESOLVABLE_AUTHORIZATION_SCOPE,
                            format!("Authorization scope could not be resolved: {}", scope),
                            location,
                        )
                        .with_data(Value::String(scope.to_string())),
                    );
                }
                usage
                    .scopes
                    .entry(name.clone())
                    .or_default()
                    .insert(scope.to_string());
            }
        }
    }
}

/// Per-container record of which authorizations and scopes were referenced.
#[derive(Debug, Default)]
struct AuthUsage {
    auths: IndexSet<String>,
    scopes: IndexMap<String, IndexSet<String>>,
}

/// Reads a container's (listing or declaration) authorization declarations
/// into name → scope-name list, reporting duplicate scope declarations.
fn declared_authorizations(
    container: &Value,
    result: &mut ValidationResult,
) -> IndexMap<String, Vec<String>> {
    let mut out = IndexMap::new();
    let Some(authorizations) = container.get("authorizations").and_then(Value::as_object) else {
        return out;
    };
    for (name, auth) in authorizations {
        let mut scopes: Vec<String> = Vec::new();
        let entries = auth
            .get("scopes")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for (index, entry) in entries.iter().enumerate() {
            let Some(scope) = entry.get("scope").and_then(Value::as_str) else {
                continue;
            };
            if scopes.iter().any(|s| s == scope) {
                result.errors.push(
                    ValidationIssue::new(
                        codes::DUPLICATE_AUTHORIZATION_SCOPE_DEFINITION,
                        format!("Authorization scope already defined: {}", scope),
                        vec![
                            "authorizations".to_string(),
                            name.clone(),
                            "scopes".to_string(),
                            index.to_string(),
                            "scope".to_string(),
                        ],
                    )
                    .with_data(Value::String(scope.to_string())),
                );
            } else {
                scopes.push(scope.to_string());
            }
        }
        out.insert(name.clone(), scopes);
    }
    out
}

/// Declared-but-unused warnings for one container's authorizations.
fn report_unused_auths(
    container: &Value,
    declared: &IndexMap<String, Vec<String>>,
    usage: &AuthUsage,
    result: &mut ValidationResult,
) {
    for (name, scopes) in declared {
        let location = vec!["authorizations".to_string(), name.clone()];
        if !usage.auths.contains(name) {
            let data = container
                .get("authorizations")
                .and_then(|a| a.get(name))
                .cloned()
                .unwrap_or(Value::Null);
            result.warnings.push(
                ValidationIssue::new(
                    codes::UNUSED_AUTHORIZATION,
                    format!("Authorization is defined but is not used: {}", name),
                    location,
                )
                .with_data(data),
            );
            continue;
        }
        let used = usage.scopes.get(name);
        for (index, scope) in scopes.iter().enumerate() {
            if used.map_or(true, |u| !u.contains(scope)) {
                result.warnings.push(
                    ValidationIssue::new(
                        codes::UNUSED_AUTHORIZATION_SCOPE,
                        format!("Authorization scope is defined but is not used: {}", scope),
                        vec![
                            "authorizations".to_string(),
                            name.clone(),
                            "scopes".to_string(),
                            index.to_string(),
                        ],
                    )
                    .with_data(Value::String(scope.clone())),
                );
            }
        }
    }
}

fn check_response_messages(operation: &Value, op_location: &[String], result: &mut ValidationResult) {
    let Some(messages) = operation.get("responseMessages").and_then(Value::as_array) else {
        return;
    };
    let mut seen: Vec<Value> = Vec::new();
    for (index, message) in messages.iter().enumerate() {
        let Some(code) = message.get("code") else {
            continue;
        };
        if seen.contains(code) {
            let mut location = op_location.to_vec();
            location.push("responseMessages".to_string());
            location.push(index.to_string());
            location.push("code".to_string());
            result.errors.push(
                ValidationIssue::new(
                    codes::DUPLICATE_RESPONSE_MESSAGE_CODE,
                    format!("Response message code already defined: {}", code),
                    location,
                )
                .with_data(code.clone()),
            );
        } else {
            seen.push(code.clone());
        }
    }
}

/// List-shape warnings for `consumes`/`produces`/`schemes`. Never errors;
/// surfaced to the caller but do not block validation.
fn check_list(owner: &str, list: Option<&Value>, location: Vec<String>, result: &mut ValidationResult) {
    let Some(list) = list else {
        return;
    };
    let key = location.last().cloned().unwrap_or_default();
    let code = if key == "schemes" {
        codes::INVALID_SCHEMES_LIST
    } else {
        codes::INVALID_MIME_TYPE_LIST
    };
    let Some(entries) = list.as_array() else {
        result.warnings.push(
            ValidationIssue::new(
                code,
                format!("{} {} is not an array", owner, key),
                location,
            )
            .with_data(list.clone()),
        );
        return;
    };
    if entries.is_empty() {
        result.warnings.push(
            ValidationIssue::new(code, format!("{} {} is empty", owner, key), location)
                .with_data(list.clone()),
        );
        return;
    }
    if entries.iter().any(|e| !e.is_string()) {
        result.warnings.push(
            ValidationIssue::new(
                code,
                format!("{} {} contains a non-string entry", owner, key),
                location,
            )
            .with_data(list.clone()),
        );
        return;
    }
    let mut seen: IndexSet<&str> = IndexSet::new();
    if entries
        .iter()
        .filter_map(Value::as_str)
        .any(|e| !seen.insert(e))
    {
        result.warnings.push(
            ValidationIssue::new(
                code,
                format!("{} {} has duplicate items", owner, key),
                location,
            )
            .with_data(list.clone()),
        );
        return;
    }
    if key == "schemes" {
        for entry in entries.iter().filter_map(Value::as_str) {
            if !VALID_SCHEMES.contains(&entry) {
                result.warnings.push(
                    ValidationIssue::new(
                        code,
                        format!("{} {} contains an invalid scheme: {}", owner, key, entry),
                        location.clone(),
                    )
                    .with_data(Value::String(entry.to_string())),
                );
            }
        }
    }
}
