#![deny(missing_docs)]

//! # Model Graph
//!
//! Walks a document unit's model/definition declarations, builds a metadata
//! graph (schema, declared parents, inbound references) and composes each
//! model via inheritance resolution with cycle and multiple-inheritance
//! detection.
//!
//! Inheritance is represented as an explicit directed graph (node = model
//! pointer, edges = declared parents) walked with three-color DFS. The graph
//! tolerates forward references, multiple parents (a dialect v1 error case)
//! and cycles, which are detected rather than recursed into.

use crate::spec::issues::{codes, ValidationIssue, ValidationResult};
use crate::spec::profile::{Version, VersionProfile};
use crate::spec::refs::{model_name, model_pointer};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Metadata for one declared or referenced model.
#[derive(Debug, Clone, Default)]
pub struct ModelMetadata {
    /// Display name (declaration key, or `id` field for dialect v1).
    pub name: String,
    /// Location of the declaration in the source document.
    pub path: Vec<String>,
    /// The declared schema; `None` for models that are only referenced.
    pub schema: Option<Value>,
    /// Fully merged (ancestor + own) schema; self-contained.
    pub composed: Option<Value>,
    /// Canonical pointers of declared parents.
    pub parents: Vec<String>,
    /// Every document location that points at this model.
    pub refs: Vec<Vec<String>>,
}

/// The composed model graph for one document unit, plus the issues found
/// while building it.
#[derive(Debug, Clone, Default)]
pub struct CompiledModelGraph {
    /// Model pointer → metadata.
    pub metadata: IndexMap<String, ModelMetadata>,
    /// Issues collected during graph construction and composition.
    pub results: ValidationResult,
}

impl CompiledModelGraph {
    /// The composed schema for a model pointer, when the model resolved.
    pub fn composed(&self, pointer: &str) -> Option<&Value> {
        self.metadata.get(pointer).and_then(|m| m.composed.as_ref())
    }

    /// True when the pointer names a declared model in this graph.
    pub fn contains(&self, pointer: &str) -> bool {
        self.metadata
            .get(pointer)
            .map_or(false, |m| m.schema.is_some())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Builds and composes the model graph for one document unit (a v1 API
/// declaration, or the whole v2 document).
pub struct ModelGraphBuilder<'a> {
    profile: &'a VersionProfile,
    nodes: IndexMap<String, ModelMetadata>,
    results: ValidationResult,
}

impl<'a> ModelGraphBuilder<'a> {
    /// Creates an empty builder for the dialect.
    pub fn new(profile: &'a VersionProfile) -> Self {
        ModelGraphBuilder {
            profile,
            nodes: IndexMap::new(),
            results: ValidationResult::default(),
        }
    }

    /// Scans, composes and reports; consumes the builder.
    pub fn build(mut self, unit: &Value) -> CompiledModelGraph {
        match self.profile.version {
            Version::V1_2 => self.scan_v1(unit),
            Version::V2_0 => self.scan_v2(unit),
        }
        debug!(models = self.nodes.len(), "model graph scanned");

        self.compose_all();
        self.inline_composed_refs();
        self.report_unresolved_and_unused();

        CompiledModelGraph {
            metadata: self.nodes,
            results: self.results,
        }
    }

    fn scan_v2(&mut self, document: &Value) {
        if let Some(definitions) = document.get("definitions").and_then(Value::as_object) {
            for (name, schema) in definitions {
                let pointer = model_pointer(self.profile, name);
                let node = self.node_mut(&pointer);
                node.name = name.clone();
                node.path = vec!["definitions".to_string(), name.clone()];
                node.schema = Some(schema.clone());

                let mut parents = Vec::new();
                if let Some(all_of) = schema.get("allOf").and_then(Value::as_array) {
                    for member in all_of {
                        if let Some(reference) = member.get("$ref").and_then(Value::as_str) {
                            parents.push(model_pointer(self.profile, reference));
                        }
                    }
                }
                self.node_mut(&pointer).parents = parents;
            }
        }

        self.walk_refs(document, &mut Vec::new());
    }

    fn scan_v1(&mut self, declaration: &Value) {
        if let Some(models) = declaration.get("models").and_then(Value::as_object) {
            for (key, model) in models {
                let pointer = model_pointer(self.profile, key);
                let name = model
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or(key)
                    .to_string();
                let node = self.node_mut(&pointer);
                node.name = name;
                node.path = vec!["models".to_string(), key.clone()];
                node.schema = Some(model.clone());

                // v1 declares inheritance on the parent: `subTypes` lists the
                // children, so the recorded edge is reversed.
                if let Some(sub_types) = model.get("subTypes").and_then(Value::as_array) {
                    for (index, sub_type) in sub_types.iter().enumerate() {
                        let Some(child_id) = sub_type.as_str() else {
                            continue;
                        };
                        let child_pointer = model_pointer(self.profile, child_id);
                        let child = self.node_mut(&child_pointer);
                        if !child.parents.contains(&pointer) {
                            child.parents.push(pointer.clone());
                        }
                        self.register_ref(
                            &child_pointer,
                            vec![
                                "models".to_string(),
                                key.clone(),
                                "subTypes".to_string(),
                                index.to_string(),
                            ],
                        );
                    }
                }
            }
        }

        self.walk_refs(declaration, &mut Vec::new());
    }

    /// Recursive walk recording an inbound reference for every document
    /// location that points at a model. Placeholder nodes are created on
    /// first reference, so forward and unresolved references stay
    /// representable.
    fn walk_refs(&mut self, value: &Value, location: &mut Vec<String>) {
        match value {
            Value::Object(map) => {
                for (key, entry) in map {
                    location.push(key.clone());
                    if let Some(pointer) = self.reference_in(key, entry) {
                        self.register_ref(&pointer, location.clone());
                    }
                    self.walk_refs(entry, location);
                    location.pop();
                }
            }
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    location.push(index.to_string());
                    self.walk_refs(item, location);
                    location.pop();
                }
            }
            _ => {}
        }
    }

    /// Returns the canonical pointer when `key: entry` is a model reference.
    fn reference_in(&self, key: &str, entry: &Value) -> Option<String> {
        let value = entry.as_str()?;
        match self.profile.version {
            Version::V2_0 => {
                if key == "$ref" && value.starts_with("#/definitions/") {
                    Some(value.to_string())
                } else {
                    None
                }
            }
            Version::V1_2 => {
                let is_reference = key == "$ref"
                    || ((key == "type" || key == "responseModel")
                        && !self.profile.is_primitive(value));
                if is_reference {
                    Some(model_pointer(self.profile, value))
                } else {
                    None
                }
            }
        }
    }

    fn node_mut(&mut self, pointer: &str) -> &mut ModelMetadata {
        self.nodes
            .entry(pointer.to_string())
            .or_insert_with(|| ModelMetadata {
                name: model_name(pointer),
                ..Default::default()
            })
    }

    fn register_ref(&mut self, pointer: &str, location: Vec<String>) {
        self.node_mut(pointer).refs.push(location);
    }

    fn compose_all(&mut self) {
        let ids: Vec<String> = self.nodes.keys().cloned().collect();
        let mut colors: HashMap<String, Color> = HashMap::new();
        let mut stack: Vec<String> = Vec::new();
        for id in &ids {
            self.compose(id, &mut colors, &mut stack);
        }
    }

    /// Depth-first composition with three-color marking: white = unvisited,
    /// gray = on the current recursion stack, black = fully composed.
    /// Run once per model; idempotent via the color map.
    fn compose(&mut self, id: &str, colors: &mut HashMap<String, Color>, stack: &mut Vec<String>) {
        match colors.get(id).copied().unwrap_or(Color::White) {
            Color::Black => return,
            Color::Gray => {
                // A gray node closes a cycle. Record the gray names from the
                // first repetition back to itself and treat the repeated
                // edge as a no-op so the walk terminates.
                let start = stack.iter().position(|s| s == id).unwrap_or(0);
                let mut cycle: Vec<String> =
                    stack[start..].iter().map(|s| self.display_name(s)).collect();
                cycle.push(self.display_name(id));
                let path = self
                    .nodes
                    .get(id)
                    .map(|n| n.path.clone())
                    .unwrap_or_default();
                self.results.errors.push(
                    ValidationIssue::new(
                        codes::CYCLICAL_MODEL_INHERITANCE,
                        format!("Model has a circular inheritance: {}", cycle.join(" -> ")),
                        path,
                    )
                    .with_data(json!(cycle)),
                );
                return;
            }
            Color::White => {}
        }
        colors.insert(id.to_string(), Color::Gray);
        stack.push(id.to_string());

        let Some(node) = self.nodes.get(id) else {
            stack.pop();
            colors.insert(id.to_string(), Color::Black);
            return;
        };
        let parents = node.parents.clone();
        let schema = node.schema.clone();
        let node_path = node.path.clone();

        if let Some(schema) = schema {
            let own_properties = object_of(&schema, "properties");
            let own_required = string_list(&schema, "required");

            let mut properties: Map<String, Value> = Map::new();
            let mut required: Vec<String> = Vec::new();

            if self.profile.version == Version::V1_2 && parents.len() > 1 {
                let parent_names: Vec<String> =
                    parents.iter().map(|p| self.display_name(p)).collect();
                self.results.errors.push(
                    ValidationIssue::new(
                        codes::MULTIPLE_MODEL_INHERITANCE,
                        format!(
                            "Child model is sub type of multiple models: {}",
                            parent_names.join(" && ")
                        ),
                        node_path.clone(),
                    )
                    .with_data(json!(parent_names)),
                );
            } else {
                // Parents compose before self.
                for parent in &parents {
                    self.compose(parent, colors, stack);
                    let Some(parent_composed) =
                        self.nodes.get(parent).and_then(|n| n.composed.clone())
                    else {
                        continue;
                    };
                    for (name, property) in object_of(&parent_composed, "properties") {
                        if own_properties.contains_key(&name) {
                            let mut path = node_path.clone();
                            path.push("properties".to_string());
                            path.push(name.clone());
                            self.results.errors.push(
                                ValidationIssue::new(
                                    codes::CHILD_MODEL_REDECLARES_PROPERTY,
                                    format!(
                                        "Child model declares property already declared by ancestor: {}",
                                        name
                                    ),
                                    path,
                                )
                                .with_data(json!(name)),
                            );
                            continue;
                        }
                        properties.entry(name).or_insert(property);
                    }
                    for name in string_list(&parent_composed, "required") {
                        if !required.contains(&name) {
                            required.push(name);
                        }
                    }
                }
            }

            // Inline composition clauses (v2 allOf members without $ref)
            // merge like the model's own declarations.
            if let Some(all_of) = schema.get("allOf").and_then(Value::as_array) {
                for member in all_of {
                    if member.get("$ref").is_some() {
                        continue;
                    }
                    for (name, property) in object_of(member, "properties") {
                        properties.insert(name, property);
                    }
                    for name in string_list(member, "required") {
                        if !required.contains(&name) {
                            required.push(name);
                        }
                    }
                }
            }

            // Own declarations merge last; no redeclaration check against self.
            for (name, property) in own_properties {
                properties.insert(name, property);
            }
            for name in &own_required {
                if !required.contains(name) {
                    required.push(name.clone());
                }
            }

            for name in &own_required {
                if !properties.contains_key(name) {
                    let mut path = node_path.clone();
                    path.push("required".to_string());
                    self.results.errors.push(
                        ValidationIssue::new(
                            codes::MISSING_REQUIRED_MODEL_PROPERTY,
                            format!("Model requires property but it is not defined: {}", name),
                            path,
                        )
                        .with_data(json!(name)),
                    );
                }
            }

            let mut composed = schema.clone();
            if let Some(map) = composed.as_object_mut() {
                map.remove("allOf");
                map.remove("subTypes");
                map.insert("properties".to_string(), Value::Object(properties));
                if required.is_empty() {
                    map.remove("required");
                } else {
                    map.insert("required".to_string(), json!(required));
                }
            }
            if let Some(node) = self.nodes.get_mut(id) {
                node.composed = Some(composed);
            }
        }

        stack.pop();
        colors.insert(id.to_string(), Color::Black);
    }

    /// Rewrites every composed schema so that internal model references are
    /// replaced by the referenced model's composed form (with its own
    /// `id`/`title` stripped). Consumers of `composed` never chase
    /// references. Property-level reference cycles leave the reference in
    /// place instead of recursing forever.
    fn inline_composed_refs(&mut self) {
        let ids: Vec<String> = self.nodes.keys().cloned().collect();
        for id in ids {
            let Some(composed) = self.nodes.get(&id).and_then(|n| n.composed.clone()) else {
                continue;
            };
            let mut visited: HashSet<String> = HashSet::new();
            visited.insert(id.clone());
            let inlined = self.inline_value(composed, &mut visited);
            if let Some(node) = self.nodes.get_mut(&id) {
                node.composed = Some(inlined);
            }
        }
    }

    fn inline_value(&self, value: Value, visited: &mut HashSet<String>) -> Value {
        match value {
            Value::Object(map) => {
                if let Some(pointer) = self.inline_target(&map) {
                    if self
                        .nodes
                        .get(&pointer)
                        .map_or(false, |n| n.composed.is_some())
                    {
                        if visited.insert(pointer.clone()) {
                            let mut target = self
                                .nodes
                                .get(&pointer)
                                .and_then(|n| n.composed.clone())
                                .unwrap_or(Value::Null);
                            if let Some(target_map) = target.as_object_mut() {
                                target_map.remove("id");
                                target_map.remove("title");
                            }
                            let inlined = self.inline_value(target, visited);
                            visited.remove(&pointer);
                            return inlined;
                        }
                        return Value::Object(map);
                    }
                }
                let mut out = Map::with_capacity(map.len());
                for (key, entry) in map {
                    out.insert(key, self.inline_value(entry, visited));
                }
                Value::Object(out)
            }
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.inline_value(item, visited))
                    .collect(),
            ),
            other => other,
        }
    }

    /// The canonical pointer when a schema object is itself a model
    /// reference (`$ref`, or a v1 non-primitive `type`).
    fn inline_target(&self, map: &Map<String, Value>) -> Option<String> {
        if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
            return Some(model_pointer(self.profile, reference));
        }
        if self.profile.version == Version::V1_2 {
            if let Some(type_name) = map.get("type").and_then(Value::as_str) {
                if !self.profile.is_primitive(type_name) {
                    return Some(model_pointer(self.profile, type_name));
                }
            }
        }
        None
    }

    fn report_unresolved_and_unused(&mut self) {
        for node in self.nodes.values() {
            if node.schema.is_none() && !node.refs.is_empty() {
                for location in &node.refs {
                    self.results.errors.push(
                        ValidationIssue::new(
                            codes::UNRESOLVABLE_MODEL,
                            format!("Model could not be resolved: {}", node.name),
                            location.clone(),
                        )
                        .with_data(json!(node.name)),
                    );
                }
            }
            // Dead but not invalid; dialect v1 only.
            if self.profile.version == Version::V1_2
                && node.schema.is_some()
                && node.refs.is_empty()
            {
                self.results.warnings.push(
                    ValidationIssue::new(
                        codes::UNUSED_MODEL,
                        format!("Model is defined but is not used: {}", node.name),
                        node.path.clone(),
                    )
                    .with_data(json!(node.name)),
                );
            }
        }
    }

    fn display_name(&self, pointer: &str) -> String {
        self.nodes
            .get(pointer)
            .map(|n| n.name.clone())
            .unwrap_or_else(|| model_name(pointer))
    }
}

fn object_of(schema: &Value, key: &str) -> Map<String, Value> {
    schema
        .get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn string_list(schema: &Value, key: &str) -> Vec<String> {
    schema
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build_v2(definitions: Value) -> CompiledModelGraph {
        let profile = VersionProfile::new(Version::V2_0);
        let document = json!({
            "swagger": "2.0",
            "info": {"title": "t", "version": "1"},
            "paths": {},
            "definitions": definitions
        });
        ModelGraphBuilder::new(&profile).build(&document)
    }

    fn build_v1(models: Value) -> CompiledModelGraph {
        let profile = VersionProfile::new(Version::V1_2);
        let declaration = json!({
            "swaggerVersion": "1.2",
            "basePath": "/api",
            "apis": [],
            "models": models
        });
        ModelGraphBuilder::new(&profile).build(&declaration)
    }

    #[test]
    fn test_parentless_model_composes_to_itself() {
        let graph = build_v2(json!({
            "Pet": {
                "properties": {
                    "id": {"type": "integer"},
                    "name": {"type": "string"}
                },
                "required": ["id", "name"]
            }
        }));
        let composed = graph.composed("#/definitions/Pet").unwrap();
        assert_eq!(
            composed["properties"],
            json!({"id": {"type": "integer"}, "name": {"type": "string"}})
        );
        assert_eq!(composed["required"], json!(["id", "name"]));
    }

    #[test]
    fn test_allof_parent_properties_merge() {
        let graph = build_v2(json!({
            "Base": {
                "properties": {"id": {"type": "integer"}},
                "required": ["id"]
            },
            "Pet": {
                "allOf": [{"$ref": "#/definitions/Base"}],
                "properties": {"name": {"type": "string"}},
                "required": ["name"]
            }
        }));
        assert!(!graph.results.has_errors(), "{:?}", graph.results);
        let composed = graph.composed("#/definitions/Pet").unwrap();
        assert!(composed["properties"]["id"].is_object());
        assert!(composed["properties"]["name"].is_object());
        // Union, not concatenation.
        assert_eq!(composed["required"], json!(["id", "name"]));
        assert!(composed.get("allOf").is_none());
    }

    #[test]
    fn test_direct_cycle_emits_one_issue_and_terminates() {
        let graph = build_v2(json!({
            "A": {"allOf": [{"$ref": "#/definitions/B"}], "properties": {}},
            "B": {"allOf": [{"$ref": "#/definitions/A"}], "properties": {}}
        }));
        let cycles: Vec<_> = graph
            .results
            .errors
            .iter()
            .filter(|i| i.code == codes::CYCLICAL_MODEL_INHERITANCE)
            .collect();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].data, Some(json!(["A", "B", "A"])));
    }

    #[test]
    fn test_v1_multiple_inheritance_keeps_own_properties() {
        let graph = build_v1(json!({
            "A": {"id": "A", "properties": {"a": {"type": "string"}}, "subTypes": ["C"]},
            "B": {"id": "B", "properties": {"b": {"type": "string"}}, "subTypes": ["C"]},
            "C": {"id": "C", "properties": {"c": {"type": "string"}}}
        }));
        assert!(graph
            .results
            .errors
            .iter()
            .any(|i| i.code == codes::MULTIPLE_MODEL_INHERITANCE));
        let composed = graph.composed("#/models/C").unwrap();
        assert_eq!(composed["properties"], json!({"c": {"type": "string"}}));
    }

    #[test]
    fn test_child_redeclaring_property_wins() {
        let graph = build_v2(json!({
            "Base": {"properties": {"name": {"type": "integer"}}},
            "Pet": {
                "allOf": [{"$ref": "#/definitions/Base"}],
                "properties": {"name": {"type": "string"}}
            }
        }));
        assert!(graph
            .results
            .errors
            .iter()
            .any(|i| i.code == codes::CHILD_MODEL_REDECLARES_PROPERTY));
        let composed = graph.composed("#/definitions/Pet").unwrap();
        assert_eq!(composed["properties"]["name"], json!({"type": "string"}));
    }

    #[test]
    fn test_missing_required_property_reported() {
        let graph = build_v2(json!({
            "Pet": {
                "properties": {"id": {"type": "integer"}},
                "required": ["id", "name"]
            }
        }));
        let missing: Vec<_> = graph
            .results
            .errors
            .iter()
            .filter(|i| i.code == codes::MISSING_REQUIRED_MODEL_PROPERTY)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].data, Some(json!("name")));
    }

    #[test]
    fn test_unresolved_reference_reported_per_location() {
        let profile = VersionProfile::new(Version::V2_0);
        let document = json!({
            "swagger": "2.0",
            "info": {"title": "t", "version": "1"},
            "paths": {
                "/pets": {
                    "get": {
                        "responses": {
                            "200": {
                                "description": "ok",
                                "schema": {"$ref": "#/definitions/Pet"}
                            }
                        }
                    }
                }
            }
        });
        let graph = ModelGraphBuilder::new(&profile).build(&document);
        let unresolved: Vec<_> = graph
            .results
            .errors
            .iter()
            .filter(|i| i.code == codes::UNRESOLVABLE_MODEL)
            .collect();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(
            unresolved[0].path,
            vec!["paths", "/pets", "get", "responses", "200", "schema", "$ref"]
        );
    }

    #[test]
    fn test_v1_unreferenced_model_is_warning() {
        let graph = build_v1(json!({
            "Orphan": {"id": "Orphan", "properties": {}}
        }));
        assert!(graph.results.errors.is_empty());
        assert!(graph
            .results
            .warnings
            .iter()
            .any(|i| i.code == codes::UNUSED_MODEL && i.data == Some(json!("Orphan"))));
    }

    #[test]
    fn test_composition_is_idempotent() {
        let definitions = json!({
            "Base": {"properties": {"id": {"type": "integer"}}, "required": ["id"]},
            "Pet": {
                "allOf": [{"$ref": "#/definitions/Base"}],
                "properties": {"name": {"type": "string"}}
            }
        });
        let first = build_v2(definitions.clone());
        let second = build_v2(definitions);
        assert_eq!(
            first.composed("#/definitions/Pet"),
            second.composed("#/definitions/Pet")
        );
    }

    #[test]
    fn test_composed_schemas_are_self_contained() {
        let graph = build_v2(json!({
            "Category": {
                "id": "Category",
                "title": "Category",
                "properties": {"label": {"type": "string"}}
            },
            "Pet": {
                "properties": {
                    "category": {"$ref": "#/definitions/Category"}
                }
            }
        }));
        let composed = graph.composed("#/definitions/Pet").unwrap();
        let category = &composed["properties"]["category"];
        assert!(category.get("$ref").is_none());
        assert_eq!(category["properties"]["label"], json!({"type": "string"}));
        // Referenced model's own id/title are stripped on inlining.
        assert!(category.get("id").is_none());
        assert!(category.get("title").is_none());
    }

    #[test]
    fn test_property_reference_cycle_leaves_ref_in_place() {
        let graph = build_v2(json!({
            "Person": {"properties": {"pet": {"$ref": "#/definitions/Pet"}}},
            "Pet": {"properties": {"owner": {"$ref": "#/definitions/Person"}}}
        }));
        // No inheritance cycle here, only a property-level one.
        assert!(graph.results.errors.is_empty(), "{:?}", graph.results);
        let composed = graph.composed("#/definitions/Pet").unwrap();
        let inner = &composed["properties"]["owner"]["properties"]["pet"];
        assert_eq!(inner["$ref"], json!("#/definitions/Pet"));
    }
}
