#![deny(missing_docs)]

//! # Description-Document Validation
//!
//! The document-side half of the crate: structural validation against the
//! dialect's embedded schema bundle, model graph composition, semantic
//! cross-checks and the content-addressed compilation cache, fronted by
//! [`SpecValidator`].
//!
//! Validation layering is strict: semantic checks and model composition only
//! run once the document is structurally valid, since they assume the
//! document's basic shape.

pub mod cache;
pub mod document;
pub mod graph;
pub mod issues;
pub mod paths;
pub mod profile;
pub mod refs;
pub mod semantic;
pub mod structural;

use crate::error::{AppError, AppResult};
use crate::spec::cache::{cache_key, CompilationCache};
use crate::spec::document::SpecDocument;
use crate::spec::graph::{CompiledModelGraph, ModelGraphBuilder};
use crate::spec::issues::{ValidationIssue, ValidationResult};
use crate::spec::profile::{Version, VersionProfile};
use crate::spec::refs::model_pointer;
use crate::spec::semantic::SemanticValidator;
use crate::spec::structural::StructuralValidator;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

const RESOURCE_LISTING_SCHEMA: &str = "resource-listing.json";
const API_DECLARATION_SCHEMA: &str = "api-declaration.json";
const DOCUMENT_SCHEMA: &str = "schema.json";

/// One fully processed document: collected issues plus the composed model
/// graphs (one per v1 declaration, one for a v2 document). Graphs are empty
/// when structural validation failed.
#[derive(Debug, Default)]
pub struct CompiledDocument {
    /// Structural, graph and semantic issues, merged.
    pub results: ValidationResult,
    /// Composed model graphs, in document-unit order.
    pub graphs: Vec<CompiledModelGraph>,
}

impl CompiledDocument {
    /// Looks a model pointer up across every graph.
    fn composed(&self, pointer: &str) -> Option<&Value> {
        self.graphs.iter().find_map(|g| g.composed(pointer))
    }
}

/// Validates and compiles description documents for one dialect.
///
/// Compilation is cached per validator instance, keyed by a content hash of
/// the document, so repeated validation of an unchanged document is a lookup
/// and cache state can be isolated by scoping validators. The cache is
/// unbounded.
pub struct SpecValidator {
    profile: VersionProfile,
    structural: StructuralValidator,
    cache: CompilationCache<CompiledDocument>,
}

impl SpecValidator {
    /// Builds a validator for the dialect, compiling its schema bundle.
    pub fn new(version: Version) -> AppResult<Self> {
        let profile = VersionProfile::new(version);
        let structural = StructuralValidator::new(&profile)?;
        Ok(SpecValidator {
            profile,
            structural,
            cache: CompilationCache::new(),
        })
    }

    /// The dialect profile this validator was built for.
    pub fn profile(&self) -> &VersionProfile {
        &self.profile
    }

    /// Validates a document end to end.
    ///
    /// Returns `Ok(None)` when the document is fully clean (no errors, no
    /// warnings, and for dialect v1 no per-declaration issues); otherwise the
    /// collected result.
    pub fn validate(&self, document: &SpecDocument) -> AppResult<Option<ValidationResult>> {
        let compiled = self.compiled(document)?;
        if compiled.results.is_clean() {
            Ok(None)
        } else {
            Ok(Some(compiled.results.clone()))
        }
    }

    /// Composes a model identified by bare id or pointer.
    ///
    /// Returns `Ok(None)` when the model is not declared. Fails with
    /// [`AppError::InvalidDocument`] when the document itself has errors,
    /// since composition cannot proceed on an invalid document.
    pub fn compose_model(
        &self,
        document: &SpecDocument,
        id_or_pointer: &str,
    ) -> AppResult<Option<Value>> {
        let compiled = self.compiled(document)?;
        if compiled.results.has_errors() {
            return Err(AppError::InvalidDocument(compiled.results.clone()));
        }
        let pointer = model_pointer(&self.profile, id_or_pointer);
        Ok(compiled.composed(&pointer).cloned())
    }

    /// Validates an instance against a model's composed schema.
    ///
    /// Returns `Ok(None)` when the instance is valid, or the structural
    /// issues found. Fails when the model cannot be composed.
    pub fn validate_model_instance(
        &self,
        document: &SpecDocument,
        id_or_pointer: &str,
        instance: &Value,
    ) -> AppResult<Option<Vec<ValidationIssue>>> {
        let composed = self.compose_model(document, id_or_pointer)?.ok_or_else(|| {
            AppError::General(format!(
                "Unable to compose model so validation is not possible: {}",
                id_or_pointer
            ))
        })?;
        let issues = self.structural.validate_instance(&composed, instance)?;
        if issues.is_empty() {
            Ok(None)
        } else {
            Ok(Some(issues))
        }
    }

    /// Compiles a document, via the cache.
    pub(crate) fn compiled(&self, document: &SpecDocument) -> AppResult<Arc<CompiledDocument>> {
        if document.version() != self.profile.version {
            return Err(AppError::General(format!(
                "Document version {} does not match validator version {}",
                document.version(),
                self.profile.version
            )));
        }
        let key = cache_key(document);
        Ok(self
            .cache
            .get_or_compile(&key, || self.compile_uncached(document)))
    }

    fn compile_uncached(&self, document: &SpecDocument) -> CompiledDocument {
        let mut compiled = CompiledDocument::default();

        match document {
            SpecDocument::V1 {
                resource_listing,
                api_declarations,
            } => {
                compiled.results.errors =
                    self.structural
                        .validate_bundled(RESOURCE_LISTING_SCHEMA, resource_listing);
                if !compiled.results.errors.is_empty() {
                    return compiled;
                }

                let mut structurally_broken = false;
                for declaration in api_declarations {
                    let mut sub = ValidationResult::default();
                    sub.errors = self
                        .structural
                        .validate_bundled(API_DECLARATION_SCHEMA, declaration);
                    structurally_broken |= !sub.errors.is_empty();
                    compiled.results.api_declarations.push(sub);
                }
                if structurally_broken {
                    return compiled;
                }

                let semantic = SemanticValidator::new(&self.profile).validate(document);
                compiled.results.errors = semantic.errors;
                compiled.results.warnings = semantic.warnings;
                compiled.results.api_declarations = semantic.api_declarations;

                for (index, declaration) in api_declarations.iter().enumerate() {
                    let graph = ModelGraphBuilder::new(&self.profile).build(declaration);
                    if let Some(sub) = compiled.results.api_declarations.get_mut(index) {
                        sub.absorb(graph.results.clone());
                    }
                    compiled.graphs.push(graph);
                }
            }
            SpecDocument::V2(doc) => {
                compiled.results.errors = self.structural.validate_bundled(DOCUMENT_SCHEMA, doc);
                if !compiled.results.errors.is_empty() {
                    return compiled;
                }

                let semantic = SemanticValidator::new(&self.profile).validate(document);
                compiled.results.absorb(semantic);

                let graph = ModelGraphBuilder::new(&self.profile).build(doc);
                compiled.results.absorb(graph.results.clone());
                compiled.graphs.push(graph);
            }
        }

        info!(
            version = %self.profile.version,
            errors = compiled.results.errors.len(),
            warnings = compiled.results.warnings.len(),
            "document compiled"
        );
        compiled
    }
}
