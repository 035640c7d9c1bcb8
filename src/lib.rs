#![deny(missing_docs)]

//! # Swagger Contract
//!
//! Semantic validator and model composition engine for Swagger 1.2 and 2.0
//! API descriptions, plus a runtime contract validator for inbound requests
//! matched against a validated document.

/// Shared error types.
pub mod error;

/// Document-side validation: structure, model graphs, semantics, caching.
pub mod spec;

/// Request-side validation: parameters, content types, body models.
pub mod request;

pub use crate::error::{AppError, AppResult};
pub use crate::request::{
    check_method_allowed, ContractViolation, IncomingRequest, MethodNotAllowed,
    OperationDescriptor, RequestValidator,
};
pub use crate::spec::document::SpecDocument;
pub use crate::spec::issues::{ValidationIssue, ValidationResult};
pub use crate::spec::profile::Version;
pub use crate::spec::SpecValidator;
