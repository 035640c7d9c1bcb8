//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the crate.
//!
//! Request-level contract violations are deliberately *not* part of this
//! enum; they are a separate typed error (`request::ContractViolation`)
//! because callers translate them into transport failures rather than
//! treating them as programming errors.

use crate::spec::issues::ValidationResult;
use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// A bundled JSON Schema failed to parse or compile.
    /// Created explicitly to avoid conflict with General.
    #[from(ignore)]
    #[display("Schema Error: {_0}")]
    Schema(String),

    /// The source document failed structural or semantic validation, so the
    /// requested operation (composition, instance validation) cannot
    /// proceed. Carries the collected errors and warnings.
    #[display("Document failed validation with {} error(s)", _0.errors.len())]
    InvalidDocument(ValidationResult),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_conversion() {
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_invalid_document_display() {
        let mut result = ValidationResult::default();
        result.errors.push(crate::spec::issues::ValidationIssue::new(
            "UNRESOLVABLE_MODEL",
            "Model could not be resolved: Pet",
            vec!["models".into(), "Pet".into()],
        ));
        let app_err = AppError::InvalidDocument(result);
        assert_eq!(
            format!("{}", app_err),
            "Document failed validation with 1 error(s)"
        );
    }
}
