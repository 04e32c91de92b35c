//! # Error Types
//!
//! Domain-specific error types for libris-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  libris-core errors (this file)                                        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  libris-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  libris-engine errors (separate crate)                                 │
//! │  └── CirculationError - State machine precondition failures            │
//! │                                                                         │
//! │  API errors (in app)                                                   │
//! │  └── ApiError         - What clients see (serialized 4xx JSON)         │
//! │                                                                         │
//! │  Flow: ValidationError → CirculationError → ApiError → Client          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, ISBN, ID, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed ISBN, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// A referenced entity does not exist (unknown foreign key).
    #[error("{field} '{value}' does not exist")]
    UnknownReference { field: String, value: String },
}

impl ValidationError {
    /// Creates a Required error.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an UnknownReference error.
    pub fn unknown_reference(field: impl Into<String>, value: impl Into<String>) -> Self {
        ValidationError::UnknownReference {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::required("isbn");
        assert_eq!(err.to_string(), "isbn is required");

        let err = ValidationError::TooLong {
            field: "title".to_string(),
            max: 255,
        };
        assert_eq!(err.to_string(), "title must be at most 255 characters");

        let err = ValidationError::unknown_reference("user_id", "u-404");
        assert_eq!(err.to_string(), "user_id 'u-404' does not exist");
    }
}
