//! # Circulation Error Types
//!
//! The engine's error taxonomy, as seen by the API surface.
//!
//! ## Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  NotFound      - unknown id (book, transaction, fee)          → 404    │
//! │  Conflict      - state precondition violated: book not                 │
//! │                  available, double-checkout race loser        → 400    │
//! │  InvalidState  - operation not applicable to current entity            │
//! │                  state: already returned, already paid        → 400    │
//! │  Validation    - malformed input, unknown foreign key         → 400    │
//! │  Database      - infrastructure failure                       → 500    │
//! │                                                                         │
//! │  Everything except Database is recoverable at the API surface.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use libris_core::ValidationError;
use libris_db::DbError;

/// Circulation engine errors.
#[derive(Debug, Error)]
pub enum CirculationError {
    /// The addressed entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A state precondition was violated.
    ///
    /// ## When This Occurs
    /// - Checking out a book whose status is not `available`
    /// - Losing the double-checkout race (unique index on open checkouts)
    #[error("{message}")]
    Conflict { message: String },

    /// The operation is not applicable to the entity's current state.
    ///
    /// ## When This Occurs
    /// - Returning a transaction that is not an open checkout
    /// - Marking a fee paid/unpaid when it already is
    #[error("{message}")]
    InvalidState { message: String },

    /// Malformed input (missing required field, unknown foreign key).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Underlying database failure.
    #[error(transparent)]
    Database(#[from] DbError),
}

impl CirculationError {
    /// Creates a NotFound error.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CirculationError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        CirculationError::Conflict {
            message: message.into(),
        }
    }

    /// Creates an InvalidState error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        CirculationError::InvalidState {
            message: message.into(),
        }
    }
}

/// sqlx errors arrive via the DbError mapping; call sites that expect a
/// unique-constraint hit (the checkout race) convert it to Conflict
/// explicitly.
impl From<sqlx::Error> for CirculationError {
    fn from(err: sqlx::Error) -> Self {
        CirculationError::Database(DbError::from(err))
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, CirculationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CirculationError::not_found("Transaction", "t-404");
        assert_eq!(err.to_string(), "Transaction not found: t-404");

        let err = CirculationError::conflict("Book 'Dune' is not available. Status: borrowed.");
        assert_eq!(
            err.to_string(),
            "Book 'Dune' is not available. Status: borrowed."
        );
    }

    #[test]
    fn test_db_error_passthrough() {
        let err: CirculationError = DbError::PoolExhausted.into();
        assert_eq!(err.to_string(), "Connection pool exhausted");
    }
}
