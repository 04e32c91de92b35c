//! Error types for the API surface.
//!
//! Every engine and store error is recoverable here: it becomes a 4xx JSON
//! response carrying a stable shape and a human-readable message. Nothing
//! short of an infrastructure failure produces a 5xx, and no error is fatal
//! to the process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use libris_db::DbError;
use libris_engine::CirculationError;

/// API errors, shaped for the wire.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 404 with `{"error": ...}`
    #[error("{0}")]
    NotFound(String),

    /// 400 with `{"error": ...}` - conflicts, invalid state, bad input
    #[error("{0}")]
    BadRequest(String),

    /// 400 with `{"message": ...}` - the fee pay/unpay no-op rejection keeps
    /// the original field name its clients expect
    #[error("{0}")]
    FeeState(String),

    /// 401 with `{"error": ...}`
    #[error("{0}")]
    Unauthorized(String),

    /// 403 with `{"error": ...}`
    #[error("{0}")]
    Forbidden(String),

    /// 500 with `{"error": ...}`; message is logged, not leaked
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Maps a fee pay/unpay engine error, routing the no-op rejection to the
    /// `{"message": ...}` shape.
    pub fn from_fee_transition(err: CirculationError) -> Self {
        match err {
            CirculationError::InvalidState { message } => ApiError::FeeState(message),
            other => other.into(),
        }
    }
}

impl From<CirculationError> for ApiError {
    fn from(err: CirculationError) -> Self {
        match err {
            CirculationError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            CirculationError::Conflict { message } => ApiError::BadRequest(message),
            CirculationError::InvalidState { message } => ApiError::BadRequest(message),
            CirculationError::Validation(v) => ApiError::BadRequest(v.to_string()),
            CirculationError::Database(db) => db.into(),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::UniqueViolation { .. } | DbError::ReferentialViolation { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<libris_core::ValidationError> for ApiError {
    fn from(err: libris_core::ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::FeeState(msg) => (StatusCode::BAD_REQUEST, json!({ "message": msg })),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_mapping() {
        let err: ApiError = CirculationError::not_found("Book", "b-404").into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError =
            CirculationError::conflict("Book 'Dune' is not available. Status: lost.").into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_fee_transition_uses_message_shape() {
        let err = ApiError::from_fee_transition(CirculationError::invalid_state(
            "Fee is already marked as paid.",
        ));
        assert!(matches!(err, ApiError::FeeState(_)));

        let err = ApiError::from_fee_transition(CirculationError::not_found("Fee", "f-404"));
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_db_error_mapping() {
        let err: ApiError = DbError::referential("User has transactions").into();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err: ApiError = DbError::PoolExhausted.into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
