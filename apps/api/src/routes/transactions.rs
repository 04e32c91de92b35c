//! Circulation endpoints: checkout, return, and transaction history.
//!
//! All transaction operations are admin-gated per the access matrix. New
//! transactions are opened exclusively through the checkout action - there
//! is no raw create endpoint, because only the engine may open a checkout
//! and flip the book's status as one atomic unit.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;

use libris_core::access::Operation;
use libris_core::{LoanTransaction, TransactionKind};
use libris_db::{Page, TransactionFilter};

use crate::auth::Principal;
use crate::error::ApiError;
use crate::AppState;

// =============================================================================
// Request Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct TransactionListParams {
    pub user_id: Option<String>,
    pub book_id: Option<String>,
    #[serde(rename = "transaction_type")]
    pub kind: Option<TransactionKind>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub user_id: String,
    pub book_id: String,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReturnRequest {
    pub return_date: Option<DateTime<Utc>>,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/transactions
pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
    Query(params): Query<TransactionListParams>,
) -> Result<Json<Vec<LoanTransaction>>, ApiError> {
    principal.require(Operation::TransactionAny)?;

    let filter = TransactionFilter {
        user_id: params.user_id,
        book_id: params.book_id,
        kind: params.kind,
    };

    let page = Page::new(params.limit.unwrap_or(20), params.offset.unwrap_or(0));
    let records = state.db.transactions().list(&filter, page).await?;

    Ok(Json(records))
}

/// GET /api/transactions/{id}
pub async fn get(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<LoanTransaction>, ApiError> {
    principal.require(Operation::TransactionAny)?;

    let record = state
        .db
        .transactions()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Transaction not found: {id}")))?;

    Ok(Json(record))
}

/// POST /api/transactions/checkout
///
/// 201 with the created transaction, or 400 when the book is unavailable.
pub async fn checkout(
    State(state): State<AppState>,
    principal: Principal,
    Json(body): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<LoanTransaction>), ApiError> {
    principal.require(Operation::TransactionAny)?;

    let record = state
        .engine
        .checkout(&body.user_id, &body.book_id, body.due_date)
        .await?;

    info!(
        transaction_id = %record.id,
        by = %principal.username,
        "Checkout processed"
    );

    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /api/transactions/{id}/return
///
/// The body is optional; an absent or empty body means "returned now".
pub async fn process_return(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    body: Option<Json<ReturnRequest>>,
) -> Result<Json<LoanTransaction>, ApiError> {
    principal.require(Operation::TransactionAny)?;

    let return_date = body.map(|Json(b)| b.return_date).unwrap_or_default();

    let record = state.engine.return_book(&id, return_date).await?;

    info!(
        transaction_id = %record.id,
        by = %principal.username,
        "Return processed"
    );

    Ok(Json(record))
}

/// DELETE /api/transactions/{id}
pub async fn remove(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    principal.require(Operation::TransactionAny)?;

    state.db.transactions().delete(&id).await?;

    info!(id = %id, "Transaction deleted");

    Ok(StatusCode::NO_CONTENT)
}
