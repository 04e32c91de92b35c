//! Fee endpoints.
//!
//! Overdue fees appear automatically when late books are returned; this
//! surface covers manual fees (lost book, damage), the admin read side,
//! and the pay/unpay transitions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use libris_core::access::Operation;
use libris_core::validation::validate_fee_amount;
use libris_core::{Fee, FeeKind};
use libris_db::{FeeFilter, NewFee, Page};

use crate::auth::Principal;
use crate::error::ApiError;
use crate::AppState;

// =============================================================================
// Request Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct FeeListParams {
    pub user_id: Option<String>,
    pub paid_status: Option<bool>,
    #[serde(rename = "fee_type")]
    pub kind: Option<FeeKind>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct FeeCreate {
    pub user_id: String,
    pub book_id: Option<String>,
    pub transaction_id: Option<String>,
    #[serde(rename = "fee_type", default)]
    pub kind: FeeKind,
    pub amount_cents: i64,
    pub notes: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/fees
pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
    Query(params): Query<FeeListParams>,
) -> Result<Json<Vec<Fee>>, ApiError> {
    principal.require(Operation::FeeAny)?;

    let filter = FeeFilter {
        user_id: params.user_id,
        paid_status: params.paid_status,
        kind: params.kind,
    };

    let page = Page::new(params.limit.unwrap_or(20), params.offset.unwrap_or(0));
    let fees = state.db.fees().list(&filter, page).await?;

    Ok(Json(fees))
}

/// GET /api/fees/{id}
pub async fn get(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<Fee>, ApiError> {
    principal.require(Operation::FeeAny)?;

    let fee = state
        .db
        .fees()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Fee not found: {id}")))?;

    Ok(Json(fee))
}

/// POST /api/fees
///
/// Manual fee creation (lost book, damage). Overdue fees are never created
/// here.
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Json(body): Json<FeeCreate>,
) -> Result<(StatusCode, Json<Fee>), ApiError> {
    principal.require(Operation::FeeAny)?;

    validate_fee_amount(body.amount_cents)?;

    // Unknown user/book/transaction references surface as referential
    // violations from the store and come back as 400s.
    let fee = state
        .db
        .fees()
        .insert(NewFee {
            user_id: body.user_id,
            book_id: body.book_id,
            transaction_id: body.transaction_id,
            kind: body.kind,
            amount_cents: body.amount_cents,
            notes: body.notes,
        })
        .await?;

    info!(id = %fee.id, amount = fee.amount_cents, by = %principal.username, "Manual fee created");

    Ok((StatusCode::CREATED, Json(fee)))
}

/// POST /api/fees/{id}/mark-as-paid
pub async fn mark_as_paid(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<Fee>, ApiError> {
    principal.require(Operation::FeeAny)?;

    let fee = state
        .engine
        .mark_fee_paid(&id)
        .await
        .map_err(ApiError::from_fee_transition)?;

    Ok(Json(fee))
}

/// POST /api/fees/{id}/mark-as-unpaid
pub async fn mark_as_unpaid(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<Fee>, ApiError> {
    principal.require(Operation::FeeAny)?;

    let fee = state
        .engine
        .mark_fee_unpaid(&id)
        .await
        .map_err(ApiError::from_fee_transition)?;

    Ok(Json(fee))
}

/// DELETE /api/fees/{id}
pub async fn remove(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    principal.require(Operation::FeeAny)?;

    state.db.fees().delete(&id).await?;

    info!(id = %id, "Fee deleted");

    Ok(StatusCode::NO_CONTENT)
}
