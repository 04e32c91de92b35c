//! Route assembly for the API server.

pub mod auth;
pub mod books;
pub mod fees;
pub mod transactions;
pub mod users;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;

use crate::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health probe (public)
        .route("/api/health", get(health))
        // Authentication (public)
        .route("/api/token", post(auth::obtain_token))
        .route("/api/token/refresh", post(auth::refresh_token))
        // Books
        .route("/api/books", get(books::list).post(books::create))
        .route("/api/books/search", get(books::search))
        .route(
            "/api/books/{id}",
            get(books::get).put(books::update).delete(books::remove),
        )
        // Transactions
        .route("/api/transactions", get(transactions::list))
        .route("/api/transactions/checkout", post(transactions::checkout))
        .route(
            "/api/transactions/{id}",
            get(transactions::get).delete(transactions::remove),
        )
        .route(
            "/api/transactions/{id}/return",
            post(transactions::process_return),
        )
        // Fees
        .route("/api/fees", get(fees::list).post(fees::create))
        .route("/api/fees/{id}", get(fees::get).delete(fees::remove))
        .route("/api/fees/{id}/mark-as-paid", post(fees::mark_as_paid))
        .route("/api/fees/{id}/mark-as-unpaid", post(fees::mark_as_unpaid))
        // Users
        .route("/api/users", get(users::list).post(users::create))
        .route(
            "/api/users/{id}",
            get(users::get).put(users::update).delete(users::remove),
        )
        .with_state(state)
}

/// A page of results with the total count for the same filter.
#[derive(Debug, Serialize)]
pub struct PagedResponse<T> {
    pub count: i64,
    pub limit: i64,
    pub offset: i64,
    pub results: Vec<T>,
}

impl<T> From<libris_db::Paged<T>> for PagedResponse<T> {
    fn from(paged: libris_db::Paged<T>) -> Self {
        PagedResponse {
            count: paged.total,
            limit: paged.limit,
            offset: paged.offset,
            results: paged.items,
        }
    }
}

/// Liveness + database probe.
async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    let database_ok = state.db.health_check().await;
    let status = if database_ok { "ok" } else { "degraded" };
    Json(json!({
        "status": status,
        "database": database_ok,
    }))
}
