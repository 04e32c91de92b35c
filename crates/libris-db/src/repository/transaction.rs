//! # Transaction Repository
//!
//! Read and admin access to circulation history.
//!
//! ## Division of Labor
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  This repository:  inserts complete records, lookups, listings,        │
//! │                    admin deletes.                                      │
//! │                                                                         │
//! │  libris-engine:    the checkout → return state transitions. Those      │
//! │                    mutate a transaction AND its book (and possibly     │
//! │                    spawn a fee) as one atomic unit, so they run as     │
//! │                    guarded statements inside one sqlx transaction      │
//! │                    rather than through these pool-scoped methods.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::Page;
use libris_core::{LoanTransaction, TransactionKind};

/// All transaction columns, in struct field order.
const TRANSACTION_COLUMNS: &str = r#"
    id, user_id, book_id, kind, transaction_date, due_date, return_date
"#;

/// Optional filters for listing circulation history. AND-combined.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub user_id: Option<String>,
    pub book_id: Option<String>,
    pub kind: Option<TransactionKind>,
}

/// Repository for transaction database operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Inserts a complete transaction record.
    ///
    /// Used by the admin CRUD surface; the engine writes its own records
    /// inside its transactional unit.
    pub async fn insert(&self, record: &LoanTransaction) -> DbResult<()> {
        debug!(id = %record.id, book_id = %record.book_id, "Inserting transaction");

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, user_id, book_id, kind,
                transaction_date, due_date, return_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.book_id)
        .bind(record.kind)
        .bind(record.transaction_date)
        .bind(record.due_date)
        .bind(record.return_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a transaction by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<LoanTransaction>> {
        let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1");
        let record = sqlx::query_as::<_, LoanTransaction>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Finds the open checkout for a book, if one exists.
    ///
    /// The partial unique index guarantees at most one row matches.
    pub async fn open_checkout_for_book(&self, book_id: &str) -> DbResult<Option<LoanTransaction>> {
        let sql = format!(
            r#"
            SELECT {TRANSACTION_COLUMNS} FROM transactions
            WHERE book_id = ?1 AND kind = 'checkout' AND return_date IS NULL
            "#
        );
        let record = sqlx::query_as::<_, LoanTransaction>(&sql)
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Lists transactions matching a filter, newest first.
    pub async fn list(
        &self,
        filter: &TransactionFilter,
        page: Page,
    ) -> DbResult<Vec<LoanTransaction>> {
        let sql = format!(
            r#"
            SELECT {TRANSACTION_COLUMNS} FROM transactions
            WHERE (?1 IS NULL OR user_id = ?1)
              AND (?2 IS NULL OR book_id = ?2)
              AND (?3 IS NULL OR kind = ?3)
            ORDER BY transaction_date DESC
            LIMIT ?4 OFFSET ?5
            "#
        );

        let records = sqlx::query_as::<_, LoanTransaction>(&sql)
            .bind(&filter.user_id)
            .bind(&filter.book_id)
            .bind(filter.kind)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Deletes a transaction record (admin surface only).
    ///
    /// A fee caused by the transaction keeps existing with its transaction
    /// reference nulled, in the same database transaction.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let now = chrono::Utc::now();
        sqlx::query("UPDATE fees SET transaction_id = NULL, updated_at = ?2 WHERE transaction_id = ?1")
            .bind(id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM transactions WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Transaction", id));
        }

        tx.commit().await?;

        debug!(id = %id, "Transaction deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
