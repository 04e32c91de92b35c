//! # Checkout and Return
//!
//! The two compound operations of the circulation state machine.
//!
//! ## Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                checkout(user, book, due_date?)                          │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    verify user exists                 ── Validation if not             │
//! │    read book                          ── NotFound if missing           │
//! │    check status == available          ── Conflict if not               │
//! │    INSERT transaction (open checkout) ── unique index ⇒ race loser     │
//! │                                          maps to Conflict              │
//! │    UPDATE books SET status='borrowed'                                  │
//! │      WHERE id=? AND status='available' ── 0 rows ⇒ Conflict            │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any early return rolls the whole unit back: no transaction row        │
//! │  without the status flip, no flip without the row.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Return is the mirror image, plus the overdue fee spawn. Both writes are
//! narrow per-field UPDATEs guarded on the expected current state, so a
//! concurrent loser observes a conflict instead of corrupting anything.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use libris_core::{LoanTransaction, TransactionKind};
use libris_db::DbError;

use crate::error::{CirculationError, EngineResult};
use crate::CirculationEngine;

impl CirculationEngine {
    /// Checks a book out to a user.
    ///
    /// ## Arguments
    /// * `user_id` - The borrowing user; must exist
    /// * `book_id` - The book; must exist and be available
    /// * `due_date` - Optional; defaults to today + the policy loan period
    ///
    /// ## Returns
    /// The created open-checkout transaction.
    ///
    /// ## Errors
    /// * `Validation` - unknown user
    /// * `NotFound` - unknown book
    /// * `Conflict` - book not available, or lost the race to another checkout
    pub async fn checkout(
        &self,
        user_id: &str,
        book_id: &str,
        due_date: Option<NaiveDate>,
    ) -> EngineResult<LoanTransaction> {
        debug!(user_id = %user_id, book_id = %book_id, "checkout requested");

        let mut tx = self.db().pool().begin().await?;

        // Unknown foreign key is a validation failure, not a 404: the
        // addressed resource of this operation is the book, not the user.
        let user_exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ?1")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        if user_exists == 0 {
            return Err(libris_core::ValidationError::unknown_reference("user_id", user_id).into());
        }

        let book: Option<(String, String)> =
            sqlx::query_as("SELECT title, status FROM books WHERE id = ?1")
                .bind(book_id)
                .fetch_optional(&mut *tx)
                .await?;

        let (title, status) = match book {
            Some(row) => row,
            None => return Err(CirculationError::not_found("Book", book_id)),
        };

        if status != "available" {
            return Err(CirculationError::conflict(format!(
                "Book '{title}' is not available. Status: {status}."
            )));
        }

        let now = Utc::now();
        let record = LoanTransaction {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            book_id: book_id.to_string(),
            kind: TransactionKind::Checkout,
            transaction_date: now,
            due_date: Some(due_date.unwrap_or_else(|| self.policy().default_due_date(now))),
            return_date: None,
        };

        let inserted = sqlx::query(
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
        .execute(&mut *tx)
        .await;

        if let Err(err) = inserted {
            // The partial unique index on open checkouts fires here for the
            // loser of two concurrent checkouts.
            return Err(match DbError::from(err) {
                DbError::UniqueViolation { .. } => CirculationError::conflict(format!(
                    "Book '{title}' is not available. Status: borrowed."
                )),
                other => other.into(),
            });
        }

        let flipped = sqlx::query(
            "UPDATE books SET status = 'borrowed', updated_at = ?2 WHERE id = ?1 AND status = 'available'",
        )
        .bind(book_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if flipped.rows_affected() == 0 {
            // Only reachable when a concurrent writer took the book between
            // our read and this guarded flip.
            return Err(CirculationError::conflict(format!(
                "Book '{title}' is not available. Status: borrowed."
            )));
        }

        tx.commit().await?;

        info!(
            transaction_id = %record.id,
            book_id = %book_id,
            due_date = ?record.due_date,
            "Book checked out"
        );

        Ok(record)
    }

    /// Processes a book return for a checkout transaction.
    ///
    /// ## Arguments
    /// * `transaction_id` - The open checkout to close
    /// * `return_date` - Optional; defaults to now
    ///
    /// ## Returns
    /// The updated transaction (kind flipped to `Return`, return_date set).
    ///
    /// ## Errors
    /// * `NotFound` - unknown transaction
    /// * `InvalidState` - not a checkout record, or already returned
    ///
    /// ## Fees
    /// When the return's calendar date is strictly past the due date, one
    /// overdue fee is created in the same database transaction. A repeat
    /// return attempt fails the precondition, so a return can never be
    /// charged twice; the UNIQUE transaction_id column on fees is the
    /// backstop.
    pub async fn return_book(
        &self,
        transaction_id: &str,
        return_date: Option<DateTime<Utc>>,
    ) -> EngineResult<LoanTransaction> {
        debug!(transaction_id = %transaction_id, "return requested");

        let mut tx = self.db().pool().begin().await?;

        let record: Option<LoanTransaction> = sqlx::query_as(
            r#"
            SELECT id, user_id, book_id, kind, transaction_date, due_date, return_date
            FROM transactions
            WHERE id = ?1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut record = match record {
            Some(r) => r,
            None => return Err(CirculationError::not_found("Transaction", transaction_id)),
        };

        if !record.is_open_checkout() {
            return Err(CirculationError::invalid_state(
                "This transaction is not a valid checkout or has already been returned.",
            ));
        }

        let returned_at = return_date.unwrap_or_else(Utc::now);

        let closed = sqlx::query(
            r#"
            UPDATE transactions SET kind = 'return', return_date = ?2
            WHERE id = ?1 AND kind = 'checkout' AND return_date IS NULL
            "#,
        )
        .bind(transaction_id)
        .bind(returned_at)
        .execute(&mut *tx)
        .await?;

        if closed.rows_affected() == 0 {
            return Err(CirculationError::invalid_state(
                "This transaction is not a valid checkout or has already been returned.",
            ));
        }

        sqlx::query("UPDATE books SET status = 'available', updated_at = ?2 WHERE id = ?1")
            .bind(&record.book_id)
            .bind(returned_at)
            .execute(&mut *tx)
            .await?;

        if let Some(due) = record.due_date {
            let overdue_days = self.policy().overdue_days(due, returned_at);
            if overdue_days > 0 {
                let amount = self.policy().overdue_fee(due, returned_at);
                if amount.is_positive() {
                    sqlx::query(
                        r#"
                        INSERT INTO fees (
                            id, user_id, book_id, transaction_id, kind, amount_cents,
                            paid_status, payment_date, notes, created_at, updated_at
                        ) VALUES (?1, ?2, ?3, ?4, 'overdue', ?5, 0, NULL, ?6, ?7, ?7)
                        "#,
                    )
                    .bind(Uuid::new_v4().to_string())
                    .bind(&record.user_id)
                    .bind(&record.book_id)
                    .bind(transaction_id)
                    .bind(amount.cents())
                    .bind(format!("Overdue by {overdue_days} day(s)."))
                    .bind(returned_at)
                    .execute(&mut *tx)
                    .await?;

                    info!(
                        transaction_id = %transaction_id,
                        overdue_days,
                        amount = %amount,
                        "Overdue fee charged"
                    );
                }
            }
        }

        tx.commit().await?;

        record.kind = TransactionKind::Return;
        record.return_date = Some(returned_at);

        info!(
            transaction_id = %transaction_id,
            book_id = %record.book_id,
            "Book returned"
        );

        Ok(record)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_book, seed_user, test_engine};
    use chrono::TimeZone;
    use libris_core::{BookStatus, FeeKind};
    use libris_db::repository::Page;
    use libris_db::FeeFilter;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_checkout_flips_book_to_borrowed() {
        let engine = test_engine().await;
        let user_id = seed_user(engine.db(), "reader").await;
        let book_id = seed_book(engine.db(), "9781718500440", "The Rust Programming Language").await;

        let record = engine.checkout(&user_id, &book_id, None).await.unwrap();

        assert_eq!(record.kind, TransactionKind::Checkout);
        assert!(record.is_open_checkout());

        let book = engine.db().books().get_by_id(&book_id).await.unwrap().unwrap();
        assert_eq!(book.status, BookStatus::Borrowed);

        let open = engine
            .db()
            .transactions()
            .open_checkout_for_book(&book_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(open.id, record.id);
    }

    #[tokio::test]
    async fn test_checkout_defaults_due_date_to_loan_period() {
        let engine = test_engine().await;
        let user_id = seed_user(engine.db(), "reader").await;
        let book_id = seed_book(engine.db(), "9781718500440", "Dune").await;

        let record = engine.checkout(&user_id, &book_id, None).await.unwrap();

        let expected = record.transaction_date.date_naive() + chrono::Days::new(14);
        assert_eq!(record.due_date, Some(expected));
    }

    #[tokio::test]
    async fn test_checkout_honors_explicit_due_date() {
        let engine = test_engine().await;
        let user_id = seed_user(engine.db(), "reader").await;
        let book_id = seed_book(engine.db(), "9781718500440", "Dune").await;

        let due = date(2030, 6, 1);
        let record = engine.checkout(&user_id, &book_id, Some(due)).await.unwrap();
        assert_eq!(record.due_date, Some(due));
    }

    #[tokio::test]
    async fn test_checkout_of_borrowed_book_conflicts() {
        let engine = test_engine().await;
        let user_id = seed_user(engine.db(), "reader").await;
        let rival_id = seed_user(engine.db(), "rival").await;
        let book_id = seed_book(engine.db(), "9781718500440", "Dune").await;

        engine.checkout(&user_id, &book_id, None).await.unwrap();
        let err = engine.checkout(&rival_id, &book_id, None).await.unwrap_err();

        match err {
            CirculationError::Conflict { message } => {
                assert!(message.contains("not available"), "{message}");
                assert!(message.contains("borrowed"), "{message}");
            }
            other => panic!("expected Conflict, got {other:?}"),
        }

        // Exactly one open checkout survives
        let open = engine
            .db()
            .transactions()
            .open_checkout_for_book(&book_id)
            .await
            .unwrap();
        assert!(open.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_checkouts_yield_exactly_one_success() {
        let engine = test_engine().await;
        let alice = seed_user(engine.db(), "alice").await;
        let bob = seed_user(engine.db(), "bob").await;
        let book_id = seed_book(engine.db(), "9781718500440", "Dune").await;

        let (first, second) = tokio::join!(
            engine.checkout(&alice, &book_id, None),
            engine.checkout(&bob, &book_id, None)
        );

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);

        let loser = results.into_iter().find(|r| r.is_err()).unwrap().unwrap_err();
        assert!(matches!(loser, CirculationError::Conflict { .. }));

        // The winner left the expected state behind
        let book = engine.db().books().get_by_id(&book_id).await.unwrap().unwrap();
        assert_eq!(book.status, BookStatus::Borrowed);
        assert!(engine
            .db()
            .transactions()
            .open_checkout_for_book(&book_id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_checkout_unknown_book_is_not_found() {
        let engine = test_engine().await;
        let user_id = seed_user(engine.db(), "reader").await;

        let err = engine.checkout(&user_id, "missing", None).await.unwrap_err();
        assert!(matches!(err, CirculationError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_checkout_unknown_user_is_validation() {
        let engine = test_engine().await;
        let book_id = seed_book(engine.db(), "9781718500440", "Dune").await;

        let err = engine.checkout("missing", &book_id, None).await.unwrap_err();
        assert!(matches!(err, CirculationError::Validation(_)));

        // And nothing was written
        let book = engine.db().books().get_by_id(&book_id).await.unwrap().unwrap();
        assert_eq!(book.status, BookStatus::Available);
    }

    #[tokio::test]
    async fn test_return_closes_checkout_and_frees_book() {
        let engine = test_engine().await;
        let user_id = seed_user(engine.db(), "reader").await;
        let book_id = seed_book(engine.db(), "9781718500440", "Dune").await;

        let record = engine.checkout(&user_id, &book_id, None).await.unwrap();
        let returned = engine.return_book(&record.id, None).await.unwrap();

        assert_eq!(returned.kind, TransactionKind::Return);
        assert!(returned.return_date.is_some());

        let book = engine.db().books().get_by_id(&book_id).await.unwrap().unwrap();
        assert_eq!(book.status, BookStatus::Available);

        // The book can circulate again
        engine.checkout(&user_id, &book_id, None).await.unwrap();
    }

    #[tokio::test]
    async fn test_second_return_fails_closed() {
        let engine = test_engine().await;
        let user_id = seed_user(engine.db(), "reader").await;
        let book_id = seed_book(engine.db(), "9781718500440", "Dune").await;

        let record = engine.checkout(&user_id, &book_id, None).await.unwrap();
        engine.return_book(&record.id, None).await.unwrap();

        let err = engine.return_book(&record.id, None).await.unwrap_err();
        assert!(matches!(err, CirculationError::InvalidState { .. }));

        // Still exactly zero fees: the failed retry charged nothing
        let fees = engine
            .db()
            .fees()
            .list(&FeeFilter::default(), Page::default())
            .await
            .unwrap();
        assert!(fees.is_empty());
    }

    #[tokio::test]
    async fn test_return_unknown_transaction_is_not_found() {
        let engine = test_engine().await;
        let err = engine.return_book("missing", None).await.unwrap_err();
        assert!(matches!(err, CirculationError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_overdue_return_charges_fifty_cents_per_day() {
        let engine = test_engine().await;
        let user_id = seed_user(engine.db(), "reader").await;
        let book_id = seed_book(engine.db(), "9781718500440", "Dune").await;

        // Due 2024-01-01, returned 2024-01-11T00:00Z: ten days late
        let record = engine
            .checkout(&user_id, &book_id, Some(date(2024, 1, 1)))
            .await
            .unwrap();
        let returned_at = Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap();
        engine.return_book(&record.id, Some(returned_at)).await.unwrap();

        let fees = engine
            .db()
            .fees()
            .list(&FeeFilter::default(), Page::default())
            .await
            .unwrap();
        assert_eq!(fees.len(), 1);

        let fee = &fees[0];
        assert_eq!(fee.kind, FeeKind::Overdue);
        assert_eq!(fee.amount_cents, 500);
        assert_eq!(fee.user_id, user_id);
        assert_eq!(fee.book_id.as_deref(), Some(book_id.as_str()));
        assert_eq!(fee.transaction_id.as_deref(), Some(record.id.as_str()));
        assert!(!fee.paid_status);
        assert_eq!(fee.notes.as_deref(), Some("Overdue by 10 day(s)."));
    }

    #[tokio::test]
    async fn test_same_day_return_charges_nothing() {
        let engine = test_engine().await;
        let user_id = seed_user(engine.db(), "reader").await;
        let book_id = seed_book(engine.db(), "9781718500440", "Dune").await;

        // Due 2024-01-01, returned 2024-01-01T08:00Z: on time
        let record = engine
            .checkout(&user_id, &book_id, Some(date(2024, 1, 1)))
            .await
            .unwrap();
        let returned_at = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        engine.return_book(&record.id, Some(returned_at)).await.unwrap();

        let fees = engine
            .db()
            .fees()
            .list(&FeeFilter::default(), Page::default())
            .await
            .unwrap();
        assert!(fees.is_empty());
    }

    #[tokio::test]
    async fn test_one_day_late_return() {
        let engine = test_engine().await;
        let user_id = seed_user(engine.db(), "reader").await;
        let book_id = seed_book(engine.db(), "9781718500440", "Dune").await;

        let record = engine
            .checkout(&user_id, &book_id, Some(date(2024, 1, 1)))
            .await
            .unwrap();
        let returned_at = Utc.with_ymd_and_hms(2024, 1, 2, 0, 30, 0).unwrap();
        engine.return_book(&record.id, Some(returned_at)).await.unwrap();

        let fees = engine
            .db()
            .fees()
            .list(&FeeFilter::default(), Page::default())
            .await
            .unwrap();
        assert_eq!(fees.len(), 1);
        assert_eq!(fees[0].amount_cents, 50);
        assert_eq!(fees[0].notes.as_deref(), Some("Overdue by 1 day(s)."));
    }
}
