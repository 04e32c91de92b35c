//! # Fee Transitions
//!
//! Pay and unpay a fee.
//!
//! These are independent single-record writes: no cross-entity locking is
//! needed, but the flip is still guarded on the current paid_status so a
//! repeat call is rejected rather than silently succeeding, and
//! `paid_status`/`payment_date` always change together in one statement.

use chrono::Utc;
use tracing::{debug, info};

use libris_core::Fee;

use crate::error::{CirculationError, EngineResult};
use crate::CirculationEngine;

/// All fee columns, in struct field order.
const FEE_COLUMNS: &str = r#"
    id, user_id, book_id, transaction_id, kind, amount_cents,
    paid_status, payment_date, notes, created_at, updated_at
"#;

impl CirculationEngine {
    /// Marks a fee as paid, stamping the payment date.
    ///
    /// ## Errors
    /// * `NotFound` - unknown fee
    /// * `InvalidState` - the fee is already paid (no-op rejection)
    pub async fn mark_fee_paid(&self, fee_id: &str) -> EngineResult<Fee> {
        debug!(fee_id = %fee_id, "mark fee paid");

        let fee = self.fetch_fee(fee_id).await?;
        if fee.paid_status {
            return Err(CirculationError::invalid_state(
                "Fee is already marked as paid.",
            ));
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE fees SET paid_status = 1, payment_date = ?2, updated_at = ?2
            WHERE id = ?1 AND paid_status = 0
            "#,
        )
        .bind(fee_id)
        .bind(now)
        .execute(self.db().pool())
        .await?;

        if result.rows_affected() == 0 {
            // Concurrent payer got here first
            return Err(CirculationError::invalid_state(
                "Fee is already marked as paid.",
            ));
        }

        info!(fee_id = %fee_id, amount = %fee.amount(), "Fee paid");

        self.fetch_fee(fee_id).await
    }

    /// Marks a fee as unpaid, clearing the payment date.
    ///
    /// ## Errors
    /// * `NotFound` - unknown fee
    /// * `InvalidState` - the fee is already unpaid (no-op rejection)
    pub async fn mark_fee_unpaid(&self, fee_id: &str) -> EngineResult<Fee> {
        debug!(fee_id = %fee_id, "mark fee unpaid");

        let fee = self.fetch_fee(fee_id).await?;
        if !fee.paid_status {
            return Err(CirculationError::invalid_state(
                "Fee is already marked as unpaid.",
            ));
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE fees SET paid_status = 0, payment_date = NULL, updated_at = ?2
            WHERE id = ?1 AND paid_status = 1
            "#,
        )
        .bind(fee_id)
        .bind(now)
        .execute(self.db().pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(CirculationError::invalid_state(
                "Fee is already marked as unpaid.",
            ));
        }

        info!(fee_id = %fee_id, "Fee reverted to unpaid");

        self.fetch_fee(fee_id).await
    }

    async fn fetch_fee(&self, fee_id: &str) -> EngineResult<Fee> {
        let sql = format!("SELECT {FEE_COLUMNS} FROM fees WHERE id = ?1");
        let fee: Option<Fee> = sqlx::query_as(&sql)
            .bind(fee_id)
            .fetch_optional(self.db().pool())
            .await?;

        fee.ok_or_else(|| CirculationError::not_found("Fee", fee_id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_user, test_engine};
    use libris_core::FeeKind;
    use libris_db::NewFee;

    async fn seed_fee(engine: &CirculationEngine, cents: i64) -> String {
        let user_id = seed_user(engine.db(), "debtor").await;
        engine
            .db()
            .fees()
            .insert(NewFee {
                user_id,
                book_id: None,
                transaction_id: None,
                kind: FeeKind::Damage,
                amount_cents: cents,
                notes: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_pay_sets_both_fields_together() {
        let engine = test_engine().await;
        let fee_id = seed_fee(&engine, 250).await;

        let paid = engine.mark_fee_paid(&fee_id).await.unwrap();
        assert!(paid.paid_status);
        assert!(paid.payment_date.is_some());
    }

    #[tokio::test]
    async fn test_pay_twice_is_rejected() {
        let engine = test_engine().await;
        let fee_id = seed_fee(&engine, 250).await;

        engine.mark_fee_paid(&fee_id).await.unwrap();
        let err = engine.mark_fee_paid(&fee_id).await.unwrap_err();

        match err {
            CirculationError::InvalidState { message } => {
                assert_eq!(message, "Fee is already marked as paid.");
            }
            other => panic!("expected InvalidState, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unpay_clears_both_fields_together() {
        let engine = test_engine().await;
        let fee_id = seed_fee(&engine, 250).await;

        engine.mark_fee_paid(&fee_id).await.unwrap();
        let unpaid = engine.mark_fee_unpaid(&fee_id).await.unwrap();

        assert!(!unpaid.paid_status);
        assert!(unpaid.payment_date.is_none());
    }

    #[tokio::test]
    async fn test_unpay_of_unpaid_fee_is_rejected() {
        let engine = test_engine().await;
        let fee_id = seed_fee(&engine, 250).await;

        let err = engine.mark_fee_unpaid(&fee_id).await.unwrap_err();
        assert!(matches!(err, CirculationError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_unknown_fee_is_not_found() {
        let engine = test_engine().await;

        assert!(matches!(
            engine.mark_fee_paid("missing").await.unwrap_err(),
            CirculationError::NotFound { .. }
        ));
        assert!(matches!(
            engine.mark_fee_unpaid("missing").await.unwrap_err(),
            CirculationError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_pay_unpay_cycle() {
        let engine = test_engine().await;
        let fee_id = seed_fee(&engine, 250).await;

        engine.mark_fee_paid(&fee_id).await.unwrap();
        engine.mark_fee_unpaid(&fee_id).await.unwrap();
        let paid_again = engine.mark_fee_paid(&fee_id).await.unwrap();

        assert!(paid_again.paid_status);
        assert!(paid_again.payment_date.is_some());
    }
}
