//! # Fee Repository
//!
//! Database operations for fee records.
//!
//! Overdue fees are created by the circulation engine inside the return
//! transaction; this repository covers manual fees (lost book, damage) and
//! the admin read surface. Pay/unpay transitions also live in the engine so
//! paid_status and payment_date are always written together.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::Page;
use libris_core::{Fee, FeeKind};

/// All fee columns, in struct field order.
const FEE_COLUMNS: &str = r#"
    id, user_id, book_id, transaction_id, kind, amount_cents,
    paid_status, payment_date, notes, created_at, updated_at
"#;

/// Optional filters for listing fees. AND-combined.
#[derive(Debug, Clone, Default)]
pub struct FeeFilter {
    pub user_id: Option<String>,
    pub paid_status: Option<bool>,
    pub kind: Option<FeeKind>,
}

/// Fields needed to create a manual fee. The repository stamps id and
/// timestamps; fees start unpaid.
#[derive(Debug, Clone)]
pub struct NewFee {
    pub user_id: String,
    pub book_id: Option<String>,
    pub transaction_id: Option<String>,
    pub kind: FeeKind,
    pub amount_cents: i64,
    pub notes: Option<String>,
}

/// Repository for fee database operations.
#[derive(Debug, Clone)]
pub struct FeeRepository {
    pool: SqlitePool,
}

impl FeeRepository {
    /// Creates a new FeeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        FeeRepository { pool }
    }

    /// Inserts a manual fee.
    pub async fn insert(&self, new: NewFee) -> DbResult<Fee> {
        let now = Utc::now();
        let fee = Fee {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            book_id: new.book_id,
            transaction_id: new.transaction_id,
            kind: new.kind,
            amount_cents: new.amount_cents,
            paid_status: false,
            payment_date: None,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %fee.id, user_id = %fee.user_id, amount = fee.amount_cents, "Inserting fee");

        sqlx::query(
            r#"
            INSERT INTO fees (
                id, user_id, book_id, transaction_id, kind, amount_cents,
                paid_status, payment_date, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&fee.id)
        .bind(&fee.user_id)
        .bind(&fee.book_id)
        .bind(&fee.transaction_id)
        .bind(fee.kind)
        .bind(fee.amount_cents)
        .bind(fee.paid_status)
        .bind(fee.payment_date)
        .bind(&fee.notes)
        .bind(fee.created_at)
        .bind(fee.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(fee)
    }

    /// Gets a fee by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Fee>> {
        let sql = format!("SELECT {FEE_COLUMNS} FROM fees WHERE id = ?1");
        let fee = sqlx::query_as::<_, Fee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(fee)
    }

    /// Lists fees matching a filter, newest first.
    pub async fn list(&self, filter: &FeeFilter, page: Page) -> DbResult<Vec<Fee>> {
        let sql = format!(
            r#"
            SELECT {FEE_COLUMNS} FROM fees
            WHERE (?1 IS NULL OR user_id = ?1)
              AND (?2 IS NULL OR paid_status = ?2)
              AND (?3 IS NULL OR kind = ?3)
            ORDER BY created_at DESC
            LIMIT ?4 OFFSET ?5
            "#
        );

        let fees = sqlx::query_as::<_, Fee>(&sql)
            .bind(&filter.user_id)
            .bind(filter.paid_status)
            .bind(filter.kind)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(fees)
    }

    /// Deletes a fee (admin surface only).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM fees WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Fee", id));
        }

        debug!(id = %id, "Fee deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::user::NewUser;
    use libris_core::UserRole;

    async fn seed_user(db: &Database) -> String {
        db.users()
            .insert(NewUser {
                username: "debtor".to_string(),
                email: "debtor@example.org".to_string(),
                password_hash: "hash".to_string(),
                first_name: String::new(),
                last_name: String::new(),
                role: UserRole::Student,
            })
            .await
            .unwrap()
            .id
    }

    fn manual_fee(user_id: &str, cents: i64) -> NewFee {
        NewFee {
            user_id: user_id.to_string(),
            book_id: None,
            transaction_id: None,
            kind: FeeKind::Damage,
            amount_cents: cents,
            notes: Some("Water damage on cover".to_string()),
        }
    }

    #[tokio::test]
    async fn test_insert_starts_unpaid() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user_id = seed_user(&db).await;
        let repo = db.fees();

        let fee = repo.insert(manual_fee(&user_id, 250)).await.unwrap();

        let fetched = repo.get_by_id(&fee.id).await.unwrap().unwrap();
        assert!(!fetched.paid_status);
        assert!(fetched.payment_date.is_none());
        assert_eq!(fetched.amount_cents, 250);
        assert_eq!(fetched.kind, FeeKind::Damage);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user_id = seed_user(&db).await;
        let repo = db.fees();

        repo.insert(manual_fee(&user_id, 100)).await.unwrap();
        repo.insert(manual_fee(&user_id, 200)).await.unwrap();

        let filter = FeeFilter {
            user_id: Some(user_id.clone()),
            ..Default::default()
        };
        assert_eq!(repo.list(&filter, Page::default()).await.unwrap().len(), 2);

        let filter = FeeFilter {
            paid_status: Some(true),
            ..Default::default()
        };
        assert!(repo.list(&filter, Page::default()).await.unwrap().is_empty());

        let filter = FeeFilter {
            kind: Some(FeeKind::Overdue),
            ..Default::default()
        };
        assert!(repo.list(&filter, Page::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user_id = seed_user(&db).await;
        let repo = db.fees();

        let fee = repo.insert(manual_fee(&user_id, 100)).await.unwrap();
        repo.delete(&fee.id).await.unwrap();

        assert!(repo.get_by_id(&fee.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(&fee.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
