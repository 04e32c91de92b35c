//! # User Repository
//!
//! Database operations for user accounts.
//!
//! ## Delete Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    delete(user_id)                                      │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    count transactions referencing the user                              │
//! │       ├── > 0 ──► ReferentialViolation (restrict-on-delete)  ROLLBACK  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │    delete the user's fees (owned records go with the owner)            │
//! │    delete the user row                                                 │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  The restriction is an explicit pre-delete check, not a declared       │
//! │  ON DELETE clause, so the caller gets a typed error it can surface.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::Page;
use libris_core::{User, UserRole};

/// Fields needed to create an account. The repository stamps id and
/// date_joined.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    /// Already hashed; repositories never see plaintext passwords.
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new account.
    ///
    /// ## Returns
    /// The created user with generated ID and join timestamp.
    pub async fn insert(&self, new: NewUser) -> DbResult<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            role: new.role,
            is_active: true,
            date_joined: Utc::now(),
            last_login: None,
        };

        debug!(id = %user.id, username = %user.username, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, email, password_hash,
                first_name, last_name, role, is_active,
                date_joined, last_login
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.date_joined)
        .bind(user.last_login)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash,
                   first_name, last_name, role, is_active,
                   date_joined, last_login
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by username (login path).
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash,
                   first_name, last_name, role, is_active,
                   date_joined, last_login
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Lists accounts, newest first.
    pub async fn list(&self, page: Page) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash,
                   first_name, last_name, role, is_active,
                   date_joined, last_login
            FROM users
            ORDER BY date_joined DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Updates account profile fields.
    ///
    /// Narrow statement: touches exactly the mutable profile columns,
    /// never the password hash or join timestamp.
    pub async fn update(&self, user: &User) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                username = ?2,
                email = ?3,
                first_name = ?4,
                last_name = ?5,
                role = ?6,
                is_active = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role)
        .bind(user.is_active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", &user.id));
        }

        Ok(())
    }

    /// Replaces the stored password hash.
    pub async fn set_password_hash(&self, id: &str, password_hash: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = ?2 WHERE id = ?1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Records a successful login.
    pub async fn touch_last_login(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query("UPDATE users SET last_login = ?2 WHERE id = ?1")
            .bind(id)
            .bind(now)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Deletes an account.
    ///
    /// Restrict-on-delete: rejected while any transaction references the
    /// user. The user's fees are removed in the same database transaction.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let transaction_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE user_id = ?1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        if transaction_count > 0 {
            return Err(DbError::referential(format!(
                "User {id} has {transaction_count} transaction(s) and cannot be deleted"
            )));
        }

        sqlx::query("DELETE FROM fees WHERE user_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        tx.commit().await?;

        debug!(id = %id, "User deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
