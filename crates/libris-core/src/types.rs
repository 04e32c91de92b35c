//! # Domain Types
//!
//! Core domain types used throughout Libris.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │      Book       │   │ LoanTransaction │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  username       │   │  isbn (13 ch)   │   │  user_id (FK)   │       │
//! │  │  role           │   │  status         │   │  book_id (FK)   │       │
//! │  │  password_hash  │   │  title/authors  │   │  due_date       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Fee        │   │   BookStatus    │   │ TransactionKind │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  amount_cents   │   │  Available      │   │  Checkout       │       │
//! │  │  paid_status    │   │  Borrowed       │   │  Return         │       │
//! │  │  payment_date   │   │  Lost/Reserved  │   │  Renew (future) │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists: (isbn, username) - human-readable, unique

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// User Role
// =============================================================================

/// The role a user account carries.
///
/// Roles gate API operations through the [`crate::access`] matrix;
/// `Admin` here means a library administrator, not a system superuser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Library patron. Read access to the catalog only.
    Student,
    /// Library staff. May manage the catalog.
    Staff,
    /// Library administrator. Full access.
    Admin,
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Student
    }
}

// =============================================================================
// Book Status
// =============================================================================

/// The availability status of a book.
///
/// Invariant: `Borrowed` iff exactly one open checkout transaction references
/// the book. Only the circulation engine flips between `Available` and
/// `Borrowed`; `Lost` and `Reserved` are manual catalog overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    /// On the shelf, may be checked out.
    Available,
    /// Currently out on an open checkout.
    Borrowed,
    /// Reported lost.
    Lost,
    /// Held for a patron.
    Reserved,
}

impl Default for BookStatus {
    fn default() -> Self {
        BookStatus::Available
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BookStatus::Available => "available",
            BookStatus::Borrowed => "borrowed",
            BookStatus::Lost => "lost",
            BookStatus::Reserved => "reserved",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Transaction Kind
// =============================================================================

/// The kind of a circulation transaction record.
///
/// A record is created as `Checkout` and mutated in place to `Return` when
/// the book comes back; it is never deleted by the engine, only extended.
/// `Renew` exists in the data model for a planned renewal flow; no engine
/// operation produces it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Checkout,
    Return,
    Renew,
}

// =============================================================================
// Fee Kind
// =============================================================================

/// Why a fee was charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum FeeKind {
    /// Charged automatically when a book comes back past its due date.
    Overdue,
    /// Charged manually for a lost book.
    LostBook,
    /// Charged manually for a damaged book.
    Damage,
}

impl Default for FeeKind {
    fn default() -> Self {
        FeeKind::Overdue
    }
}

// =============================================================================
// User
// =============================================================================

/// A library user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Login name - business identifier, unique.
    pub username: String,

    /// Contact email.
    pub email: String,

    /// Argon2 hash of the account password. Never serialized to clients.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub first_name: String,
    pub last_name: String,

    /// Role used by the access policy. Serialized as `user_type` on the wire.
    #[serde(rename = "user_type")]
    pub role: UserRole,

    /// Whether the account may log in (soft delete).
    pub is_active: bool,

    /// When the account was created.
    pub date_joined: DateTime<Utc>,

    /// Last successful login, if any.
    pub last_login: Option<DateTime<Utc>>,
}

// =============================================================================
// Book
// =============================================================================

/// A catalog entry for a single physical book.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Book {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// 13-character ISBN - business identifier, unique.
    pub isbn: String,

    pub title: String,

    /// Comma-separated author names.
    pub authors: String,

    pub category: String,
    pub publisher: String,
    pub published_date: Option<NaiveDate>,
    pub description: String,
    pub page_count: Option<i64>,
    pub language: String,

    /// Availability status. Flipped only by the circulation engine
    /// (checkout/return) or a manual lost/reserved override.
    pub status: BookStatus,

    pub cover_image_url: Option<String>,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// Bumped on every write.
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Checks whether the book can be checked out right now.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.status == BookStatus::Available
    }
}

// =============================================================================
// Loan Transaction
// =============================================================================

/// One checkout-lifecycle event.
///
/// ## Lifecycle
/// ```text
/// checkout(user, book) ──► { kind: Checkout, return_date: None }   "open"
///         │
///         ▼ return_book(id)
/// { kind: Return, return_date: Some(..) }                          "closed"
/// ```
///
/// At most one open checkout exists per book at any time; the database
/// enforces this with a partial unique index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LoanTransaction {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub user_id: String,
    pub book_id: String,

    /// Serialized as `transaction_type` on the wire.
    #[serde(rename = "transaction_type")]
    pub kind: TransactionKind,

    /// Set at creation, immutable afterwards.
    pub transaction_date: DateTime<Utc>,

    /// Date the book is due back. Required for checkouts; the engine
    /// defaults it to `transaction_date + loan period` when absent.
    pub due_date: Option<NaiveDate>,

    /// Set exactly once, when the book is returned.
    pub return_date: Option<DateTime<Utc>>,
}

impl LoanTransaction {
    /// An open checkout: the book is currently out.
    #[inline]
    pub fn is_open_checkout(&self) -> bool {
        self.kind == TransactionKind::Checkout && self.return_date.is_none()
    }
}

// =============================================================================
// Fee
// =============================================================================

/// A charge against a user.
///
/// Created automatically by the circulation engine (overdue on return) or
/// manually by an administrator (lost book, damage). `paid_status` and
/// `payment_date` are always written together, never independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Fee {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub user_id: String,

    /// Nulled (not cascaded) if the book is deleted.
    pub book_id: Option<String>,

    /// The transaction that caused this fee, when one did. At most one fee
    /// per transaction; nulled if the transaction is deleted.
    pub transaction_id: Option<String>,

    /// Serialized as `fee_type` on the wire.
    #[serde(rename = "fee_type")]
    pub kind: FeeKind,

    /// Amount in cents (2-place currency).
    pub amount_cents: i64,

    pub paid_status: bool,
    pub payment_date: Option<DateTime<Utc>>,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Fee {
    /// Returns the amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Checks whether the fee has been settled.
    #[inline]
    pub fn is_paid(&self) -> bool {
        self.paid_status
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_transaction(kind: TransactionKind, returned: bool) -> LoanTransaction {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        LoanTransaction {
            id: "t-1".to_string(),
            user_id: "u-1".to_string(),
            book_id: "b-1".to_string(),
            kind,
            transaction_date: now,
            due_date: NaiveDate::from_ymd_opt(2024, 1, 15),
            return_date: returned.then_some(now),
        }
    }

    #[test]
    fn test_open_checkout_predicate() {
        assert!(sample_transaction(TransactionKind::Checkout, false).is_open_checkout());
        assert!(!sample_transaction(TransactionKind::Checkout, true).is_open_checkout());
        assert!(!sample_transaction(TransactionKind::Return, true).is_open_checkout());
    }

    #[test]
    fn test_book_status_display() {
        assert_eq!(BookStatus::Available.to_string(), "available");
        assert_eq!(BookStatus::Borrowed.to_string(), "borrowed");
        assert_eq!(BookStatus::Lost.to_string(), "lost");
        assert_eq!(BookStatus::Reserved.to_string(), "reserved");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(UserRole::default(), UserRole::Student);
        assert_eq!(BookStatus::default(), BookStatus::Available);
        assert_eq!(FeeKind::default(), FeeKind::Overdue);
    }

    #[test]
    fn test_enum_serde_names() {
        assert_eq!(
            serde_json::to_string(&FeeKind::LostBook).unwrap(),
            "\"lost_book\""
        );
        assert_eq!(
            serde_json::to_string(&BookStatus::Borrowed).unwrap(),
            "\"borrowed\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionKind::Checkout).unwrap(),
            "\"checkout\""
        );
    }
}
