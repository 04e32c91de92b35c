//! # Access Policy
//!
//! Role → operation permission matrix.
//!
//! ## The Matrix
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operation          │ student │ staff │ admin │                         │
//! │  ───────────────────┼─────────┼───────┼───────┤                         │
//! │  BookRead           │  allow  │ allow │ allow │  catalog browse/search  │
//! │  BookWrite          │  deny   │ allow │ allow │  catalog management     │
//! │  TransactionAny     │  deny   │ deny  │ allow │  checkout/return/CRUD   │
//! │  FeeAny             │  deny   │ deny  │ allow │  fee CRUD + pay/unpay   │
//! │  UserManagement     │  deny   │ deny  │ allow │  account CRUD           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The API surface consults this matrix before invoking the engine or the
//! store; the engine itself never sees roles.

use serde::{Deserialize, Serialize};

use crate::types::UserRole;

// =============================================================================
// Operation
// =============================================================================

/// A permission-gated class of API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Browse, fetch, and search the catalog.
    BookRead,
    /// Create, edit, and delete catalog entries.
    BookWrite,
    /// Any transaction operation, including checkout and return.
    TransactionAny,
    /// Any fee operation, including mark paid/unpaid.
    FeeAny,
    /// Any user account operation.
    UserManagement,
}

// =============================================================================
// Matrix
// =============================================================================

impl UserRole {
    /// Checks whether this role may perform `op`.
    ///
    /// ## Example
    /// ```rust
    /// use libris_core::access::Operation;
    /// use libris_core::types::UserRole;
    ///
    /// assert!(UserRole::Student.may(Operation::BookRead));
    /// assert!(!UserRole::Student.may(Operation::BookWrite));
    /// assert!(UserRole::Admin.may(Operation::FeeAny));
    /// ```
    pub fn may(self, op: Operation) -> bool {
        match op {
            Operation::BookRead => true,
            Operation::BookWrite => matches!(self, UserRole::Staff | UserRole::Admin),
            Operation::TransactionAny | Operation::FeeAny | Operation::UserManagement => {
                matches!(self, UserRole::Admin)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
