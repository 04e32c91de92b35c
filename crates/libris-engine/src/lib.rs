//! # libris-engine: The Circulation State Machine
//!
//! This crate enforces the rules that interlock a book's availability, a
//! transaction's lifecycle, and a fee's existence.
//!
//! ## The State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Circulation Lifecycle                               │
//! │                                                                         │
//! │   Book: available ◄──────────────────────────┐                         │
//! │          │                                    │                         │
//! │          │ checkout(user, book, due?)         │ return_book(tx, date?)  │
//! │          ▼                                    │                         │
//! │   Book: borrowed ─────────────────────────────┘                         │
//! │   Transaction: { kind: checkout,              Transaction: { kind:     │
//! │                  return_date: None }           return, return_date }   │
//! │                                                      │                  │
//! │                                     past due date?   │                  │
//! │                                                      ▼                  │
//! │                                        Fee { kind: overdue,             │
//! │                                              amount: days × rate,      │
//! │                                              paid_status: false }      │
//! │                                                      │                  │
//! │                                  mark_fee_paid ◄────►│ mark_fee_unpaid │
//! │                                                                         │
//! │  INVARIANTS                                                             │
//! │  • status == borrowed  iff  exactly one open checkout references       │
//! │    the book (partial unique index + guarded writes)                    │
//! │  • every compound operation is one sqlx transaction: no partial        │
//! │    effect is ever visible                                              │
//! │  • paid_status and payment_date flip together, never independently     │
//! │  • at most one fee per causing transaction (UNIQUE column)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! The engine is stateless between calls and safe to invoke concurrently.
//! Checkout and return are compound read-check-writes serialized per book:
//! SQLite serializes writers, the status flip is guarded by
//! `WHERE status = 'available'`, and the partial unique index on open
//! checkouts backstops the race. The loser observes [`error::CirculationError::Conflict`],
//! never corrupted state.
//!
//! ## Modules
//!
//! - [`circulation`] - checkout and return operations
//! - [`fees`] - fee pay/unpay transitions
//! - [`error`] - the engine error taxonomy

// =============================================================================
// Module Declarations
// =============================================================================

pub mod circulation;
pub mod error;
pub mod fees;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CirculationError, EngineResult};

use libris_core::CirculationPolicy;
use libris_db::Database;

// =============================================================================
// Engine
// =============================================================================

/// The circulation engine.
///
/// Holds no state of its own beyond the operation in flight: a database
/// handle and the policy knobs. Cheap to clone, safe to share.
#[derive(Debug, Clone)]
pub struct CirculationEngine {
    db: Database,
    policy: CirculationPolicy,
}

impl CirculationEngine {
    /// Creates an engine over a database with the given policy.
    pub fn new(db: Database, policy: CirculationPolicy) -> Self {
        CirculationEngine { db, policy }
    }

    /// The policy in effect.
    pub fn policy(&self) -> &CirculationPolicy {
        &self.policy
    }

    /// The underlying database handle.
    pub(crate) fn db(&self) -> &Database {
        &self.db
    }
}
