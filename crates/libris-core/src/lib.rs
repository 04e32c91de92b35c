//! # libris-core: Pure Business Logic for Libris
//!
//! This crate is the **heart** of the Libris circulation system. It contains
//! all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Libris Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     REST API (apps/api)                         │   │
//! │  │    checkout ──► return ──► fees ──► books ──► users            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 libris-engine (Circulation Engine)              │   │
//! │  │    checkout / return / fee transitions, one DB tx each         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ libris-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  policy   │  │  access   │  │   │
//! │  │   │   Book    │  │   Money   │  │ due dates │  │   role    │  │   │
//! │  │   │   Fee     │  │  (cents)  │  │ fee math  │  │  matrix   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    libris-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Book, LoanTransaction, Fee)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`policy`] - Circulation policy: loan periods and overdue fee math
//! - [`access`] - Role → operation permission matrix
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use libris_core::policy::CirculationPolicy;
//!
//! let policy = CirculationPolicy::default();
//!
//! // Ten days late at the default $0.50/day rate
//! let due = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let returned = Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap();
//!
//! let fee = policy.overdue_fee(due, returned);
//! assert_eq!(fee.cents(), 500); // $5.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod error;
pub mod money;
pub mod policy;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use libris_core::Money` instead of
// `use libris_core::money::Money`

pub use access::Operation;
pub use error::ValidationError;
pub use money::Money;
pub use policy::CirculationPolicy;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// ISBN-13 length in characters.
///
/// ## Why a constant?
/// Books are identified by a 13-character ISBN throughout the system; the
/// validator, the database schema, and the API all agree on this length.
pub const ISBN_LENGTH: usize = 13;

/// Default loan period in days, used when a checkout supplies no due date.
pub const DEFAULT_LOAN_PERIOD_DAYS: i64 = 14;

/// Default overdue charge per day, in cents ($0.50/day).
///
/// ## Business Reason
/// This is the fallback rate; deployments override it through configuration.
/// The fee calculator takes the rate as input rather than reading it here.
pub const DEFAULT_OVERDUE_RATE_CENTS: i64 = 50;
