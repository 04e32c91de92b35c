//! # libris-db: Database Layer for Libris
//!
//! This crate provides database access for the Libris circulation system.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Libris Data Flow                                 │
//! │                                                                         │
//! │  API handler (GET /api/books?search=...)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     libris-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (book.rs,    │    │  (embedded)  │  │   │
//! │  │   │               │    │   user.rs..)  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ BookRepo      │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ UserRepo      │    │ 002_idx.sql  │  │   │
//! │  │   │ Management    │    │ FeeRepo ...   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (WAL mode, foreign keys on)                           │
//! │                                                                         │
//! │  The circulation engine (libris-engine) borrows the pool for its       │
//! │  compound transactional operations.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (user, book, transaction, fee)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use libris_db::{Database, DbConfig};
//!
//! // Create database with default config (runs migrations)
//! let db = Database::new(DbConfig::new("path/to/libris.db")).await?;
//!
//! // Use repositories
//! let books = db.books().search(Some("rust"), None, Page::default()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};
pub use repository::{Page, Paged};

// Repository re-exports for convenience
pub use repository::book::{BookFilter, BookRepository, NewBook};
pub use repository::fee::{FeeFilter, FeeRepository, NewFee};
pub use repository::transaction::{TransactionFilter, TransactionRepository};
pub use repository::user::{NewUser, UserRepository};
