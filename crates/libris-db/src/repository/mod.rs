//! # Repository Module
//!
//! Database repository implementations for Libris.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  API Handler                                                           │
//! │       │                                                                 │
//! │       │  db.books().search(Some("rust"), None, page)                   │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  BookRepository                                                        │
//! │  ├── search(&self, title, author, page)                                │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── insert(&self, draft)                                              │
//! │  └── update(&self, book)                                               │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  The circulation engine does NOT go through repositories for its       │
//! │  compound operations - it runs narrow guarded statements inside one    │
//! │  sqlx transaction so checkout/return stay atomic.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`user::UserRepository`] - Account CRUD with restrict-on-delete
//! - [`book::BookRepository`] - Catalog CRUD, filters, and search
//! - [`transaction::TransactionRepository`] - Circulation history access
//! - [`fee::FeeRepository`] - Fee records

pub mod book;
pub mod fee;
pub mod transaction;
pub mod user;

// =============================================================================
// Pagination
// =============================================================================

/// Default page size when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Hard cap on page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A limit/offset window over a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Creates a page, clamping the limit to `1..=MAX_PAGE_SIZE` and the
    /// offset to non-negative.
    pub fn new(limit: i64, offset: i64) -> Self {
        Page {
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            offset: offset.max(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Page {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

/// A page of results plus the total row count for the same filter.
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_clamps() {
        let page = Page::new(0, -5);
        assert_eq!(page.limit, 1);
        assert_eq!(page.offset, 0);

        let page = Page::new(10_000, 40);
        assert_eq!(page.limit, MAX_PAGE_SIZE);
        assert_eq!(page.offset, 40);
    }

    #[test]
    fn test_page_default() {
        let page = Page::default();
        assert_eq!(page.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(page.offset, 0);
    }
}
