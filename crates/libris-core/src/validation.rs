//! # Validation Module
//!
//! Input validation utilities for Libris.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request deserialization (serde)                              │
//! │  ├── Type validation (shape, enum variants)                            │
//! │  └── Rejects malformed JSON outright                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │  ├── ISBN format, field lengths, positive amounts                      │
//! │  └── Runs in the API handlers before the engine is invoked             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE constraints                                     │
//! │  └── Partial unique index on open checkouts                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::ISBN_LENGTH;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a 13-character ISBN.
///
/// ## Rules
/// - Must not be empty
/// - Must be exactly 13 characters
/// - Digits only, except a trailing `X` check character
///
/// ## Example
/// ```rust
/// use libris_core::validation::validate_isbn;
///
/// assert!(validate_isbn("9780306406157").is_ok());
/// assert!(validate_isbn("978-0306406157").is_err());
/// assert!(validate_isbn("").is_err());
/// ```
pub fn validate_isbn(isbn: &str) -> ValidationResult<()> {
    let isbn = isbn.trim();

    if isbn.is_empty() {
        return Err(ValidationError::required("isbn"));
    }

    if isbn.len() != ISBN_LENGTH {
        return Err(ValidationError::InvalidFormat {
            field: "isbn".to_string(),
            reason: format!("must be exactly {ISBN_LENGTH} characters"),
        });
    }

    let valid = isbn
        .char_indices()
        .all(|(i, c)| c.is_ascii_digit() || (c == 'X' && i == ISBN_LENGTH - 1));
    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "isbn".to_string(),
            reason: "must contain only digits (final character may be X)".to_string(),
        });
    }

    Ok(())
}

/// Validates a book title.
pub fn validate_title(title: &str) -> ValidationResult<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::required("title"));
    }

    if title.len() > 255 {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: 255,
        });
    }

    Ok(())
}

/// Validates the authors field (comma-separated names).
pub fn validate_authors(authors: &str) -> ValidationResult<()> {
    let authors = authors.trim();

    if authors.is_empty() {
        return Err(ValidationError::required("authors"));
    }

    if authors.len() > 500 {
        return Err(ValidationError::TooLong {
            field: "authors".to_string(),
            max: 500,
        });
    }

    Ok(())
}

/// Validates a username.
///
/// ## Rules
/// - Must not be empty
/// - Maximum 150 characters
/// - Letters, digits, and `@.+-_` only
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::required("username"));
    }

    if username.len() > 150 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 150,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, digits, and @.+-_".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns all/default results)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a manual fee amount in cents.
///
/// ## Rules
/// - Must be strictly positive (zero-amount fees are never recorded)
pub fn validate_fee_amount(amount_cents: i64) -> ValidationResult<()> {
    if amount_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount_cents".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_isbn() {
        assert!(validate_isbn("9780306406157").is_ok());
        assert!(validate_isbn("978030640615X").is_ok());
        assert!(validate_isbn(" 9780306406157 ").is_ok());

        assert!(validate_isbn("").is_err());
        assert!(validate_isbn("123").is_err());
        assert!(validate_isbn("978-030640615").is_err());
        assert!(validate_isbn("X780306406157").is_err());
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("The Rust Programming Language").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title(&"a".repeat(256)).is_err());
    }

    #[test]
    fn test_validate_authors() {
        assert!(validate_authors("Steve Klabnik, Carol Nichols").is_ok());
        assert!(validate_authors("").is_err());
        assert!(validate_authors(&"a".repeat(501)).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("reader_01").is_ok());
        assert!(validate_username("jane.doe@example.org").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  rust  ").unwrap(), "rust");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_fee_amount() {
        assert!(validate_fee_amount(50).is_ok());
        assert!(validate_fee_amount(0).is_err());
        assert!(validate_fee_amount(-100).is_err());
    }
}
