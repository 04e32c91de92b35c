//! # Book Repository
//!
//! Database operations for the book catalog.
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Two Search Surfaces                                  │
//! │                                                                         │
//! │  list(filter, page)          General browsing:                         │
//! │    ?search=rust              free text over title/authors/isbn/category│
//! │    ?category=&status=...     equality filters, AND-combined            │
//! │    ?ordering=-published_date whitelisted ORDER BY                      │
//! │                                                                         │
//! │  search(title, author, page) Dedicated lookup:                         │
//! │    case-insensitive substring on title AND/OR authors,                 │
//! │    always ordered by title ascending                                   │
//! │                                                                         │
//! │  Both return the total row count alongside the page so callers can     │
//! │  paginate. LIKE over lower() is fine at library-catalog scale.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::{Page, Paged};
use libris_core::{Book, BookStatus};

/// All book columns, in struct field order. Shared by every SELECT here.
const BOOK_COLUMNS: &str = r#"
    id, isbn, title, authors, category, publisher, published_date,
    description, page_count, language, status, cover_image_url,
    created_at, updated_at
"#;

// =============================================================================
// Filters
// =============================================================================

/// Equality/substring filters for catalog browsing. All optional,
/// AND-combined when present.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Free-text substring over title, authors, isbn, and category.
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<BookStatus>,
    pub language: Option<String>,
    pub publisher: Option<String>,
    /// Whitelisted ordering key, optionally `-` prefixed for descending.
    pub ordering: Option<String>,
}

impl BookFilter {
    /// Resolves the ordering parameter to a safe ORDER BY clause.
    ///
    /// Unknown keys fall back to the default (title ascending) rather than
    /// erroring, matching the forgiving behavior of the list endpoint.
    fn order_clause(&self) -> &'static str {
        match self.ordering.as_deref() {
            Some("title") | None => "title ASC",
            Some("-title") => "title DESC",
            Some("published_date") => "published_date ASC",
            Some("-published_date") => "published_date DESC",
            Some("created_at") => "created_at ASC",
            Some("-created_at") => "created_at DESC",
            Some(_) => "title ASC",
        }
    }
}

/// Fields needed to create a catalog entry. The repository stamps id and
/// timestamps; status starts as given (normally Available).
#[derive(Debug, Clone)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub authors: String,
    pub category: String,
    pub publisher: String,
    pub published_date: Option<NaiveDate>,
    pub description: String,
    pub page_count: Option<i64>,
    pub language: String,
    pub status: BookStatus,
    pub cover_image_url: Option<String>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for book database operations.
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    /// Creates a new BookRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookRepository { pool }
    }

    /// Inserts a new catalog entry.
    ///
    /// ## Returns
    /// The created book with generated ID and timestamps.
    pub async fn insert(&self, new: NewBook) -> DbResult<Book> {
        let now = Utc::now();
        let book = Book {
            id: Uuid::new_v4().to_string(),
            isbn: new.isbn,
            title: new.title,
            authors: new.authors,
            category: new.category,
            publisher: new.publisher,
            published_date: new.published_date,
            description: new.description,
            page_count: new.page_count,
            language: new.language,
            status: new.status,
            cover_image_url: new.cover_image_url,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %book.id, isbn = %book.isbn, "Inserting book");

        sqlx::query(
            r#"
            INSERT INTO books (
                id, isbn, title, authors, category, publisher, published_date,
                description, page_count, language, status, cover_image_url,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&book.id)
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.authors)
        .bind(&book.category)
        .bind(&book.publisher)
        .bind(book.published_date)
        .bind(&book.description)
        .bind(book.page_count)
        .bind(&book.language)
        .bind(book.status)
        .bind(&book.cover_image_url)
        .bind(book.created_at)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(book)
    }

    /// Gets a book by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1");
        let book = sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    /// Gets a book by its ISBN.
    pub async fn get_by_isbn(&self, isbn: &str) -> DbResult<Option<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE isbn = ?1");
        let book = sqlx::query_as::<_, Book>(&sql)
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    /// Lists catalog entries matching a filter.
    ///
    /// Every filter is optional; absent filters match everything. The WHERE
    /// clause is static SQL with NULL-disabled branches so all inputs stay
    /// bound parameters.
    pub async fn list(&self, filter: &BookFilter, page: Page) -> DbResult<Paged<Book>> {
        debug!(?filter, "Listing books");

        const WHERE_CLAUSE: &str = r#"
            (?1 IS NULL OR lower(title) LIKE '%' || lower(?1) || '%'
                        OR lower(authors) LIKE '%' || lower(?1) || '%'
                        OR lower(isbn) LIKE '%' || lower(?1) || '%'
                        OR lower(category) LIKE '%' || lower(?1) || '%')
            AND (?2 IS NULL OR category = ?2)
            AND (?3 IS NULL OR status = ?3)
            AND (?4 IS NULL OR language = ?4)
            AND (?5 IS NULL OR publisher = ?5)
        "#;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM books WHERE {WHERE_CLAUSE}"
        ))
        .bind(&filter.search)
        .bind(&filter.category)
        .bind(filter.status)
        .bind(&filter.language)
        .bind(&filter.publisher)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE {WHERE_CLAUSE} ORDER BY {} LIMIT ?6 OFFSET ?7",
            filter.order_clause()
        );

        let items = sqlx::query_as::<_, Book>(&sql)
            .bind(&filter.search)
            .bind(&filter.category)
            .bind(filter.status)
            .bind(&filter.language)
            .bind(&filter.publisher)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(Paged {
            items,
            total,
            limit: page.limit,
            offset: page.offset,
        })
    }

    /// Dedicated title/author search.
    ///
    /// Case-insensitive substring match; when both terms are supplied a book
    /// must match both (AND semantics). Ordered by title ascending.
    pub async fn search(
        &self,
        title: Option<&str>,
        author: Option<&str>,
        page: Page,
    ) -> DbResult<Paged<Book>> {
        debug!(?title, ?author, "Searching books");

        const WHERE_CLAUSE: &str = r#"
            (?1 IS NULL OR lower(title) LIKE '%' || lower(?1) || '%')
            AND (?2 IS NULL OR lower(authors) LIKE '%' || lower(?2) || '%')
        "#;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM books WHERE {WHERE_CLAUSE}"
        ))
        .bind(title)
        .bind(author)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE {WHERE_CLAUSE} ORDER BY title ASC LIMIT ?3 OFFSET ?4"
        );

        let items = sqlx::query_as::<_, Book>(&sql)
            .bind(title)
            .bind(author)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(Paged {
            items,
            total,
            limit: page.limit,
            offset: page.offset,
        })
    }

    /// Updates a catalog entry.
    ///
    /// Touches catalog fields and status; `updated_at` is bumped here, in
    /// the write path, on every update. `created_at` and `id` never change.
    pub async fn update(&self, book: &Book) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE books SET
                isbn = ?2,
                title = ?3,
                authors = ?4,
                category = ?5,
                publisher = ?6,
                published_date = ?7,
                description = ?8,
                page_count = ?9,
                language = ?10,
                status = ?11,
                cover_image_url = ?12,
                updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(&book.id)
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.authors)
        .bind(&book.category)
        .bind(&book.publisher)
        .bind(book.published_date)
        .bind(&book.description)
        .bind(book.page_count)
        .bind(&book.language)
        .bind(book.status)
        .bind(&book.cover_image_url)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Book", &book.id));
        }

        Ok(())
    }

    /// Deletes a catalog entry.
    ///
    /// Rejected while any transaction references the book (circulation
    /// history is never orphaned). Fees pointing at the book keep existing
    /// with their book reference nulled, in the same database transaction.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let transaction_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE book_id = ?1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        if transaction_count > 0 {
            return Err(DbError::referential(format!(
                "Book {id} has {transaction_count} transaction(s) and cannot be deleted"
            )));
        }

        let now = Utc::now();
        sqlx::query("UPDATE fees SET book_id = NULL, updated_at = ?2 WHERE book_id = ?1")
            .bind(id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM books WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Book", id));
        }

        tx.commit().await?;

        debug!(id = %id, "Book deleted");
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

    pub(crate) fn sample_book(isbn: &str, title: &str, authors: &str) -> NewBook {
        NewBook {
            isbn: isbn.to_string(),
            title: title.to_string(),
            authors: authors.to_string(),
            category: "Programming".to_string(),
            publisher: "No Starch Press".to_string(),
            published_date: NaiveDate::from_ymd_opt(2019, 8, 6),
            description: String::new(),
            page_count: Some(560),
            language: "en".to_string(),
            status: BookStatus::Available,
            cover_image_url: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.books();

        let created = repo
            .insert(sample_book("9781718500440", "The Rust Programming Language", "Klabnik, Nichols"))
            .await
            .unwrap();

        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.isbn, "9781718500440");
        assert_eq!(fetched.status, BookStatus::Available);

        let by_isbn = repo.get_by_isbn("9781718500440").await.unwrap().unwrap();
        assert_eq!(by_isbn.id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_isbn_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.books();

        repo.insert(sample_book("9781718500440", "A", "X")).await.unwrap();
        let err = repo
            .insert(sample_book("9781718500440", "B", "Y"))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.books();

        repo.insert(sample_book("9781718500440", "The Rust Programming Language", "Steve Klabnik"))
            .await
            .unwrap();
        repo.insert(sample_book("9781593278281", "Rust in Action", "Tim McNamara"))
            .await
            .unwrap();
        repo.insert(sample_book("9780134685991", "Effective Java", "Joshua Bloch"))
            .await
            .unwrap();

        let result = repo.search(Some("rust"), None, Page::default()).await.unwrap();
        assert_eq!(result.total, 2);
        // Ordered by title ascending
        assert_eq!(result.items[0].title, "Rust in Action");
        assert_eq!(result.items[1].title, "The Rust Programming Language");

        // AND semantics when both terms supplied
        let result = repo
            .search(Some("rust"), Some("klabnik"), Page::default())
            .await
            .unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].authors, "Steve Klabnik");

        // No terms: everything
        let result = repo.search(None, None, Page::default()).await.unwrap();
        assert_eq!(result.total, 3);
    }

    #[tokio::test]
    async fn test_list_filters_and_ordering() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.books();

        let mut fiction = sample_book("9780000000001", "Dune", "Frank Herbert");
        fiction.category = "Fiction".to_string();
        repo.insert(fiction).await.unwrap();
        repo.insert(sample_book("9780000000002", "Clean Code", "Robert Martin"))
            .await
            .unwrap();

        let filter = BookFilter {
            category: Some("Fiction".to_string()),
            ..Default::default()
        };
        let result = repo.list(&filter, Page::default()).await.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].title, "Dune");

        let filter = BookFilter {
            ordering: Some("-title".to_string()),
            ..Default::default()
        };
        let result = repo.list(&filter, Page::default()).await.unwrap();
        assert_eq!(result.items[0].title, "Dune");
        assert_eq!(result.items[1].title, "Clean Code");
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.books();

        for i in 0..5 {
            repo.insert(sample_book(
                &format!("978000000100{i}"),
                &format!("Book {i}"),
                "Author",
            ))
            .await
            .unwrap();
        }

        let page = repo
            .list(&BookFilter::default(), Page::new(2, 2))
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].title, "Book 2");
    }

    #[tokio::test]
    async fn test_update_bumps_updated_at() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.books();

        let mut book = repo
            .insert(sample_book("9781718500440", "Old Title", "Author"))
            .await
            .unwrap();

        book.title = "New Title".to_string();
        repo.update(&book).await.unwrap();

        let fetched = repo.get_by_id(&book.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "New Title");
        assert!(fetched.updated_at >= book.updated_at);
    }

    #[tokio::test]
    async fn test_delete_nulls_fee_book_reference() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let user = db
            .users()
            .insert(crate::repository::user::NewUser {
                username: "debtor".to_string(),
                email: "debtor@example.org".to_string(),
                password_hash: "hash".to_string(),
                first_name: String::new(),
                last_name: String::new(),
                role: libris_core::UserRole::Student,
            })
            .await
            .unwrap();

        let book = db
            .books()
            .insert(sample_book("9781718500440", "Damaged Goods", "Author"))
            .await
            .unwrap();

        // Manual damage fee referencing the book, no transaction history
        let fee = db
            .fees()
            .insert(crate::repository::fee::NewFee {
                user_id: user.id,
                book_id: Some(book.id.clone()),
                transaction_id: None,
                kind: libris_core::FeeKind::Damage,
                amount_cents: 500,
                notes: None,
            })
            .await
            .unwrap();

        db.books().delete(&book.id).await.unwrap();

        // The fee survives with its book reference nulled
        let fee = db.fees().get_by_id(&fee.id).await.unwrap().unwrap();
        assert!(fee.book_id.is_none());
        assert_eq!(fee.amount_cents, 500);
    }

    #[tokio::test]
    async fn test_delete_unknown_book() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.books().delete("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
