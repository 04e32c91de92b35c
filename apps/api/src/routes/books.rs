//! Book catalog endpoints.
//!
//! Reads are open to every authenticated principal; writes require the
//! staff/admin side of the access matrix.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use libris_core::access::Operation;
use libris_core::validation::{validate_authors, validate_isbn, validate_search_query, validate_title};
use libris_core::{Book, BookStatus};
use libris_db::{BookFilter, NewBook, Page};

use crate::auth::Principal;
use crate::error::ApiError;
use crate::routes::PagedResponse;
use crate::AppState;

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct BookListParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<BookStatus>,
    pub language: Option<String>,
    pub publisher: Option<String>,
    pub ordering: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct BookSearchParams {
    pub title: Option<String>,
    pub author: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct BookCreate {
    pub isbn: String,
    pub title: String,
    pub authors: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub publisher: String,
    pub published_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    pub page_count: Option<i64>,
    #[serde(default)]
    pub language: String,
    pub status: Option<BookStatus>,
    pub cover_image_url: Option<String>,
}

/// Partial update; absent fields keep their current values.
#[derive(Debug, Deserialize)]
pub struct BookUpdate {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub authors: Option<String>,
    pub category: Option<String>,
    pub publisher: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub page_count: Option<i64>,
    pub language: Option<String>,
    pub status: Option<BookStatus>,
    pub cover_image_url: Option<String>,
}

fn page_from(limit: Option<i64>, offset: Option<i64>) -> Page {
    match (limit, offset) {
        (None, None) => Page::default(),
        (l, o) => Page::new(l.unwrap_or(libris_db::repository::DEFAULT_PAGE_SIZE), o.unwrap_or(0)),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/books
pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
    Query(params): Query<BookListParams>,
) -> Result<Json<PagedResponse<Book>>, ApiError> {
    principal.require(Operation::BookRead)?;

    let search = match params.search.as_deref() {
        Some(q) => Some(validate_search_query(q)?).filter(|s| !s.is_empty()),
        None => None,
    };

    let filter = BookFilter {
        search,
        category: params.category,
        status: params.status,
        language: params.language,
        publisher: params.publisher,
        ordering: params.ordering,
    };

    let paged = state
        .db
        .books()
        .list(&filter, page_from(params.limit, params.offset))
        .await?;

    Ok(Json(paged.into()))
}

/// GET /api/books/search?title=&author=
pub async fn search(
    State(state): State<AppState>,
    principal: Principal,
    Query(params): Query<BookSearchParams>,
) -> Result<Json<PagedResponse<Book>>, ApiError> {
    principal.require(Operation::BookRead)?;

    let title = match params.title.as_deref() {
        Some(q) => Some(validate_search_query(q)?).filter(|s| !s.is_empty()),
        None => None,
    };
    let author = match params.author.as_deref() {
        Some(q) => Some(validate_search_query(q)?).filter(|s| !s.is_empty()),
        None => None,
    };

    let paged = state
        .db
        .books()
        .search(
            title.as_deref(),
            author.as_deref(),
            page_from(params.limit, params.offset),
        )
        .await?;

    Ok(Json(paged.into()))
}

/// GET /api/books/{id}
pub async fn get(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    principal.require(Operation::BookRead)?;

    let book = state
        .db
        .books()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Book not found: {id}")))?;

    Ok(Json(book))
}

/// POST /api/books
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Json(body): Json<BookCreate>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    principal.require(Operation::BookWrite)?;

    validate_isbn(&body.isbn)?;
    validate_title(&body.title)?;
    validate_authors(&body.authors)?;

    let book = state
        .db
        .books()
        .insert(NewBook {
            isbn: body.isbn.trim().to_string(),
            title: body.title,
            authors: body.authors,
            category: body.category,
            publisher: body.publisher,
            published_date: body.published_date,
            description: body.description,
            page_count: body.page_count,
            language: body.language,
            status: body.status.unwrap_or_default(),
            cover_image_url: body.cover_image_url,
        })
        .await?;

    info!(id = %book.id, isbn = %book.isbn, "Book created");

    Ok((StatusCode::CREATED, Json(book)))
}

/// PUT /api/books/{id}
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(body): Json<BookUpdate>,
) -> Result<Json<Book>, ApiError> {
    principal.require(Operation::BookWrite)?;

    let mut book = state
        .db
        .books()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Book not found: {id}")))?;

    if let Some(isbn) = body.isbn {
        validate_isbn(&isbn)?;
        book.isbn = isbn.trim().to_string();
    }
    if let Some(title) = body.title {
        validate_title(&title)?;
        book.title = title;
    }
    if let Some(authors) = body.authors {
        validate_authors(&authors)?;
        book.authors = authors;
    }
    if let Some(category) = body.category {
        book.category = category;
    }
    if let Some(publisher) = body.publisher {
        book.publisher = publisher;
    }
    if let Some(published_date) = body.published_date {
        book.published_date = Some(published_date);
    }
    if let Some(description) = body.description {
        book.description = description;
    }
    if let Some(page_count) = body.page_count {
        book.page_count = Some(page_count);
    }
    if let Some(language) = body.language {
        book.language = language;
    }
    if let Some(status) = body.status {
        // Manual lost/reserved overrides land here; borrowed/available flips
        // normally belong to the engine.
        book.status = status;
    }
    if let Some(cover_image_url) = body.cover_image_url {
        book.cover_image_url = Some(cover_image_url);
    }

    state.db.books().update(&book).await?;

    let book = state
        .db
        .books()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Book not found: {id}")))?;

    Ok(Json(book))
}

/// DELETE /api/books/{id}
pub async fn remove(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    principal.require(Operation::BookWrite)?;

    state.db.books().delete(&id).await?;

    info!(id = %id, "Book deleted");

    Ok(StatusCode::NO_CONTENT)
}
