//! Shared fixtures for engine tests: an in-memory database plus seeded
//! users and books.

use libris_core::{BookStatus, CirculationPolicy, UserRole};
use libris_db::{Database, DbConfig, NewBook, NewUser};

use crate::CirculationEngine;

/// A fresh in-memory database with migrations applied.
pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// An engine with default policy over a fresh in-memory database.
pub async fn test_engine() -> CirculationEngine {
    CirculationEngine::new(test_db().await, CirculationPolicy::default())
}

pub async fn seed_user(db: &Database, username: &str) -> String {
    db.users()
        .insert(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.org"),
            password_hash: "argon2-hash".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            role: UserRole::Student,
        })
        .await
        .unwrap()
        .id
}

pub async fn seed_book(db: &Database, isbn: &str, title: &str) -> String {
    db.books()
        .insert(NewBook {
            isbn: isbn.to_string(),
            title: title.to_string(),
            authors: "Test Author".to_string(),
            category: String::new(),
            publisher: String::new(),
            published_date: None,
            description: String::new(),
            page_count: None,
            language: "en".to_string(),
            status: BookStatus::Available,
            cover_image_url: None,
        })
        .await
        .unwrap()
        .id
}
