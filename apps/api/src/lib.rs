//! # Libris API
//!
//! REST server over the circulation engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         API Surface                                     │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  /api/token    │  │ /api/books     │  │ /api/transactions          ││
//! │  │                │  │                │  │                            ││
//! │  │ • obtain pair  │  │ • list/filter  │  │ • checkout                 ││
//! │  │ • refresh      │  │ • search       │  │ • {id}/return              ││
//! │  │                │  │ • CRUD         │  │ • list/get/delete          ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐                                │
//! │  │ /api/fees      │  │ /api/users     │                                │
//! │  │                │  │                │                                │
//! │  │ • mark-as-paid │  │ • CRUD         │                                │
//! │  │ • mark-as-unpaid│ │   (admin only) │                                │
//! │  │ • CRUD         │  │                │                                │
//! │  └────────────────┘  └────────────────┘                                │
//! │                                                                         │
//! │  Every protected route: Bearer JWT ──► Principal ──► access matrix     │
//! │  ──► engine / repositories. Engine errors come back as 4xx JSON.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `HTTP_PORT` - HTTP server port (default: 8000)
//! - `DATABASE_PATH` - SQLite file path (default: libris.db)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_ACCESS_LIFETIME_SECS` - Access token lifetime (default: 3600)
//! - `JWT_REFRESH_LIFETIME_SECS` - Refresh token lifetime (default: 604800)
//! - `LOAN_PERIOD_DAYS` - Default loan period (default: 14)
//! - `OVERDUE_RATE_CENTS` - Overdue charge per day (default: 50)

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use libris_db::Database;
use libris_engine::CirculationEngine;

use crate::auth::JwtManager;
use crate::config::ApiConfig;

// Re-exports
pub use config::ConfigError;
pub use error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub engine: CirculationEngine,
    pub jwt: Arc<JwtManager>,
    pub config: ApiConfig,
}

impl AppState {
    /// Builds the state from a connected database and loaded configuration.
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let engine = CirculationEngine::new(db.clone(), config.circulation_policy());
        let jwt = Arc::new(JwtManager::new(
            config.jwt_secret.clone(),
            config.jwt_access_lifetime_secs,
            config.jwt_refresh_lifetime_secs,
        ));

        AppState {
            db,
            engine,
            jwt,
            config,
        }
    }
}
