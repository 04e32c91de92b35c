//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;

use libris_core::{CirculationPolicy, Money};

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP server port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT access token lifetime in seconds
    pub jwt_access_lifetime_secs: i64,

    /// JWT refresh token lifetime in seconds
    pub jwt_refresh_lifetime_secs: i64,

    /// Loan period in days for checkouts with no explicit due date
    pub loan_period_days: i64,

    /// Overdue charge per day, in cents
    pub overdue_rate_cents: i64,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "libris.db".to_string()),

            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                // Development fallback; production MUST set this via environment
                "libris-dev-secret-change-in-production".to_string()
            }),

            jwt_access_lifetime_secs: env::var("JWT_ACCESS_LIFETIME_SECS")
                .unwrap_or_else(|_| "3600".to_string()) // 1 hour
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_ACCESS_LIFETIME_SECS".to_string()))?,

            jwt_refresh_lifetime_secs: env::var("JWT_REFRESH_LIFETIME_SECS")
                .unwrap_or_else(|_| "604800".to_string()) // 7 days
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_REFRESH_LIFETIME_SECS".to_string()))?,

            loan_period_days: env::var("LOAN_PERIOD_DAYS")
                .unwrap_or_else(|_| "14".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("LOAN_PERIOD_DAYS".to_string()))?,

            overdue_rate_cents: env::var("OVERDUE_RATE_CENTS")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("OVERDUE_RATE_CENTS".to_string()))?,
        };

        if config.loan_period_days <= 0 {
            return Err(ConfigError::InvalidValue("LOAN_PERIOD_DAYS".to_string()));
        }
        if config.overdue_rate_cents < 0 {
            return Err(ConfigError::InvalidValue("OVERDUE_RATE_CENTS".to_string()));
        }

        Ok(config)
    }

    /// The circulation policy these settings describe.
    pub fn circulation_policy(&self) -> CirculationPolicy {
        CirculationPolicy::new(
            self.loan_period_days,
            Money::from_cents(self.overdue_rate_cents),
        )
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
