//! JWT authentication module.
//!
//! Handles JWT token generation, validation, and refresh, plus the argon2
//! password hashing used by the login exchange. The [`Principal`] extractor
//! turns a Bearer token into the authenticated actor every protected
//! handler receives.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use libris_core::access::Operation;
use libris_core::{User, UserRole};

use crate::error::ApiError;
use crate::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Login name, for log lines and display
    pub username: String,

    /// Role driving the access matrix
    pub role: UserRole,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,

    /// Token type ("access" or "refresh")
    pub token_type: String,
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    access_lifetime_secs: i64,
    refresh_lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: String, access_lifetime_secs: i64, refresh_lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            access_lifetime_secs,
            refresh_lifetime_secs,
        }
    }

    /// Generate an access token for a user.
    pub fn generate_access_token(&self, user: &User) -> Result<String, ApiError> {
        self.generate(user, "access", self.access_lifetime_secs)
    }

    /// Generate a refresh token for a user.
    pub fn generate_refresh_token(&self, user: &User) -> Result<String, ApiError> {
        self.generate(user, "refresh", self.refresh_lifetime_secs)
    }

    fn generate(&self, user: &User, token_type: &str, lifetime: i64) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(lifetime);

        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: token_type.to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("Failed to generate token: {e}")))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ApiError::Unauthorized(format!("Invalid token: {e}")))?;

        Ok(token_data.claims)
    }

    /// Validate that a token is an access token.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, ApiError> {
        let claims = self.validate_token(token)?;

        if claims.token_type != "access" {
            return Err(ApiError::Unauthorized("Expected access token".to_string()));
        }

        Ok(claims)
    }

    /// Validate that a token is a refresh token.
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, ApiError> {
        let claims = self.validate_token(token)?;

        if claims.token_type != "refresh" {
            return Err(ApiError::Unauthorized("Expected refresh token".to_string()));
        }

        Ok(claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a password against its stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Principal
// =============================================================================

/// The authenticated actor issuing a request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: String,
    pub username: String,
    pub role: UserRole,
}

impl Principal {
    /// Rejects with 403 unless the principal's role may perform `op`.
    pub fn require(&self, op: Operation) -> Result<(), ApiError> {
        if self.role.may(op) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "Role does not permit this operation ({op:?})"
            )))
        }
    }
}

impl FromRequestParts<AppState> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::Unauthorized("Expected Bearer token".to_string()))?;

        let claims = state.jwt.validate_access_token(token)?;

        Ok(Principal {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user(role: UserRole) -> User {
        User {
            id: "u-001".to_string(),
            username: "reader".to_string(),
            email: "reader@example.org".to_string(),
            password_hash: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            role,
            is_active: true,
            date_joined: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret".to_string(), 3600, 86400);
        let user = sample_user(UserRole::Staff);

        let access_token = manager.generate_access_token(&user).unwrap();
        let claims = manager.validate_access_token(&access_token).unwrap();

        assert_eq!(claims.sub, "u-001");
        assert_eq!(claims.username, "reader");
        assert_eq!(claims.role, UserRole::Staff);
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_refresh_token() {
        let manager = JwtManager::new("test-secret".to_string(), 3600, 86400);
        let user = sample_user(UserRole::Student);

        let refresh_token = manager.generate_refresh_token(&user).unwrap();
        let claims = manager.validate_refresh_token(&refresh_token).unwrap();
        assert_eq!(claims.token_type, "refresh");
    }

    #[test]
    fn test_wrong_token_type() {
        let manager = JwtManager::new("test-secret".to_string(), 3600, 86400);
        let user = sample_user(UserRole::Student);

        let access_token = manager.generate_access_token(&user).unwrap();

        // Try to validate access token as refresh token
        let result = manager.validate_refresh_token(&access_token);
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("s3cret!").unwrap();
        assert!(verify_password("s3cret!", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret!", "not-a-hash"));
    }

    #[test]
    fn test_principal_require() {
        let principal = Principal {
            user_id: "u-001".to_string(),
            username: "reader".to_string(),
            role: UserRole::Student,
        };

        assert!(principal.require(Operation::BookRead).is_ok());
        assert!(matches!(
            principal.require(Operation::FeeAny),
            Err(ApiError::Forbidden(_))
        ));
    }
}
