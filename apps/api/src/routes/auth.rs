//! Login and token refresh exchanges.
//!
//! `POST /api/token` trades credentials for an access/refresh pair;
//! `POST /api/token/refresh` trades a live refresh token for a new access
//! token. Failures are deliberately uniform: a missing user and a wrong
//! password produce the same response.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::verify_password;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// POST /api/token
pub async fn obtain_token(
    State(state): State<AppState>,
    Json(body): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let invalid = || ApiError::Unauthorized("Invalid username or password".to_string());

    let user = state
        .db
        .users()
        .get_by_username(&body.username)
        .await?
        .ok_or_else(invalid)?;

    if !user.is_active || !verify_password(&body.password, &user.password_hash) {
        return Err(invalid());
    }

    let access = state.jwt.generate_access_token(&user)?;
    let refresh = state.jwt.generate_refresh_token(&user)?;

    state.db.users().touch_last_login(&user.id).await?;

    info!(username = %user.username, "Login");

    Ok(Json(TokenResponse { access, refresh }))
}

/// POST /api/token/refresh
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let claims = state.jwt.validate_refresh_token(&body.refresh)?;

    // The account may have been deactivated since the refresh token was
    // issued; re-check before minting a new access token.
    let user = state
        .db
        .users()
        .get_by_id(&claims.sub)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::Unauthorized("Account is not active".to_string()))?;

    let access = state.jwt.generate_access_token(&user)?;

    Ok(Json(RefreshResponse { access }))
}
