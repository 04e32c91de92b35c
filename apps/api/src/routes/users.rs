//! User account endpoints (admin only).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use libris_core::access::Operation;
use libris_core::validation::validate_username;
use libris_core::{User, UserRole, ValidationError};
use libris_db::{NewUser, Page};

use crate::auth::{hash_password, Principal};
use crate::error::ApiError;
use crate::AppState;

// =============================================================================
// Request Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct UserListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, rename = "user_type")]
    pub role: UserRole,
}

/// Partial update; absent fields keep their current values. Password
/// changes go through the dedicated `password` field and are re-hashed.
#[derive(Debug, Deserialize)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(rename = "user_type")]
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
    Query(params): Query<UserListParams>,
) -> Result<Json<Vec<User>>, ApiError> {
    principal.require(Operation::UserManagement)?;

    let page = Page::new(params.limit.unwrap_or(20), params.offset.unwrap_or(0));
    let users = state.db.users().list(page).await?;

    Ok(Json(users))
}

/// GET /api/users/{id}
pub async fn get(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    principal.require(Operation::UserManagement)?;

    let user = state
        .db
        .users()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {id}")))?;

    Ok(Json(user))
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Json(body): Json<UserCreate>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    principal.require(Operation::UserManagement)?;

    validate_username(&body.username)?;
    if body.password.is_empty() {
        return Err(ValidationError::required("password").into());
    }

    let password_hash = hash_password(&body.password)?;

    let user = state
        .db
        .users()
        .insert(NewUser {
            username: body.username.trim().to_string(),
            email: body.email,
            password_hash,
            first_name: body.first_name,
            last_name: body.last_name,
            role: body.role,
        })
        .await?;

    info!(id = %user.id, username = %user.username, by = %principal.username, "User created");

    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/users/{id}
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(body): Json<UserUpdate>,
) -> Result<Json<User>, ApiError> {
    principal.require(Operation::UserManagement)?;

    let mut user = state
        .db
        .users()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {id}")))?;

    if let Some(username) = body.username {
        validate_username(&username)?;
        user.username = username.trim().to_string();
    }
    if let Some(email) = body.email {
        user.email = email;
    }
    if let Some(first_name) = body.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = body.last_name {
        user.last_name = last_name;
    }
    if let Some(role) = body.role {
        user.role = role;
    }
    if let Some(is_active) = body.is_active {
        user.is_active = is_active;
    }

    state.db.users().update(&user).await?;

    if let Some(password) = body.password {
        if password.is_empty() {
            return Err(ValidationError::required("password").into());
        }
        let password_hash = hash_password(&password)?;
        state.db.users().set_password_hash(&id, &password_hash).await?;
    }

    let user = state
        .db
        .users()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {id}")))?;

    Ok(Json(user))
}

/// DELETE /api/users/{id}
///
/// Restricted while the user has transactions; the store rejects the
/// delete and the client sees a 400.
pub async fn remove(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    principal.require(Operation::UserManagement)?;

    state.db.users().delete(&id).await?;

    info!(id = %id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}
