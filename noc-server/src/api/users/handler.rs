//! User API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Role, UserCreate, UserPublic, UserUpdate};

use crate::auth::hash_password;
use crate::core::ServerState;
use crate::db::repository::user;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// GET /api/users - active users, newest first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<UserPublic>>> {
    let users = user::find_all_active(&state.pool).await?;
    Ok(Json(users))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<UserPublic>> {
    let found = user::find_public_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
    Ok(Json(found))
}

/// POST /api/users - create
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<UserPublic>> {
    validate_required_text(&payload.username, "username", MAX_NAME_LEN)?;
    validate_required_text(&payload.email, "email", MAX_EMAIL_LEN)?;
    validate_required_text(&payload.password, "password", MAX_PASSWORD_LEN)?;

    let password_hash = hash_password(&payload.password)?;
    let role = payload.role.unwrap_or(Role::User);

    let created = user::create(
        &state.pool,
        &payload.username,
        &payload.email,
        &password_hash,
        role,
        payload.department_id,
    )
    .await?;
    Ok(Json(created))
}

/// PUT /api/users/{id} - partial update; inactive users cannot be targeted
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<UserPublic>> {
    validate_optional_text(&payload.username, "username", MAX_NAME_LEN)?;
    validate_optional_text(&payload.email, "email", MAX_EMAIL_LEN)?;

    let updated = user::update(&state.pool, id, payload).await?;
    Ok(Json(updated))
}

/// DELETE /api/users/{id} - soft delete
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let deleted = user::soft_delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::not_found(format!("User {id} not found")));
    }
    Ok(Json(true))
}
