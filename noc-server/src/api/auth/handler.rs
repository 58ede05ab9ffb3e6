//! Auth API Handlers

use std::time::Duration;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::models::UserPublic;

use crate::auth::verify_password;
use crate::core::ServerState;
use crate::db::repository::user;
use crate::utils::{AppError, AppResult};

/// Fixed delay on failed logins; keeps "no such user" and "wrong
/// password" timing-indistinguishable.
const FAILED_LOGIN_DELAY_MS: u64 = 250;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserPublic,
}

/// POST /api/auth/login
///
/// Soft-deleted users cannot authenticate: the lookup only sees active
/// rows, so they fail exactly like unknown usernames.
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let found = user::find_by_username(&state.pool, &payload.username).await?;

    let Some(account) = found else {
        return failed_login(&payload.username).await;
    };
    if !verify_password(&payload.password, &account.password_hash) {
        return failed_login(&payload.username).await;
    }

    let token = state
        .jwt
        .generate_token(
            account.id,
            &account.username,
            account.role,
            account.department_id,
        )
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    let user = user::find_public_by_id(&state.pool, account.id)
        .await?
        .ok_or_else(|| AppError::internal("Authenticated user vanished"))?;

    tracing::info!(target: "security", username = %user.username, "Login successful");
    Ok(Json(LoginResponse { token, user }))
}

async fn failed_login(username: &str) -> AppResult<Json<LoginResponse>> {
    tracing::warn!(target: "security", username = %username, "Login failed");
    tokio::time::sleep(Duration::from_millis(FAILED_LOGIN_DELAY_MS)).await;
    Err(AppError::invalid_credentials())
}
