//! User Repository
//!
//! Soft delete: `is_active = 0` rows stay in the table but are excluded
//! from every read here, so they can neither be listed nor authenticate.

use super::{RepoError, RepoResult};
use shared::models::{Role, User, UserPublic, UserUpdate};
use sqlx::SqlitePool;

const COLUMNS: &str =
    "id, username, email, password_hash, role, department_id, is_active, created_at, updated_at";

const PUBLIC_COLUMNS: &str = "u.id, u.username, u.email, u.role, u.department_id, d.name AS department_name, u.is_active, u.created_at";

pub async fn find_all_active(pool: &SqlitePool) -> RepoResult<Vec<UserPublic>> {
    let users = sqlx::query_as::<_, UserPublic>(&format!(
        "SELECT {PUBLIC_COLUMNS} FROM users u LEFT JOIN departments d ON d.id = u.department_id WHERE u.is_active = 1 ORDER BY u.created_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(users)
}

pub async fn find_public_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<UserPublic>> {
    let user = sqlx::query_as::<_, UserPublic>(&format!(
        "SELECT {PUBLIC_COLUMNS} FROM users u LEFT JOIN departments d ON d.id = u.department_id WHERE u.id = ? AND u.is_active = 1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE id = ? AND is_active = 1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Full row including the password hash; used only by the login path.
pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE username = ? AND is_active = 1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn create(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
    role: Role,
    department_id: Option<i64>,
) -> RepoResult<UserPublic> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = ?")
        .bind(username)
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        return Err(RepoError::Duplicate(format!(
            "Username '{username}' is already taken"
        )));
    }

    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (username, email, password_hash, role, department_id, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, 1, ?, ?) RETURNING id",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(department_id)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_public_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: UserUpdate) -> RepoResult<UserPublic> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE users SET username = COALESCE(?, username), email = COALESCE(?, email), role = COALESCE(?, role), department_id = COALESCE(?, department_id), updated_at = ? WHERE id = ? AND is_active = 1",
    )
    .bind(&data.username)
    .bind(&data.email)
    .bind(data.role)
    .bind(data.department_id)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_public_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

/// Soft delete. The row remains for history attribution but disappears
/// from all reads.
pub async fn soft_delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE users SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
