//! Department API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Department, DepartmentCreate};

use crate::core::ServerState;
use crate::db::repository::department;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

/// GET /api/departments - all departments, sorted by name
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Department>>> {
    let departments = department::find_all(&state.pool).await?;
    Ok(Json(departments))
}

/// POST /api/departments - create (admin)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DepartmentCreate>,
) -> AppResult<Json<Department>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    let department = department::create(&state.pool, payload).await?;
    Ok(Json(department))
}

/// PUT /api/departments/{id} - rename (admin)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<DepartmentCreate>,
) -> AppResult<Json<Department>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    let department = department::update(&state.pool, id, &payload.name).await?;
    Ok(Json(department))
}

/// DELETE /api/departments/{id} - delete (admin)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let deleted = department::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::not_found(format!("Department {id} not found")));
    }
    Ok(Json(true))
}
