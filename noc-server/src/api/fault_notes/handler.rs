//! Fault Note API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::FaultNote;

use crate::core::ServerState;
use crate::db::repository::{fault, fault_note};
use crate::utils::{AppError, AppResult};

/// GET /api/fault-notes/{fault_id} - notes for a fault, oldest first
pub async fn list_for_fault(
    State(state): State<ServerState>,
    Path(fault_id): Path<i64>,
) -> AppResult<Json<Vec<FaultNote>>> {
    fault::find_by_id(&state.pool, fault_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Fault {fault_id} not found")))?;

    let notes = fault_note::find_by_fault(&state.pool, fault_id).await?;
    Ok(Json(notes))
}
