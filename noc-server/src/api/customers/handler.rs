//! Customer API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Customer, CustomerCreate, CustomerUpdate, FaultWithRefs};

use crate::core::ServerState;
use crate::db::repository::{customer, fault};
use crate::faults::enrich_all;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// GET /api/customers
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Customer>>> {
    let customers = customer::find_all(&state.pool).await?;
    Ok(Json(customers))
}

/// GET /api/customers/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Customer>> {
    let found = customer::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer {id} not found")))?;
    Ok(Json(found))
}

/// GET /api/customers/{id}/history - the customer's faults, newest first
pub async fn fault_history(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<FaultWithRefs>>> {
    customer::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer {id} not found")))?;

    let mut faults = fault::find_by_customer(&state.pool, id).await?;
    enrich_all(&mut faults, shared::util::now_millis());
    Ok(Json(faults))
}

/// POST /api/customers - create (admin)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CustomerCreate>,
) -> AppResult<Json<Customer>> {
    validate_required_text(&payload.company, "company", MAX_NAME_LEN)?;
    validate_required_text(&payload.circuit_id, "circuit_id", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.ip_address, "ip_address", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.pop_site, "pop_site", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.location, "location", MAX_NAME_LEN)?;

    let created = customer::create(&state.pool, payload).await?;
    Ok(Json(created))
}

/// PUT /api/customers/{id} - partial update (admin)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerUpdate>,
) -> AppResult<Json<Customer>> {
    validate_optional_text(&payload.company, "company", MAX_NAME_LEN)?;
    validate_optional_text(&payload.circuit_id, "circuit_id", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.ip_address, "ip_address", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.pop_site, "pop_site", MAX_SHORT_TEXT_LEN)?;

    let updated = customer::update(&state.pool, id, payload).await?;
    Ok(Json(updated))
}

/// DELETE /api/customers/{id} - delete (admin)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let deleted = customer::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::not_found(format!("Customer {id} not found")));
    }
    Ok(Json(true))
}
