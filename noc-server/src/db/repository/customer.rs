//! Customer Repository

use super::{RepoError, RepoResult};
use shared::models::{Customer, CustomerCreate, CustomerUpdate};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, company, circuit_id, type, location, ip_address, pop_site, email, switch_info, owner, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Customer>> {
    let customers = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {COLUMNS} FROM customers ORDER BY company COLLATE NOCASE ASC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(customers)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Customer>> {
    let customer =
        sqlx::query_as::<_, Customer>(&format!("SELECT {COLUMNS} FROM customers WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(customer)
}

/// Customer ids whose company or circuit id substring-matches the search
/// term. Feeds the fault query builder's customer sub-search.
pub async fn find_ids_matching(pool: &SqlitePool, search: &str) -> RepoResult<Vec<i64>> {
    let pattern = format!("%{search}%");
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM customers WHERE company LIKE ? OR circuit_id LIKE ?",
    )
    .bind(&pattern)
    .bind(&pattern)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

pub async fn create(pool: &SqlitePool, data: CustomerCreate) -> RepoResult<Customer> {
    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO customers (company, circuit_id, type, location, ip_address, pop_site, email, switch_info, owner, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.company)
    .bind(&data.circuit_id)
    .bind(&data.customer_type)
    .bind(&data.location)
    .bind(&data.ip_address)
    .bind(&data.pop_site)
    .bind(&data.email)
    .bind(&data.switch_info)
    .bind(&data.owner)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create customer".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: CustomerUpdate) -> RepoResult<Customer> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE customers SET company = COALESCE(?, company), circuit_id = COALESCE(?, circuit_id), type = COALESCE(?, type), location = COALESCE(?, location), ip_address = COALESCE(?, ip_address), pop_site = COALESCE(?, pop_site), email = COALESCE(?, email), switch_info = COALESCE(?, switch_info), owner = COALESCE(?, owner), updated_at = ? WHERE id = ?",
    )
    .bind(&data.company)
    .bind(&data.circuit_id)
    .bind(&data.customer_type)
    .bind(&data.location)
    .bind(&data.ip_address)
    .bind(&data.pop_site)
    .bind(&data.email)
    .bind(&data.switch_info)
    .bind(&data.owner)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Customer {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Customer {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM customers WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
