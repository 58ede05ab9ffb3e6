//! Shared test fixtures: in-memory database and seed data.
#![allow(dead_code)]

use shared::models::{CustomerCreate, DepartmentCreate, FaultCreate, FaultStatus, Role};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use noc_server::db::repository::{customer, department, fault, user};

pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");

    sqlx::query("PRAGMA foreign_keys = ON;")
        .execute(&pool)
        .await
        .expect("enable foreign keys");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("apply migrations");

    pool
}

pub async fn seed_department(pool: &SqlitePool, name: &str) -> i64 {
    department::create(
        pool,
        DepartmentCreate {
            name: name.to_string(),
        },
    )
    .await
    .expect("seed department")
    .id
}

pub async fn seed_user(
    pool: &SqlitePool,
    username: &str,
    password: &str,
    role: Role,
    department_id: Option<i64>,
) -> i64 {
    let hash = noc_server::auth::hash_password(password).expect("hash password");
    user::create(
        pool,
        username,
        &format!("{username}@noc.test"),
        &hash,
        role,
        department_id,
    )
    .await
    .expect("seed user")
    .id
}

pub async fn seed_customer(pool: &SqlitePool, company: &str) -> i64 {
    customer::create(
        pool,
        CustomerCreate {
            company: company.to_string(),
            circuit_id: format!("CIR-{company}"),
            customer_type: None,
            location: None,
            ip_address: "10.0.0.1".to_string(),
            pop_site: "POP-1".to_string(),
            email: None,
            switch_info: None,
            owner: None,
        },
    )
    .await
    .expect("seed customer")
    .id
}

pub async fn seed_fault(
    pool: &SqlitePool,
    description: &str,
    customer_id: i64,
    department_id: i64,
) -> i64 {
    let data = FaultCreate {
        description: description.to_string(),
        status: FaultStatus::Open,
        customer_id,
        assigned_to_id: department_id,
        ticket_number: None,
        fault_type: None,
        location: None,
        owner: None,
        pending_hours: None,
    };
    fault::create(pool, &data, shared::models::Severity::Low)
        .await
        .expect("seed fault")
        .id
}

/// Backdate a fault's creation time so elapsed-hours behavior can be
/// observed without sleeping.
pub async fn backdate_fault(pool: &SqlitePool, fault_id: i64, created_at: i64) {
    sqlx::query("UPDATE faults SET created_at = ? WHERE id = ?")
        .bind(created_at)
        .bind(fault_id)
        .execute(pool)
        .await
        .expect("backdate fault");
}
