//! Customer model.

use serde::{Deserialize, Serialize};

/// Customer circuit record. One customer has many faults.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub id: i64,
    pub company: String,
    pub circuit_id: Option<String>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub customer_type: Option<String>,
    pub location: Option<String>,
    pub ip_address: Option<String>,
    pub pop_site: Option<String>,
    pub email: Option<String>,
    pub switch_info: Option<String>,
    pub owner: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create payload (admin only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCreate {
    pub company: String,
    pub circuit_id: String,
    #[serde(rename = "type")]
    pub customer_type: Option<String>,
    pub location: Option<String>,
    pub ip_address: String,
    pub pop_site: String,
    pub email: Option<String>,
    pub switch_info: Option<String>,
    pub owner: Option<String>,
}

/// Partial update payload (admin only).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub company: Option<String>,
    pub circuit_id: Option<String>,
    #[serde(rename = "type")]
    pub customer_type: Option<String>,
    pub location: Option<String>,
    pub ip_address: Option<String>,
    pub pop_site: Option<String>,
    pub email: Option<String>,
    pub switch_info: Option<String>,
    pub owner: Option<String>,
}
