//! Fault note model (append-only).

use serde::{Deserialize, Serialize};

/// Free-text note attached to a fault by an operator.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FaultNote {
    pub id: i64,
    pub fault_id: i64,
    pub content: String,
    /// Authoring user id.
    pub created_by: i64,
    /// Department the author belonged to when the note was written.
    pub department_id: Option<i64>,
    pub created_at: i64,
}

/// Create payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultNoteCreate {
    pub content: String,
}
