//! NOC fault-ticket tracking backend
//!
//! REST API over SQLite for customers, faults, departments, users and
//! notes, with the fault lifecycle and reporting engine at its core.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod faults;
pub mod utils;

pub use crate::core::{Config, Server, ServerState};
pub use crate::utils::{AppError, AppResult};
