//! Fault Lifecycle & Reporting Engine
//!
//! The core of the backend: severity classification, time-window
//! resolution, read-time enrichment, the transactional lifecycle state
//! machine, and the reporting aggregator.

pub mod enrich;
pub mod lifecycle;
pub mod report;
pub mod severity;
pub mod window;

pub use enrich::{enrich, enrich_all, live_severity, pending_hours};
pub use lifecycle::{TransitionPolicy, transfer_fault, update_fault};
pub use severity::classify_severity;
pub use window::resolve_window;
