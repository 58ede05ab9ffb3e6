//! Entity models and request payloads.

pub mod customer;
pub mod department;
pub mod fault;
pub mod fault_history;
pub mod fault_note;
pub mod user;

pub use customer::{Customer, CustomerCreate, CustomerUpdate};
pub use department::{Department, DepartmentCreate};
pub use fault::{
    Fault, FaultCreate, FaultGeneralCreate, FaultStatus, FaultTransfer, FaultUpdate,
    FaultWithRefs, Severity,
};
pub use fault_history::{FaultHistory, FaultHistoryEntry, HistoryKind};
pub use fault_note::{FaultNote, FaultNoteCreate};
pub use user::{Role, User, UserCreate, UserPublic, UserUpdate};
