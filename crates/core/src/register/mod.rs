//! Cash register state machine.
//!
//! A register moves `OPEN -> CLOSED` exactly once. At most one register per
//! shop is open at any time. Closing reconciles the counted cash against the
//! ledger's expected amount.

mod error;
mod reconciliation;
mod service;
mod types;

pub use error::RegisterError;
pub use reconciliation::Reconciliation;
pub use service::{
    ClosedRegister, HISTORY_LIMIT, RECENT_MOVEMENTS, RegisterRepository, RegisterService,
};
pub use types::{
    CashRegister, CloseCommand, CloseRegisterInput, ClosingType, DifferenceStatus, HistoryFilter,
    MovementLine, NewRegister, OpenRegisterInput, RegisterDetail, RegisterSnapshot,
    RegisterStatus,
};
