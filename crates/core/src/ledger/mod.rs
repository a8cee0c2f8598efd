//! Movement ledger.
//!
//! Append-only signed monetary events tied to a register:
//! - movement types and their sign
//! - per-type totals and the expected drawer amount
//! - running balances for statements

pub mod balance;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use balance::{RegisterTotals, expected_amount, running_balances, sort_chronologically};
pub use error::LedgerError;
pub use service::{LedgerService, MovementRepository};
pub use types::{
    AppendMovementInput, CashMovement, MovementType, NewMovement, OriginKind, OriginRef,
};
