//! Core business logic for Till.
//!
//! This crate contains the cash register domain with ZERO web or database dependencies.
//! Persistence is reached through repository traits implemented by `till-db`.
//!
//! # Modules
//!
//! - `access` - Shop-level authorization for owners and employees
//! - `ledger` - Signed cash movements, totals and running balances
//! - `register` - Open/close state machine and reconciliation
//! - `reports` - Report windows and closed-register listings
//! - `statement` - PDF and spreadsheet statements
//! - `export` - Time-boxed cache of rendered statements
//! - `notify` - Post-close statement distribution by email
//! - `storage` - Blob storage over OpenDAL

pub mod access;
pub mod export;
pub mod ledger;
pub mod notify;
pub mod register;
pub mod reports;
pub mod statement;
pub mod storage;

#[cfg(test)]
mod testing;
