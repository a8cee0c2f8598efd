//! Repository implementations for data access.
//!
//! Each repository implements a persistence trait from `till-core`,
//! hiding the `SeaORM` details from the services.

mod convert;

pub mod cash_movement;
pub mod cash_register;
pub mod cash_register_export;
pub mod shop;

pub use cash_movement::CashMovementRepository;
pub use cash_register::CashRegisterRepository;
pub use cash_register_export::CashRegisterExportRepository;
pub use shop::ShopRepository;
