//! Entity re-exports.

pub use super::cash_movements::Entity as CashMovements;
pub use super::cash_register_exports::Entity as CashRegisterExports;
pub use super::cash_registers::Entity as CashRegisters;
pub use super::shop_employees::Entity as ShopEmployees;
pub use super::shops::Entity as Shops;
