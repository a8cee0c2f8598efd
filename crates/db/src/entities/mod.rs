//! `SeaORM` entities.

pub mod prelude;

pub mod cash_movements;
pub mod cash_register_exports;
pub mod cash_registers;
pub mod sea_orm_active_enums;
pub mod shop_employees;
pub mod shops;
