//! `SeaORM` Entity for cash_registers table.

use super::sea_orm_active_enums::{CashRegisterStatus, ClosingType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cash_registers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shop_id: Uuid,
    pub employee_id: Uuid,
    pub status: CashRegisterStatus,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub opening_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub closing_amount: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub actual_amount: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub difference: Option<Decimal>,
    pub opened_at: DateTimeWithTimeZone,
    pub opened_by: Uuid,
    pub opened_by_name: Option<String>,
    pub closed_at: Option<DateTimeWithTimeZone>,
    pub closed_by: Option<Uuid>,
    #[sea_orm(column_type = "Text", nullable)]
    pub closing_notes: Option<String>,
    pub closing_type: Option<ClosingType>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shops::Entity",
        from = "Column::ShopId",
        to = "super::shops::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Shops,
    #[sea_orm(has_many = "super::cash_movements::Entity")]
    CashMovements,
    #[sea_orm(has_many = "super::cash_register_exports::Entity")]
    CashRegisterExports,
}

impl Related<super::shops::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shops.def()
    }
}

impl Related<super::cash_movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashMovements.def()
    }
}

impl Related<super::cash_register_exports::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashRegisterExports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
