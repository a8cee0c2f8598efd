//! Mapping between database models and domain types.

use chrono::Utc;
use till_core::access::Shop;
use till_core::export::{CashRegisterExport, ExportFormat};
use till_core::ledger::{CashMovement, MovementType, OriginKind, OriginRef};
use till_core::register::{CashRegister, ClosingType, RegisterStatus};
use till_shared::types::{
    CashMovementId, CashRegisterId, ExportId, ProjectId, ShopId, UserId,
};

use crate::entities::{
    cash_movements, cash_register_exports, cash_registers,
    sea_orm_active_enums::{
        CashMovementType as DbMovementType, CashRegisterStatus as DbRegisterStatus,
        ClosingType as DbClosingType, ExportFormat as DbExportFormat,
        MovementOriginKind as DbOriginKind,
    },
    shops,
};

pub(crate) fn shop_to_domain(m: shops::Model) -> Shop {
    Shop {
        id: ShopId::from_uuid(m.id),
        project_id: ProjectId::from_uuid(m.project_id),
        owner_id: UserId::from_uuid(m.owner_id),
        name: m.name,
        currency: m.currency,
    }
}

pub(crate) fn register_to_domain(m: cash_registers::Model) -> CashRegister {
    CashRegister {
        id: CashRegisterId::from_uuid(m.id),
        shop_id: ShopId::from_uuid(m.shop_id),
        employee_id: UserId::from_uuid(m.employee_id),
        status: from_db_status(&m.status),
        opening_amount: m.opening_amount,
        closing_amount: m.closing_amount,
        actual_amount: m.actual_amount,
        difference: m.difference,
        opened_at: m.opened_at.with_timezone(&Utc),
        opened_by: UserId::from_uuid(m.opened_by),
        opened_by_name: m.opened_by_name,
        closed_at: m.closed_at.map(|at| at.with_timezone(&Utc)),
        closed_by: m.closed_by.map(UserId::from_uuid),
        closing_notes: m.closing_notes,
        closing_type: m.closing_type.as_ref().map(from_db_closing_type),
    }
}

pub(crate) fn movement_to_domain(m: cash_movements::Model) -> CashMovement {
    let origin = match (m.origin_kind.as_ref(), m.origin_id) {
        (Some(kind), Some(id)) => Some(OriginRef {
            kind: from_db_origin_kind(kind),
            id,
        }),
        _ => None,
    };

    CashMovement {
        id: CashMovementId::from_uuid(m.id),
        cash_register_id: CashRegisterId::from_uuid(m.cash_register_id),
        shop_id: ShopId::from_uuid(m.shop_id),
        movement_type: from_db_movement_type(&m.movement_type),
        amount: m.amount,
        description: m.description,
        user_id: UserId::from_uuid(m.user_id),
        origin,
        created_at: m.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn export_to_domain(m: cash_register_exports::Model) -> CashRegisterExport {
    CashRegisterExport {
        id: ExportId::from_uuid(m.id),
        cash_register_id: CashRegisterId::from_uuid(m.cash_register_id),
        format: from_db_export_format(&m.format),
        url: m.url,
        content_type: m.content_type,
        created_at: m.created_at.with_timezone(&Utc),
        expires_at: m.expires_at.with_timezone(&Utc),
    }
}

pub(crate) fn from_db_status(s: &DbRegisterStatus) -> RegisterStatus {
    match s {
        DbRegisterStatus::Open => RegisterStatus::Open,
        DbRegisterStatus::Closed => RegisterStatus::Closed,
    }
}

pub(crate) fn to_db_closing_type(t: ClosingType) -> DbClosingType {
    match t {
        ClosingType::Manual => DbClosingType::Manual,
        ClosingType::Automatic => DbClosingType::Automatic,
    }
}

fn from_db_closing_type(t: &DbClosingType) -> ClosingType {
    match t {
        DbClosingType::Manual => ClosingType::Manual,
        DbClosingType::Automatic => ClosingType::Automatic,
    }
}

pub(crate) fn to_db_movement_type(t: MovementType) -> DbMovementType {
    match t {
        MovementType::Opening => DbMovementType::Opening,
        MovementType::Sale => DbMovementType::Sale,
        MovementType::Income => DbMovementType::Income,
        MovementType::Deposit => DbMovementType::Deposit,
        MovementType::Purchase => DbMovementType::Purchase,
        MovementType::Return => DbMovementType::Return,
        MovementType::Expense => DbMovementType::Expense,
        MovementType::Withdrawal => DbMovementType::Withdrawal,
        MovementType::Adjustment => DbMovementType::Adjustment,
    }
}

fn from_db_movement_type(t: &DbMovementType) -> MovementType {
    match t {
        DbMovementType::Opening => MovementType::Opening,
        DbMovementType::Sale => MovementType::Sale,
        DbMovementType::Income => MovementType::Income,
        DbMovementType::Deposit => MovementType::Deposit,
        DbMovementType::Purchase => MovementType::Purchase,
        DbMovementType::Return => MovementType::Return,
        DbMovementType::Expense => MovementType::Expense,
        DbMovementType::Withdrawal => MovementType::Withdrawal,
        DbMovementType::Adjustment => MovementType::Adjustment,
    }
}

pub(crate) fn to_db_origin_kind(k: OriginKind) -> DbOriginKind {
    match k {
        OriginKind::Sale => DbOriginKind::Sale,
        OriginKind::Purchase => DbOriginKind::Purchase,
        OriginKind::Return => DbOriginKind::Return,
        OriginKind::Income => DbOriginKind::Income,
        OriginKind::Expense => DbOriginKind::Expense,
    }
}

fn from_db_origin_kind(k: &DbOriginKind) -> OriginKind {
    match k {
        DbOriginKind::Sale => OriginKind::Sale,
        DbOriginKind::Purchase => OriginKind::Purchase,
        DbOriginKind::Return => OriginKind::Return,
        DbOriginKind::Income => OriginKind::Income,
        DbOriginKind::Expense => OriginKind::Expense,
    }
}

pub(crate) fn to_db_export_format(f: ExportFormat) -> DbExportFormat {
    match f {
        ExportFormat::Pdf => DbExportFormat::Pdf,
        ExportFormat::Excel => DbExportFormat::Excel,
    }
}

fn from_db_export_format(f: &DbExportFormat) -> ExportFormat {
    match f {
        DbExportFormat::Pdf => ExportFormat::Pdf,
        DbExportFormat::Excel => ExportFormat::Excel,
    }
}
