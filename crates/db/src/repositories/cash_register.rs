//! Cash register repository.
//!
//! Opening and closing run in transactions. The partial unique index on
//! `(shop_id) WHERE status = 'OPEN'` settles concurrent opens; closing locks
//! the register row so concurrent appends either land before the totals are
//! read or see the register closed.

use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use till_core::ledger::MovementType;
use till_core::register::{
    CashRegister, CloseCommand, HistoryFilter, NewRegister, Reconciliation, RegisterError,
    RegisterRepository as RegisterRepoTrait,
};
use till_shared::types::{CashMovementId, CashRegisterId, ShopId};

use super::convert::{
    movement_to_domain, register_to_domain, to_db_closing_type, to_db_movement_type,
};
use crate::entities::{
    cash_movements, cash_registers, sea_orm_active_enums::CashRegisterStatus as DbStatus,
};

/// Cash register repository implementation.
#[derive(Debug, Clone)]
pub struct CashRegisterRepository {
    db: DatabaseConnection,
}

impl CashRegisterRepository {
    /// Creates a new cash register repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn repo_err(e: DbErr) -> RegisterError {
    RegisterError::repository(e.to_string())
}

/// Maps a unique violation on the open-register index to a conflict.
fn open_err(e: DbErr, shop_id: ShopId) -> RegisterError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!(shop_id = %shop_id, "concurrent open rejected by unique index");
            RegisterError::AlreadyOpen(shop_id)
        }
        _ => repo_err(e),
    }
}

impl RegisterRepoTrait for CashRegisterRepository {
    async fn find_by_id(&self, id: CashRegisterId) -> Result<Option<CashRegister>, RegisterError> {
        let model = cash_registers::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(model.map(register_to_domain))
    }

    async fn find_open_for_shop(
        &self,
        shop_id: ShopId,
    ) -> Result<Option<CashRegister>, RegisterError> {
        let model = cash_registers::Entity::find()
            .filter(cash_registers::Column::ShopId.eq(shop_id.into_inner()))
            .filter(cash_registers::Column::Status.eq(DbStatus::Open))
            .one(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(model.map(register_to_domain))
    }

    async fn open(&self, new: NewRegister) -> Result<CashRegister, RegisterError> {
        let txn = self.db.begin().await.map_err(repo_err)?;
        let opened_at: DateTimeWithTimeZone = new.opened_at.into();
        let register_id = CashRegisterId::new().into_inner();

        let register = cash_registers::ActiveModel {
            id: Set(register_id),
            shop_id: Set(new.shop_id.into_inner()),
            employee_id: Set(new.employee_id.into_inner()),
            status: Set(DbStatus::Open),
            opening_amount: Set(new.opening_amount),
            closing_amount: Set(None),
            actual_amount: Set(None),
            difference: Set(None),
            opened_at: Set(opened_at),
            opened_by: Set(new.opened_by.into_inner()),
            opened_by_name: Set(new.opened_by_name),
            closed_at: Set(None),
            closed_by: Set(None),
            closing_notes: Set(None),
            closing_type: Set(None),
            created_at: Set(opened_at),
            updated_at: Set(opened_at),
        }
        .insert(&txn)
        .await
        .map_err(|e| open_err(e, new.shop_id))?;

        cash_movements::ActiveModel {
            id: Set(CashMovementId::new().into_inner()),
            cash_register_id: Set(register_id),
            shop_id: Set(new.shop_id.into_inner()),
            movement_type: Set(to_db_movement_type(MovementType::Opening)),
            amount: Set(new.opening_amount),
            description: Set("Opening".to_string()),
            user_id: Set(new.opened_by.into_inner()),
            origin_kind: Set(None),
            origin_id: Set(None),
            created_at: Set(opened_at),
        }
        .insert(&txn)
        .await
        .map_err(repo_err)?;

        txn.commit()
            .await
            .map_err(|e| open_err(e, new.shop_id))?;

        Ok(register_to_domain(register))
    }

    async fn close(
        &self,
        id: CashRegisterId,
        command: CloseCommand,
    ) -> Result<CashRegister, RegisterError> {
        let txn = self.db.begin().await.map_err(repo_err)?;

        let register = cash_registers::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(repo_err)?
            .ok_or(RegisterError::NotFound(id))?;

        if register.status != DbStatus::Open {
            return Err(RegisterError::NotOpen(id));
        }

        let movements: Vec<_> = cash_movements::Entity::find()
            .filter(cash_movements::Column::CashRegisterId.eq(id.into_inner()))
            .all(&txn)
            .await
            .map_err(repo_err)?
            .into_iter()
            .map(movement_to_domain)
            .collect();

        let rec = Reconciliation::compute(
            register.opening_amount,
            &movements,
            command.actual_amount,
        );
        let closed_at: DateTimeWithTimeZone = command.closed_at.into();

        let mut active: cash_registers::ActiveModel = register.into();
        active.status = Set(DbStatus::Closed);
        active.closing_amount = Set(Some(rec.closing_amount));
        active.actual_amount = Set(Some(rec.actual_amount));
        active.difference = Set(Some(rec.difference));
        active.closed_at = Set(Some(closed_at));
        active.closed_by = Set(Some(command.closed_by.into_inner()));
        active.closing_notes = Set(command.closing_notes);
        active.closing_type = Set(Some(to_db_closing_type(command.closing_type)));
        active.updated_at = Set(closed_at);

        let updated = active.update(&txn).await.map_err(repo_err)?;
        txn.commit().await.map_err(repo_err)?;

        tracing::debug!(
            register_id = %id,
            difference = %rec.difference,
            "cash register closed"
        );

        Ok(register_to_domain(updated))
    }

    async fn history(
        &self,
        shop_id: ShopId,
        filter: HistoryFilter,
        limit: u64,
    ) -> Result<Vec<CashRegister>, RegisterError> {
        let mut query = cash_registers::Entity::find()
            .filter(cash_registers::Column::ShopId.eq(shop_id.into_inner()));

        if let Some(from) = filter.opened_from {
            query = query.filter(cash_registers::Column::OpenedAt.gte(from));
        }
        if let Some(to) = filter.opened_to {
            query = query.filter(cash_registers::Column::OpenedAt.lte(to));
        }

        let models = query
            .order_by_desc(cash_registers::Column::OpenedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(models.into_iter().map(register_to_domain).collect())
    }

    async fn closed_between(
        &self,
        shop_ids: &[ShopId],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CashRegister>, RegisterError> {
        if shop_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = cash_registers::Entity::find()
            .filter(cash_registers::Column::ShopId.is_in(shop_ids.iter().map(|id| id.into_inner())))
            .filter(cash_registers::Column::Status.eq(DbStatus::Closed))
            .filter(cash_registers::Column::ClosedAt.gte(start))
            .filter(cash_registers::Column::ClosedAt.lte(end))
            .order_by_desc(cash_registers::Column::ClosedAt)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(models.into_iter().map(register_to_domain).collect())
    }
}
