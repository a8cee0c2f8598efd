//! Cash movement repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use till_core::ledger::{
    CashMovement, LedgerError, MovementRepository as MovementRepoTrait, NewMovement,
};
use till_shared::types::{CashMovementId, CashRegisterId};

use super::convert::{movement_to_domain, to_db_movement_type, to_db_origin_kind};
use crate::entities::{
    cash_movements, cash_registers, sea_orm_active_enums::CashRegisterStatus as DbStatus,
};

/// Cash movement repository implementation.
#[derive(Debug, Clone)]
pub struct CashMovementRepository {
    db: DatabaseConnection,
}

impl CashMovementRepository {
    /// Creates a new cash movement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn repo_err(e: DbErr) -> LedgerError {
    LedgerError::repository(e.to_string())
}

impl MovementRepoTrait for CashMovementRepository {
    async fn append(&self, new: NewMovement) -> Result<CashMovement, LedgerError> {
        let txn = self.db.begin().await.map_err(repo_err)?;

        // Shared lock: appends run in parallel, a close waits for them.
        let register = cash_registers::Entity::find_by_id(new.cash_register_id.into_inner())
            .lock_shared()
            .one(&txn)
            .await
            .map_err(repo_err)?
            .ok_or(LedgerError::RegisterNotFound(new.cash_register_id))?;

        if register.status != DbStatus::Open {
            return Err(LedgerError::RegisterNotOpen(new.cash_register_id));
        }

        let model = cash_movements::ActiveModel {
            id: Set(CashMovementId::new().into_inner()),
            cash_register_id: Set(new.cash_register_id.into_inner()),
            shop_id: Set(new.shop_id.into_inner()),
            movement_type: Set(to_db_movement_type(new.movement_type)),
            amount: Set(new.amount),
            description: Set(new.description),
            user_id: Set(new.user_id.into_inner()),
            origin_kind: Set(new.origin.map(|o| to_db_origin_kind(o.kind))),
            origin_id: Set(new.origin.map(|o| o.id)),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await
        .map_err(repo_err)?;

        txn.commit().await.map_err(repo_err)?;
        Ok(movement_to_domain(model))
    }

    async fn list_for_register(
        &self,
        register_id: CashRegisterId,
    ) -> Result<Vec<CashMovement>, LedgerError> {
        let models = cash_movements::Entity::find()
            .filter(cash_movements::Column::CashRegisterId.eq(register_id.into_inner()))
            .order_by_asc(cash_movements::Column::CreatedAt)
            .order_by_asc(cash_movements::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(models.into_iter().map(movement_to_domain).collect())
    }
}
