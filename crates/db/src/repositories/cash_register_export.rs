//! Export metadata repository.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use till_core::export::{
    CashRegisterExport, ExportError, ExportFormat, ExportRepository as ExportRepoTrait, NewExport,
};
use till_shared::types::{CashRegisterId, ExportId};

use super::convert::{export_to_domain, to_db_export_format};
use crate::entities::cash_register_exports;

/// Export metadata repository implementation.
#[derive(Debug, Clone)]
pub struct CashRegisterExportRepository {
    db: DatabaseConnection,
}

impl CashRegisterExportRepository {
    /// Creates a new export repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn repo_err(e: DbErr) -> ExportError {
    ExportError::repository(e.to_string())
}

impl ExportRepoTrait for CashRegisterExportRepository {
    async fn find_latest_valid(
        &self,
        register_id: CashRegisterId,
        format: ExportFormat,
        now: DateTime<Utc>,
    ) -> Result<Option<CashRegisterExport>, ExportError> {
        let model = cash_register_exports::Entity::find()
            .filter(cash_register_exports::Column::CashRegisterId.eq(register_id.into_inner()))
            .filter(cash_register_exports::Column::Format.eq(to_db_export_format(format)))
            .filter(cash_register_exports::Column::ExpiresAt.gt(now))
            .order_by_desc(cash_register_exports::Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(model.map(export_to_domain))
    }

    async fn insert(&self, export: NewExport) -> Result<CashRegisterExport, ExportError> {
        let model = cash_register_exports::ActiveModel {
            id: Set(ExportId::new().into_inner()),
            cash_register_id: Set(export.cash_register_id.into_inner()),
            format: Set(to_db_export_format(export.format)),
            url: Set(export.url),
            content_type: Set(export.content_type),
            created_at: Set(export.created_at.into()),
            expires_at: Set(export.expires_at.into()),
        }
        .insert(&self.db)
        .await
        .map_err(repo_err)?;
        Ok(export_to_domain(model))
    }

    async fn list_for_pair(
        &self,
        register_id: CashRegisterId,
        format: ExportFormat,
    ) -> Result<Vec<CashRegisterExport>, ExportError> {
        let models = cash_register_exports::Entity::find()
            .filter(cash_register_exports::Column::CashRegisterId.eq(register_id.into_inner()))
            .filter(cash_register_exports::Column::Format.eq(to_db_export_format(format)))
            .order_by_desc(cash_register_exports::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(models.into_iter().map(export_to_domain).collect())
    }

    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<CashRegisterExport>, ExportError> {
        let models = cash_register_exports::Entity::find()
            .filter(cash_register_exports::Column::ExpiresAt.lt(now))
            .order_by_asc(cash_register_exports::Column::ExpiresAt)
            .all(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(models.into_iter().map(export_to_domain).collect())
    }

    async fn delete(&self, id: ExportId) -> Result<bool, ExportError> {
        let result = cash_register_exports::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(result.rows_affected > 0)
    }
}
