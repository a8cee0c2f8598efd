//! Shop repository: shop lookup and employee assignments.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QuerySelect, Set,
};
use till_core::access::{AccessError, AuthenticatedUser, Shop, ShopDirectory};
use till_shared::types::{ProjectId, ShopId, UserId};

use super::convert::shop_to_domain;
use crate::entities::{shop_employees, shops};

/// Shop repository implementation.
#[derive(Debug, Clone)]
pub struct ShopRepository {
    db: DatabaseConnection,
}

impl ShopRepository {
    /// Creates a new shop repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a shop.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        project_id: ProjectId,
        owner_id: UserId,
        name: &str,
        currency: &str,
    ) -> Result<Shop, DbErr> {
        let now = Utc::now().into();
        let model = shops::ActiveModel {
            id: Set(ShopId::new().into_inner()),
            project_id: Set(project_id.into_inner()),
            owner_id: Set(owner_id.into_inner()),
            name: Set(name.to_string()),
            currency: Set(currency.trim().to_uppercase()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        Ok(shop_to_domain(model))
    }

    /// Assigns an employee to a shop. Assigning twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn assign_employee(&self, shop_id: ShopId, user_id: UserId) -> Result<(), DbErr> {
        let existing = shop_employees::Entity::find()
            .filter(shop_employees::Column::ShopId.eq(shop_id.into_inner()))
            .filter(shop_employees::Column::UserId.eq(user_id.into_inner()))
            .count(&self.db)
            .await?;
        if existing > 0 {
            return Ok(());
        }

        shop_employees::ActiveModel {
            shop_id: Set(shop_id.into_inner()),
            user_id: Set(user_id.into_inner()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?;
        Ok(())
    }
}

fn repo_err(e: DbErr) -> AccessError {
    AccessError::repository(e.to_string())
}

impl ShopDirectory for ShopRepository {
    async fn find_shop(&self, shop_id: ShopId) -> Result<Option<Shop>, AccessError> {
        let model = shops::Entity::find_by_id(shop_id.into_inner())
            .one(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(model.map(shop_to_domain))
    }

    async fn is_assigned(
        &self,
        user: &AuthenticatedUser,
        shop_id: ShopId,
    ) -> Result<bool, AccessError> {
        let count = shop_employees::Entity::find()
            .filter(shop_employees::Column::ShopId.eq(shop_id.into_inner()))
            .filter(shop_employees::Column::UserId.eq(user.id.into_inner()))
            .count(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(count > 0)
    }

    async fn owned_shop_ids(&self, user: &AuthenticatedUser) -> Result<Vec<ShopId>, AccessError> {
        let ids: Vec<uuid::Uuid> = shops::Entity::find()
            .select_only()
            .column(shops::Column::Id)
            .filter(shops::Column::OwnerId.eq(user.id.into_inner()))
            .filter(shops::Column::ProjectId.eq(user.project_id.into_inner()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(ids.into_iter().map(ShopId::from_uuid).collect())
    }

    async fn assigned_shop_ids(
        &self,
        user: &AuthenticatedUser,
    ) -> Result<Vec<ShopId>, AccessError> {
        let ids: Vec<uuid::Uuid> = shop_employees::Entity::find()
            .select_only()
            .column(shop_employees::Column::ShopId)
            .inner_join(shops::Entity)
            .filter(shop_employees::Column::UserId.eq(user.id.into_inner()))
            .filter(shops::Column::ProjectId.eq(user.project_id.into_inner()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(ids.into_iter().map(ShopId::from_uuid).collect())
    }
}
