//! Access guard implementation.

use std::future::Future;
use std::sync::Arc;

use till_shared::types::ShopId;

use super::error::AccessError;
use super::types::{AuthenticatedUser, Shop, ShopAccessContext, UserRole};

/// Lookup of shops and employee assignments.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait ShopDirectory: Send + Sync {
    /// Find a shop by ID.
    fn find_shop(
        &self,
        shop_id: ShopId,
    ) -> impl Future<Output = Result<Option<Shop>, AccessError>> + Send;

    /// Whether an assignment row links the user to the shop.
    fn is_assigned(
        &self,
        user: &AuthenticatedUser,
        shop_id: ShopId,
    ) -> impl Future<Output = Result<bool, AccessError>> + Send;

    /// Shops owned by the user within their project.
    fn owned_shop_ids(
        &self,
        user: &AuthenticatedUser,
    ) -> impl Future<Output = Result<Vec<ShopId>, AccessError>> + Send;

    /// Shops the user is assigned to.
    fn assigned_shop_ids(
        &self,
        user: &AuthenticatedUser,
    ) -> impl Future<Output = Result<Vec<ShopId>, AccessError>> + Send;
}

/// Pure authorization predicate.
///
/// `assigned` is only consulted for employees.
pub fn evaluate(
    shop: &Shop,
    user: &AuthenticatedUser,
    assigned: bool,
) -> Result<ShopAccessContext, AccessError> {
    if shop.project_id != user.project_id {
        return Err(AccessError::forbidden(
            "shop belongs to a different project",
        ));
    }

    let granted = match user.role {
        UserRole::Owner => shop.owner_id == user.id,
        UserRole::Employee => assigned,
        UserRole::Other => false,
    };

    if !granted {
        return Err(AccessError::forbidden(match user.role {
            UserRole::Owner => "you do not own this shop",
            UserRole::Employee => "you are not assigned to this shop",
            UserRole::Other => "your role cannot operate cash registers",
        }));
    }

    Ok(ShopAccessContext {
        user_id: user.id,
        role: user.role,
        shop_id: shop.id,
    })
}

/// Resolves whether a user may act on a shop.
pub struct AccessGuard<D: ShopDirectory> {
    directory: Arc<D>,
}

impl<D: ShopDirectory> Clone for AccessGuard<D> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
        }
    }
}

impl<D: ShopDirectory> AccessGuard<D> {
    /// Create a new guard over a shop directory.
    #[must_use]
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    /// Checks access to an already loaded shop.
    pub async fn ensure_access(
        &self,
        shop: &Shop,
        user: &AuthenticatedUser,
    ) -> Result<ShopAccessContext, AccessError> {
        let assigned = match user.role {
            UserRole::Employee if shop.project_id == user.project_id => {
                self.directory.is_assigned(user, shop.id).await?
            }
            _ => false,
        };
        evaluate(shop, user, assigned)
    }

    /// Loads a shop and checks access to it.
    ///
    /// # Errors
    ///
    /// Returns `ShopNotFound` when the shop is missing, `Forbidden` when access is denied.
    pub async fn ensure_shop_access(
        &self,
        shop_id: ShopId,
        user: &AuthenticatedUser,
    ) -> Result<(Shop, ShopAccessContext), AccessError> {
        let shop = self
            .directory
            .find_shop(shop_id)
            .await?
            .ok_or(AccessError::ShopNotFound(shop_id))?;
        let context = self.ensure_access(&shop, user).await?;
        Ok((shop, context))
    }

    /// Shops visible to the user: owned shops for owners, assigned shops for employees.
    pub async fn accessible_shop_ids(
        &self,
        user: &AuthenticatedUser,
    ) -> Result<Vec<ShopId>, AccessError> {
        match user.role {
            UserRole::Owner => self.directory.owned_shop_ids(user).await,
            UserRole::Employee => self.directory.assigned_shop_ids(user).await,
            UserRole::Other => Ok(Vec::new()),
        }
    }

    /// Loads a shop without authorization.
    pub async fn find_shop(&self, shop_id: ShopId) -> Result<Option<Shop>, AccessError> {
        self.directory.find_shop(shop_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryStore, employee, owner_of, shop_in};
    use till_shared::types::{ProjectId, UserId};

    #[test]
    fn test_owner_of_shop_is_granted() {
        let project = ProjectId::new();
        let owner = UserId::new();
        let shop = shop_in(project, owner);
        let user = owner_of(&shop);

        let ctx = evaluate(&shop, &user, false).unwrap();
        assert_eq!(ctx.role, UserRole::Owner);
        assert_eq!(ctx.shop_id, shop.id);
    }

    #[test]
    fn test_owner_of_other_shop_is_forbidden() {
        let project = ProjectId::new();
        let shop = shop_in(project, UserId::new());
        let user = AuthenticatedUser {
            id: UserId::new(),
            project_id: project,
            role: UserRole::Owner,
            name: None,
        };
        assert!(matches!(
            evaluate(&shop, &user, true),
            Err(AccessError::Forbidden(_))
        ));
    }

    #[test]
    fn test_cross_project_is_forbidden_even_for_owner_id_match() {
        let owner = UserId::new();
        let shop = shop_in(ProjectId::new(), owner);
        let user = AuthenticatedUser {
            id: owner,
            project_id: ProjectId::new(),
            role: UserRole::Owner,
            name: None,
        };
        assert!(evaluate(&shop, &user, false).is_err());
    }

    #[test]
    fn test_employee_requires_assignment() {
        let shop = shop_in(ProjectId::new(), UserId::new());
        let user = employee(shop.project_id);
        assert!(evaluate(&shop, &user, false).is_err());
        assert!(evaluate(&shop, &user, true).is_ok());
    }

    #[test]
    fn test_other_role_fails_closed() {
        let shop = shop_in(ProjectId::new(), UserId::new());
        let user = AuthenticatedUser {
            role: UserRole::Other,
            ..owner_of(&shop)
        };
        assert!(evaluate(&shop, &user, true).is_err());
    }

    #[test]
    fn test_role_from_claim() {
        assert_eq!(UserRole::from_claim("OWNER"), UserRole::Owner);
        assert_eq!(UserRole::from_claim("employee"), UserRole::Employee);
        assert_eq!(UserRole::from_claim("admin"), UserRole::Other);
    }

    #[tokio::test]
    async fn test_guard_loads_assignment_for_employee() {
        let store = Arc::new(InMemoryStore::default());
        let shop = store.add_shop(ProjectId::new(), UserId::new());
        let user = employee(shop.project_id);
        let guard = AccessGuard::new(Arc::clone(&store));

        assert!(matches!(
            guard.ensure_shop_access(shop.id, &user).await,
            Err(AccessError::Forbidden(_))
        ));

        store.assign(user.id, shop.id);
        let (loaded, ctx) = guard.ensure_shop_access(shop.id, &user).await.unwrap();
        assert_eq!(loaded.id, shop.id);
        assert_eq!(ctx.role, UserRole::Employee);
    }

    #[tokio::test]
    async fn test_guard_missing_shop() {
        let store = Arc::new(InMemoryStore::default());
        let guard = AccessGuard::new(store);
        let user = employee(ProjectId::new());
        assert!(matches!(
            guard.ensure_shop_access(ShopId::new(), &user).await,
            Err(AccessError::ShopNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_accessible_shop_ids_by_role() {
        let store = Arc::new(InMemoryStore::default());
        let project = ProjectId::new();
        let owner_id = UserId::new();
        let a = store.add_shop(project, owner_id);
        let b = store.add_shop(project, owner_id);
        let _foreign = store.add_shop(project, UserId::new());
        let guard = AccessGuard::new(Arc::clone(&store));

        let mut owned = guard.accessible_shop_ids(&owner_of(&a)).await.unwrap();
        owned.sort_by_key(|id| id.into_inner());
        let mut expected = vec![a.id, b.id];
        expected.sort_by_key(|id| id.into_inner());
        assert_eq!(owned, expected);

        let worker = employee(project);
        store.assign(worker.id, b.id);
        assert_eq!(guard.accessible_shop_ids(&worker).await.unwrap(), vec![b.id]);

        let other = AuthenticatedUser {
            role: UserRole::Other,
            ..owner_of(&a)
        };
        assert!(guard.accessible_shop_ids(&other).await.unwrap().is_empty());
    }
}
