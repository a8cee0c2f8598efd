//! Access control types.

use serde::{Deserialize, Serialize};
use till_shared::types::{ProjectId, ShopId, UserId};

/// Role a user holds inside their project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Owns shops.
    Owner,
    /// Works at assigned shops.
    Employee,
    /// Any role this subsystem does not grant access to.
    Other,
}

impl UserRole {
    /// Parses a role claim. Unknown roles map to [`UserRole::Other`].
    #[must_use]
    pub fn from_claim(role: &str) -> Self {
        match role.trim().to_ascii_lowercase().as_str() {
            "owner" => Self::Owner,
            "employee" => Self::Employee,
            _ => Self::Other,
        }
    }
}

/// The caller of a register operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// User ID.
    pub id: UserId,
    /// Project the user belongs to.
    pub project_id: ProjectId,
    /// Role within the project.
    pub role: UserRole,
    /// Display name, if known.
    pub name: Option<String>,
}

/// A store with its own cash drawer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    /// Shop ID.
    pub id: ShopId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Owner user.
    pub owner_id: UserId,
    /// Display name.
    pub name: String,
    /// ISO 4217 currency code used for all amounts of this shop.
    pub currency: String,
}

/// Authorization outcome for a (user, shop) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopAccessContext {
    /// Acting user.
    pub user_id: UserId,
    /// Role the access was granted under.
    pub role: UserRole,
    /// Shop the access applies to.
    pub shop_id: ShopId,
}
