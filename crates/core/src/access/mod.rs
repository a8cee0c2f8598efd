//! Shop-scoped access control.
//!
//! Every register operation is authorized against a shop:
//! - owners act on shops they own inside their own project
//! - employees act on shops they are explicitly assigned to
//! - every other role is refused

mod error;
mod guard;
mod types;

pub use error::AccessError;
pub use guard::{AccessGuard, ShopDirectory, evaluate};
pub use types::{AuthenticatedUser, Shop, ShopAccessContext, UserRole};
