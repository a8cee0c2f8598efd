//! Movement ledger service.

use std::future::Future;
use std::sync::Arc;

use rust_decimal::Decimal;
use till_shared::types::CashRegisterId;

use super::balance::{RegisterTotals, sort_chronologically};
use super::error::LedgerError;
use super::types::{AppendMovementInput, CashMovement, MovementType, NewMovement};
use crate::access::{AccessGuard, AuthenticatedUser, ShopDirectory};
use crate::register::{CashRegister, RegisterRepository};

/// Repository trait for movement persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait MovementRepository: Send + Sync {
    /// Appends a movement.
    ///
    /// Must run in a transaction that locks the register row and rejects
    /// registers that are not open, so an append racing a close is either
    /// part of the closing amount or refused.
    fn append(
        &self,
        movement: NewMovement,
    ) -> impl Future<Output = Result<CashMovement, LedgerError>> + Send;

    /// All movements of a register in creation order.
    fn list_for_register(
        &self,
        register_id: CashRegisterId,
    ) -> impl Future<Output = Result<Vec<CashMovement>, LedgerError>> + Send;
}

/// Appends movements and computes totals.
pub struct LedgerService<M: MovementRepository, R: RegisterRepository, D: ShopDirectory> {
    movements: Arc<M>,
    registers: Arc<R>,
    guard: AccessGuard<D>,
}

impl<M, R, D> LedgerService<M, R, D>
where
    M: MovementRepository,
    R: RegisterRepository,
    D: ShopDirectory,
{
    /// Create a new ledger service.
    #[must_use]
    pub fn new(movements: Arc<M>, registers: Arc<R>, guard: AccessGuard<D>) -> Self {
        Self {
            movements,
            registers,
            guard,
        }
    }

    /// Posts a movement to an open register.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the amount is negative or the type is `OPENING`
    /// - the register does not exist or is not open
    /// - the user has no access to the register's shop
    pub async fn append(
        &self,
        register_id: CashRegisterId,
        input: AppendMovementInput,
        user: &AuthenticatedUser,
    ) -> Result<CashMovement, LedgerError> {
        if input.amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount(input.amount));
        }
        if input.movement_type == MovementType::Opening {
            return Err(LedgerError::ReservedType(input.movement_type));
        }

        let register = self.load_authorized(register_id, user).await?;
        if !register.is_open() {
            return Err(LedgerError::RegisterNotOpen(register_id));
        }

        let movement = self
            .movements
            .append(NewMovement {
                cash_register_id: register_id,
                shop_id: register.shop_id,
                movement_type: input.movement_type,
                amount: input.amount,
                description: input.description,
                user_id: user.id,
                origin: input.origin,
            })
            .await?;

        tracing::debug!(
            register_id = %register_id,
            movement_type = %movement.movement_type,
            amount = %movement.amount,
            "movement appended"
        );
        Ok(movement)
    }

    /// Totals of a register over its current movement set.
    pub async fn totals(
        &self,
        register_id: CashRegisterId,
        user: &AuthenticatedUser,
    ) -> Result<RegisterTotals, LedgerError> {
        let register = self.load_authorized(register_id, user).await?;
        let mut movements = self.movements.list_for_register(register_id).await?;
        sort_chronologically(&mut movements);
        Ok(RegisterTotals::compute(register.opening_amount, &movements))
    }

    async fn load_authorized(
        &self,
        register_id: CashRegisterId,
        user: &AuthenticatedUser,
    ) -> Result<CashRegister, LedgerError> {
        let register = self
            .registers
            .find_by_id(register_id)
            .await
            .map_err(|e| LedgerError::repository(e.to_string()))?
            .ok_or(LedgerError::RegisterNotFound(register_id))?;
        self.guard
            .ensure_shop_access(register.shop_id, user)
            .await?;
        Ok(register)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessError;
    use crate::ledger::{OriginKind, OriginRef};
    use crate::testing::{Fixture, employee};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn input(movement_type: MovementType, amount: Decimal) -> AppendMovementInput {
        AppendMovementInput {
            movement_type,
            amount,
            description: String::new(),
            origin: None,
        }
    }

    #[tokio::test]
    async fn test_append_and_totals() {
        let fx = Fixture::new();
        let register = fx.open_register(dec!(10000)).await;
        let ledger = fx.ledger();

        let sale = ledger
            .append(
                register.id,
                AppendMovementInput {
                    origin: Some(OriginRef {
                        kind: OriginKind::Sale,
                        id: Uuid::parse_str("abcd1234-0000-0000-0000-000000000000").unwrap(),
                    }),
                    ..input(MovementType::Sale, dec!(5000))
                },
                &fx.owner,
            )
            .await
            .unwrap();
        assert_eq!(sale.shop_id, fx.shop.id);
        assert_eq!(sale.reference(), "Sale #abcd1234");

        ledger
            .append(register.id, input(MovementType::Expense, dec!(2000)), &fx.owner)
            .await
            .unwrap();

        let totals = ledger.totals(register.id, &fx.owner).await.unwrap();
        assert_eq!(totals.expected_amount, dec!(13000));
        assert_eq!(totals.net_income, dec!(3000));
    }

    #[tokio::test]
    async fn test_append_rejects_negative_and_opening() {
        let fx = Fixture::new();
        let register = fx.open_register(dec!(0)).await;
        let ledger = fx.ledger();

        assert!(matches!(
            ledger
                .append(register.id, input(MovementType::Sale, dec!(-1)), &fx.owner)
                .await,
            Err(LedgerError::NegativeAmount(_))
        ));
        assert!(matches!(
            ledger
                .append(register.id, input(MovementType::Opening, dec!(1)), &fx.owner)
                .await,
            Err(LedgerError::ReservedType(MovementType::Opening))
        ));
    }

    #[tokio::test]
    async fn test_append_to_closed_register_conflicts() {
        let fx = Fixture::new();
        let register = fx.open_register(dec!(100)).await;
        fx.close_register(register.id, dec!(100)).await;

        let result = fx
            .ledger()
            .append(register.id, input(MovementType::Sale, dec!(1)), &fx.owner)
            .await;
        assert!(matches!(result, Err(LedgerError::RegisterNotOpen(_))));
    }

    #[tokio::test]
    async fn test_append_requires_shop_access() {
        let fx = Fixture::new();
        let register = fx.open_register(dec!(100)).await;
        let stranger = employee(fx.shop.project_id);

        let result = fx
            .ledger()
            .append(register.id, input(MovementType::Sale, dec!(1)), &stranger)
            .await;
        assert!(matches!(
            result,
            Err(LedgerError::Access(AccessError::Forbidden(_)))
        ));
    }

    #[tokio::test]
    async fn test_append_unknown_register() {
        let fx = Fixture::new();
        let result = fx
            .ledger()
            .append(CashRegisterId::new(), input(MovementType::Sale, dec!(1)), &fx.owner)
            .await;
        assert!(matches!(result, Err(LedgerError::RegisterNotFound(_))));
    }
}
