//! Register state machine.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use till_shared::types::{CashRegisterId, ShopId};

use super::error::RegisterError;
use super::types::{
    CashRegister, CloseCommand, CloseRegisterInput, HistoryFilter, MovementLine, NewRegister,
    OpenRegisterInput, RegisterDetail, RegisterSnapshot, RegisterStatus,
};
use crate::access::{AccessGuard, AuthenticatedUser, Shop, ShopDirectory};
use crate::ledger::{
    CashMovement, MovementRepository, RegisterTotals, running_balances, sort_chronologically,
};

/// Maximum number of registers returned by a history listing.
pub const HISTORY_LIMIT: u64 = 100;

/// Number of movements attached to the current-register view.
pub const RECENT_MOVEMENTS: usize = 10;

/// Repository trait for register persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait RegisterRepository: Send + Sync {
    /// Find a register by ID.
    fn find_by_id(
        &self,
        id: CashRegisterId,
    ) -> impl Future<Output = Result<Option<CashRegister>, RegisterError>> + Send;

    /// The open register of a shop, if any.
    fn find_open_for_shop(
        &self,
        shop_id: ShopId,
    ) -> impl Future<Output = Result<Option<CashRegister>, RegisterError>> + Send;

    /// Creates an open register and its `OPENING` movement in one transaction.
    ///
    /// Must return [`RegisterError::AlreadyOpen`] when another open register
    /// exists for the shop, including when one is created concurrently.
    fn open(
        &self,
        register: NewRegister,
    ) -> impl Future<Output = Result<CashRegister, RegisterError>> + Send;

    /// Closes a register.
    ///
    /// Locks the row, re-checks it is open, reconciles against the full
    /// movement set and writes the result in one transaction.
    fn close(
        &self,
        id: CashRegisterId,
        command: CloseCommand,
    ) -> impl Future<Output = Result<CashRegister, RegisterError>> + Send;

    /// Registers of a shop, newest first.
    fn history(
        &self,
        shop_id: ShopId,
        filter: HistoryFilter,
        limit: u64,
    ) -> impl Future<Output = Result<Vec<CashRegister>, RegisterError>> + Send;

    /// Closed registers of the given shops with `closed_at` in `[start, end]`, newest first.
    fn closed_between(
        &self,
        shop_ids: &[ShopId],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<CashRegister>, RegisterError>> + Send;
}

/// A closed register with everything needed to render its statement.
#[derive(Debug, Clone)]
pub struct ClosedRegister {
    /// The register.
    pub register: CashRegister,
    /// Its shop.
    pub shop: Shop,
    /// Movements in creation order.
    pub movements: Vec<CashMovement>,
}

/// Register lifecycle service.
pub struct RegisterService<R: RegisterRepository, M: MovementRepository, D: ShopDirectory> {
    registers: Arc<R>,
    movements: Arc<M>,
    guard: AccessGuard<D>,
}

impl<R, M, D> RegisterService<R, M, D>
where
    R: RegisterRepository,
    M: MovementRepository,
    D: ShopDirectory,
{
    /// Create a new register service.
    #[must_use]
    pub fn new(registers: Arc<R>, movements: Arc<M>, guard: AccessGuard<D>) -> Self {
        Self {
            registers,
            movements,
            guard,
        }
    }

    /// Opens a register for a shop.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the opening amount is negative
    /// - the shop is missing or the user has no access
    /// - the shop already has an open register
    pub async fn open(
        &self,
        input: OpenRegisterInput,
        user: &AuthenticatedUser,
    ) -> Result<CashRegister, RegisterError> {
        if input.opening_amount < Decimal::ZERO {
            return Err(RegisterError::NegativeAmount(input.opening_amount));
        }

        self.guard.ensure_shop_access(input.shop_id, user).await?;

        if self
            .registers
            .find_open_for_shop(input.shop_id)
            .await?
            .is_some()
        {
            return Err(RegisterError::AlreadyOpen(input.shop_id));
        }

        let register = self
            .registers
            .open(NewRegister {
                shop_id: input.shop_id,
                employee_id: input.employee_id.unwrap_or(user.id),
                opening_amount: input.opening_amount,
                opened_by: user.id,
                opened_by_name: user.name.clone(),
                opened_at: Utc::now(),
            })
            .await?;

        tracing::info!(
            register_id = %register.id,
            shop_id = %register.shop_id,
            opening_amount = %register.opening_amount,
            "cash register opened"
        );
        Ok(register)
    }

    /// Closes an open register and reconciles it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the counted amount is negative
    /// - the register does not exist
    /// - the user has no access to the register's shop
    /// - the register is not open
    pub async fn close(
        &self,
        id: CashRegisterId,
        input: CloseRegisterInput,
        user: &AuthenticatedUser,
    ) -> Result<CashRegister, RegisterError> {
        if input.actual_amount < Decimal::ZERO {
            return Err(RegisterError::NegativeAmount(input.actual_amount));
        }

        let register = self
            .registers
            .find_by_id(id)
            .await?
            .ok_or(RegisterError::NotFound(id))?;
        self.guard
            .ensure_shop_access(register.shop_id, user)
            .await?;

        if register.status != RegisterStatus::Open {
            return Err(RegisterError::NotOpen(id));
        }

        let closed = self
            .registers
            .close(
                id,
                CloseCommand {
                    actual_amount: input.actual_amount,
                    closing_notes: input
                        .closing_notes
                        .map(|n| n.trim().to_string())
                        .filter(|n| !n.is_empty()),
                    closing_type: input.closing_type,
                    closed_by: user.id,
                    closed_at: Utc::now(),
                },
            )
            .await?;

        tracing::info!(
            register_id = %closed.id,
            shop_id = %closed.shop_id,
            difference = ?closed.difference,
            status = ?closed.difference_status(),
            "cash register closed"
        );
        Ok(closed)
    }

    /// The open register of a shop with its live balance.
    pub async fn current_open(
        &self,
        shop_id: ShopId,
        user: &AuthenticatedUser,
    ) -> Result<Option<RegisterSnapshot>, RegisterError> {
        self.guard.ensure_shop_access(shop_id, user).await?;

        let Some(register) = self.registers.find_open_for_shop(shop_id).await? else {
            return Ok(None);
        };

        let movements = self.ordered_movements(register.id).await?;
        let totals = RegisterTotals::compute(register.opening_amount, &movements);
        let recent_movements = movements
            .iter()
            .rev()
            .take(RECENT_MOVEMENTS)
            .cloned()
            .collect();

        Ok(Some(RegisterSnapshot {
            register,
            recent_movements,
            current_balance: totals.expected_amount,
            totals,
        }))
    }

    /// Up to [`HISTORY_LIMIT`] registers of a shop, newest first.
    pub async fn history(
        &self,
        shop_id: ShopId,
        filter: HistoryFilter,
        user: &AuthenticatedUser,
    ) -> Result<Vec<CashRegister>, RegisterError> {
        if let (Some(from), Some(to)) = (filter.opened_from, filter.opened_to)
            && from > to
        {
            return Err(RegisterError::InvalidRange(
                "start date is after end date".to_string(),
            ));
        }

        self.guard.ensure_shop_access(shop_id, user).await?;
        self.registers.history(shop_id, filter, HISTORY_LIMIT).await
    }

    /// Register with every movement, running balances and totals.
    pub async fn detail(
        &self,
        id: CashRegisterId,
        user: &AuthenticatedUser,
    ) -> Result<RegisterDetail, RegisterError> {
        let register = self
            .registers
            .find_by_id(id)
            .await?
            .ok_or(RegisterError::NotFound(id))?;
        self.guard
            .ensure_shop_access(register.shop_id, user)
            .await?;

        let movements = self.ordered_movements(id).await?;
        let totals = RegisterTotals::compute(register.opening_amount, &movements);
        let balances = running_balances(register.opening_amount, &movements);
        let lines = movements
            .into_iter()
            .zip(balances)
            .map(|(movement, running_balance)| MovementLine {
                reference: movement.reference(),
                movement,
                running_balance,
            })
            .collect();

        Ok(RegisterDetail {
            difference_status: register.difference_status(),
            register,
            lines,
            totals,
        })
    }

    /// Loads a closed register for export.
    ///
    /// # Errors
    ///
    /// Returns `NotClosed` when the register is still open.
    pub async fn load_closed(
        &self,
        id: CashRegisterId,
        user: &AuthenticatedUser,
    ) -> Result<ClosedRegister, RegisterError> {
        let register = self
            .registers
            .find_by_id(id)
            .await?
            .ok_or(RegisterError::NotFound(id))?;
        let (shop, _) = self
            .guard
            .ensure_shop_access(register.shop_id, user)
            .await?;

        if register.status != RegisterStatus::Closed {
            return Err(RegisterError::NotClosed(id));
        }

        let movements = self.ordered_movements(id).await?;
        Ok(ClosedRegister {
            register,
            shop,
            movements,
        })
    }

    /// Loads a register and its shop without authorization.
    ///
    /// Used by background distribution, which re-checks access when exporting.
    pub async fn find_with_shop(
        &self,
        id: CashRegisterId,
    ) -> Result<Option<(CashRegister, Shop)>, RegisterError> {
        let Some(register) = self.registers.find_by_id(id).await? else {
            return Ok(None);
        };
        let shop = self
            .guard
            .find_shop(register.shop_id)
            .await?
            .ok_or(crate::access::AccessError::ShopNotFound(register.shop_id))?;
        Ok(Some((register, shop)))
    }

    async fn ordered_movements(
        &self,
        id: CashRegisterId,
    ) -> Result<Vec<CashMovement>, RegisterError> {
        let mut movements = self.movements.list_for_register(id).await?;
        sort_chronologically(&mut movements);
        Ok(movements)
    }
}
