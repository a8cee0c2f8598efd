//! Report generation service.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::error::ReportError;
use super::period::{RangeParams, RangeResolver, ReportPeriod};
use super::types::{ClosedRegisterReport, EMPTY_REPORT_MESSAGE, RegisterSummary};
use crate::access::{AccessGuard, AuthenticatedUser, Shop, ShopDirectory};
use crate::register::RegisterRepository;

/// Lists closed registers over resolved date windows.
pub struct ReportService<R: RegisterRepository, D: ShopDirectory> {
    registers: Arc<R>,
    guard: AccessGuard<D>,
    tz: Tz,
}

impl<R: RegisterRepository, D: ShopDirectory> ReportService<R, D> {
    /// Create a report service; windows are interpreted in `tz`.
    #[must_use]
    pub fn new(registers: Arc<R>, guard: AccessGuard<D>, tz: Tz) -> Self {
        Self {
            registers,
            guard,
            tz,
        }
    }

    /// Closed registers of every shop the user can access within the window.
    ///
    /// # Errors
    ///
    /// Returns an error if the period or its parameters are invalid, or a
    /// lookup fails.
    pub async fn closed_registers(
        &self,
        period: &str,
        params: &RangeParams,
        user: &AuthenticatedUser,
    ) -> Result<ClosedRegisterReport, ReportError> {
        self.closed_registers_at(period, params, user, Utc::now())
            .await
    }

    /// [`Self::closed_registers`] evaluated at a given instant.
    pub async fn closed_registers_at(
        &self,
        period: &str,
        params: &RangeParams,
        user: &AuthenticatedUser,
        now: DateTime<Utc>,
    ) -> Result<ClosedRegisterReport, ReportError> {
        let period = period.parse::<ReportPeriod>()?;
        let range = RangeResolver::resolve(period, params, now.with_timezone(&self.tz).naive_local())?;
        let (start, end) = range.to_utc(self.tz);

        let shop_ids = self.guard.accessible_shop_ids(user).await?;
        let closed = if shop_ids.is_empty() {
            Vec::new()
        } else {
            self.registers.closed_between(&shop_ids, start, end).await?
        };

        let mut shops: HashMap<_, Shop> = HashMap::new();
        let mut registers = Vec::with_capacity(closed.len());
        for register in closed {
            if !shops.contains_key(&register.shop_id)
                && let Some(shop) = self.guard.find_shop(register.shop_id).await?
            {
                shops.insert(shop.id, shop);
            }
            let (shop_name, currency) = shops
                .get(&register.shop_id)
                .map(|s| (s.name.clone(), s.currency.clone()))
                .unwrap_or_default();

            registers.push(RegisterSummary {
                id: register.id,
                shop_id: register.shop_id,
                shop_name,
                currency,
                employee_id: register.employee_id,
                opened_at: register.opened_at,
                closed_at: register.closed_at,
                opening_amount: register.opening_amount,
                closing_amount: register.closing_amount,
                actual_amount: register.actual_amount,
                difference: register.difference,
                difference_status: register.difference_status(),
                closing_type: register.closing_type,
            });
        }

        tracing::debug!(
            period = period.as_str(),
            start = %range.start,
            end = %range.end,
            shops = shop_ids.len(),
            count = registers.len(),
            "closed register report resolved"
        );

        Ok(ClosedRegisterReport {
            period,
            start: range.start,
            end: range.end,
            message: registers
                .is_empty()
                .then(|| EMPTY_REPORT_MESSAGE.to_string()),
            registers,
        })
    }
}
