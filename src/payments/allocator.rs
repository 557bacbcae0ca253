use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use log::{debug, warn};

use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::schedule::ScheduleEntry;

use super::{PaymentApplication, PaymentBreakdown};

/// apply a payment to one entry with the default configuration
pub fn apply_payment(
    entry: &mut ScheduleEntry,
    amount: Money,
    breakdown: Option<PaymentBreakdown>,
    as_of: NaiveDate,
) -> Result<PaymentApplication> {
    PaymentAllocator::new().apply(entry, amount, breakdown, as_of)
}

/// splits payments across the components of a schedule entry
#[derive(Debug, Clone, Default)]
pub struct PaymentAllocator {
    config: EngineConfig,
}

impl PaymentAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// record `amount` against `entry`
    ///
    /// Without a breakdown the amount settles unpaid interest first, then
    /// unpaid principal; anything left is excess. A breakdown must add up
    /// to the amount within the configured tolerance. The entry is left
    /// untouched when validation fails. Penalty and bonus components are
    /// recorded but never settle dues or count as excess.
    pub fn apply(
        &self,
        entry: &mut ScheduleEntry,
        amount: Money,
        breakdown: Option<PaymentBreakdown>,
        as_of: NaiveDate,
    ) -> Result<PaymentApplication> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidPaymentAmount { amount });
        }

        let split = match breakdown {
            Some(breakdown) => {
                self.check_breakdown(&breakdown, amount)?;
                breakdown
            }
            None => auto_split(entry, amount),
        };

        let previous_status = entry.status;
        let previous_excess = entry.excess_amount;

        entry.paid_amount += amount;
        entry.paid_interest += split.interest;
        entry.paid_principal += split.principal;
        entry.paid_penalty += split.penalty;
        entry.paid_bonus += split.bonus;
        entry.excess_amount = entry.dues_paid().saturating_sub(entry.total_due);
        entry.status = entry.evaluate_status(as_of);

        let application = PaymentApplication {
            period_index: entry.period_index,
            amount,
            to_interest: split.interest,
            to_principal: split.principal,
            to_penalty: split.penalty,
            to_bonus: split.bonus,
            excess: entry.excess_amount.saturating_sub(previous_excess),
            previous_status,
            new_status: entry.status,
            overpaid: entry.is_overpaid(),
        };

        debug!(
            "period {}: applied {} (interest {}, principal {}), status {:?} -> {:?}",
            entry.period_index, amount, split.interest, split.principal, previous_status, entry.status
        );
        if application.overpaid {
            warn!(
                "period {} overpaid: {} paid against {} due",
                entry.period_index, entry.dues_paid(), entry.total_due
            );
        }

        Ok(application)
    }

    /// `apply` dated by the provider's clock
    pub fn apply_now(
        &self,
        entry: &mut ScheduleEntry,
        amount: Money,
        breakdown: Option<PaymentBreakdown>,
        time_provider: &SafeTimeProvider,
    ) -> Result<PaymentApplication> {
        self.apply(entry, amount, breakdown, time_provider.now().date_naive())
    }

    fn check_breakdown(&self, breakdown: &PaymentBreakdown, amount: Money) -> Result<()> {
        breakdown.validate()?;

        let breakdown_total = breakdown.total();
        if (breakdown_total - amount).abs() > self.config.breakdown_tolerance {
            return Err(EngineError::BreakdownMismatch {
                amount,
                breakdown_total,
            });
        }
        Ok(())
    }
}

/// interest first, then principal, capped at what is still unpaid
fn auto_split(entry: &ScheduleEntry, amount: Money) -> PaymentBreakdown {
    let unpaid_interest = entry.interest_due.saturating_sub(entry.paid_interest);
    let unpaid_principal = entry.principal_due.saturating_sub(entry.paid_principal);

    let interest = amount.min(unpaid_interest);
    let principal = (amount - interest).min(unpaid_principal);

    PaymentBreakdown::interest_and_principal(interest, principal)
}
