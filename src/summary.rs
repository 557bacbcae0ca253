use log::warn;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::calendar::whole_months_between;
use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::schedule::Schedule;
use crate::types::{EntryStatus, PaymentType};

/// aggregate view of a schedule, derived on demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnsSummary {
    pub principal_amount: Money,
    pub period_count: u32,
    pub total_interest: Money,
    pub total_principal_scheduled: Money,
    /// sum of total due across all periods
    pub total_returns: Money,
    /// total interest as a percentage of principal, unrounded
    pub effective_rate: Decimal,
    /// effective rate spread evenly over the periods
    pub periodic_rate: Decimal,
    /// effective rate scaled to twelve months; `None` under one month
    pub annualized_rate: Option<Decimal>,

    pub total_paid: Money,
    pub interest_paid: Money,
    pub principal_paid: Money,
    pub penalty_paid: Money,
    pub bonus_paid: Money,
    /// unpaid remainder summed per entry
    pub outstanding_due: Money,
    pub overpaid_amount: Money,

    pub paid_periods: u32,
    pub partial_periods: u32,
    pub overdue_periods: u32,
    pub pending_periods: u32,
}

impl ReturnsSummary {
    /// effective rate rounded to two places for presentation
    pub fn effective_rate_display(&self) -> Decimal {
        self.effective_rate
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// principal plus interest, the interest-only shortcut for total returns
    pub fn principal_plus_interest(&self) -> Money {
        self.principal_amount + self.total_interest
    }

    pub fn is_settled(&self) -> bool {
        self.outstanding_due.is_zero()
    }
}

/// aggregate a schedule into totals, rates and paid-to-date figures
///
/// Pure: calling it again on the same schedule yields the same summary.
pub fn summarize(schedule: &Schedule, principal_amount: Money) -> Result<ReturnsSummary> {
    if !principal_amount.is_positive() {
        return Err(EngineError::InvalidRateInput {
            message: format!("rates need a positive principal, got {}", principal_amount),
        });
    }

    let entries = schedule.entries();
    let period_count = entries.len() as u32;

    let total_interest = schedule.total_interest_due();
    let total_principal_scheduled = schedule.total_principal_due();
    let total_returns = schedule.total_due();

    let effective_rate = total_interest
        .as_decimal()
        .checked_div(principal_amount.as_decimal())
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| EngineError::InvalidRateInput {
            message: format!("effective rate of {} on {} is not representable", total_interest, principal_amount),
        })?;
    let periodic_rate = if period_count == 0 {
        Decimal::ZERO
    } else {
        effective_rate / Decimal::from(period_count)
    };

    let annualized_rate = schedule
        .final_due_date()
        .map(|end| whole_months_between(schedule.investment_date, end))
        .filter(|months| *months > 0)
        .map(|months| {
            effective_rate
                .checked_mul(Decimal::from(12))
                .map(|yearly| yearly / Decimal::from(months))
                .ok_or_else(|| EngineError::InvalidRateInput {
                    message: format!("annualized rate of {}% is not representable", effective_rate),
                })
        })
        .transpose()?;

    let mut summary = ReturnsSummary {
        principal_amount,
        period_count,
        total_interest,
        total_principal_scheduled,
        total_returns,
        effective_rate,
        periodic_rate,
        annualized_rate,
        total_paid: Money::ZERO,
        interest_paid: Money::ZERO,
        principal_paid: Money::ZERO,
        penalty_paid: Money::ZERO,
        bonus_paid: Money::ZERO,
        outstanding_due: Money::ZERO,
        overpaid_amount: Money::ZERO,
        paid_periods: 0,
        partial_periods: 0,
        overdue_periods: 0,
        pending_periods: 0,
    };

    for entry in entries {
        summary.total_paid += entry.paid_amount;
        summary.interest_paid += entry.paid_interest;
        summary.principal_paid += entry.paid_principal;
        summary.penalty_paid += entry.paid_penalty;
        summary.bonus_paid += entry.paid_bonus;
        summary.outstanding_due += entry.remaining_due();
        summary.overpaid_amount += entry.excess_amount;

        match entry.status {
            EntryStatus::Paid => summary.paid_periods += 1,
            EntryStatus::Partial => summary.partial_periods += 1,
            EntryStatus::Overdue => summary.overdue_periods += 1,
            EntryStatus::Pending => summary.pending_periods += 1,
        }
    }

    if schedule.payment_type == PaymentType::InterestOnly && total_returns != summary.principal_plus_interest() {
        warn!(
            "interest-only totals disagree: {} scheduled vs {} principal plus interest",
            total_returns,
            summary.principal_plus_interest()
        );
    }

    Ok(summary)
}
