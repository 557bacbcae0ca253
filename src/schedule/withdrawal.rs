use chrono::NaiveDate;
use log::info;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::add_months;
use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::plan::{PlanDefinition, PrincipalRepaymentOption, RepaymentTerms};

use super::generator::ScheduleGenerator;
use super::{Schedule, ScheduleEntry};

/// result of an accepted withdrawal request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalOutcome {
    /// periods elapsed when the request was made
    pub after_period: u32,
    /// periods over which principal is now repaid
    pub settlement_periods: u32,
    /// periods removed from the end of the schedule
    pub dropped_periods: u32,
    pub settled_principal: Money,
    pub final_due_date: NaiveDate,
}

/// recompute `schedule` for an early principal withdrawal requested after
/// `after_period` periods, using the default engine configuration
pub fn request_withdrawal(
    schedule: &mut Schedule,
    plan: &PlanDefinition,
    after_period: u32,
) -> Result<WithdrawalOutcome> {
    ScheduleGenerator::new().recompute_for_withdrawal(schedule, plan, after_period)
}

impl ScheduleGenerator {
    /// replace the unpaid tail of an interest-only schedule with a settlement
    /// that repays the outstanding principal
    ///
    /// Entries up to `after_period` are kept as they are. The next
    /// settlement periods keep their due dates and repay equal shares of the
    /// outstanding principal, the last share taking the remainder. Interest
    /// keeps accruing on the shrinking balance for reducing plans and on the
    /// original principal for flat plans. Later entries are dropped.
    pub fn recompute_for_withdrawal(
        &self,
        schedule: &mut Schedule,
        plan: &PlanDefinition,
        after_period: u32,
    ) -> Result<WithdrawalOutcome> {
        let (after_percent, settlement_term_months) = flexible_terms(plan)?;

        if schedule.payment_type != plan.payment_type() {
            return Err(EngineError::InvalidState {
                current: format!("{:?} schedule", schedule.payment_type),
                expected: format!("{:?} schedule", plan.payment_type()),
            });
        }

        let remaining_periods = (schedule.len() as u32).saturating_sub(after_period);
        if remaining_periods == 0 {
            return Err(EngineError::WithdrawalNotPermitted {
                message: format!("no periods remain after period {}", after_period),
            });
        }

        let elapsed = Decimal::from(after_period) * Decimal::ONE_HUNDRED;
        let required = after_percent * Decimal::from(schedule.planned_periods);
        if elapsed < required {
            return Err(EngineError::WithdrawalNotPermitted {
                message: format!(
                    "{} of {} periods elapsed, plan requires {}% of tenure",
                    after_period, schedule.planned_periods, after_percent
                ),
            });
        }

        let tail_start = after_period as usize;
        if let Some(paid) = schedule.entries[tail_start..].iter().find(|e| e.has_payments()) {
            return Err(EngineError::InvalidState {
                current: format!("period {} has payments recorded", paid.period_index),
                expected: format!("no payments after period {}", after_period),
            });
        }

        let settlement_periods = self
            .settlement_period_count(schedule, after_period, settlement_term_months)?
            .clamp(1, remaining_periods);

        let outstanding = schedule.outstanding_principal_after(after_period);
        let original = schedule.principal_amount;
        let share = self.config().round(outstanding / Decimal::from(settlement_periods));

        let mut balance = outstanding;
        let mut settlement = Vec::with_capacity(settlement_periods as usize);
        for (offset, entry) in schedule.entries[tail_start..]
            .iter()
            .take(settlement_periods as usize)
            .enumerate()
        {
            let is_last = offset as u32 + 1 == settlement_periods;
            let interest = self
                .config()
                .round(schedule.interest_rate.period_interest(balance, original)?);
            let principal_due = if is_last { balance } else { share.min(balance) };

            let replacement = ScheduleEntry::new(entry.period_index, entry.due_date, balance, interest, principal_due);
            balance = replacement.closing_balance;
            settlement.push(replacement);
        }

        schedule.entries.truncate(tail_start);
        schedule.entries.extend(settlement);

        let final_due_date = schedule.final_due_date().ok_or_else(|| EngineError::InvalidState {
            current: "empty schedule".to_string(),
            expected: "at least one period".to_string(),
        })?;

        info!(
            "withdrawal after period {}: {} settled over {} periods, {} periods dropped",
            after_period,
            outstanding,
            settlement_periods,
            remaining_periods - settlement_periods
        );

        Ok(WithdrawalOutcome {
            after_period,
            settlement_periods,
            dropped_periods: remaining_periods - settlement_periods,
            settled_principal: outstanding,
            final_due_date,
        })
    }

    /// periods covered by the settlement term; custom schedules count the
    /// remaining due dates inside the term window
    fn settlement_period_count(
        &self,
        schedule: &Schedule,
        after_period: u32,
        settlement_term_months: u32,
    ) -> Result<u32> {
        if let Some(months) = schedule.payment_frequency.months_per_period() {
            return Ok(settlement_term_months.div_ceil(months));
        }

        let anchor = match after_period {
            0 => schedule.investment_date,
            n => schedule
                .entry(n)
                .map(|e| e.due_date)
                .ok_or(EngineError::PeriodNotFound { period_index: n })?,
        };
        let horizon = add_months(anchor, settlement_term_months)?;

        Ok(schedule.entries[after_period as usize..]
            .iter()
            .filter(|e| e.due_date <= horizon)
            .count() as u32)
    }
}

fn flexible_terms(plan: &PlanDefinition) -> Result<(Decimal, u32)> {
    match plan.repayment_terms {
        RepaymentTerms::InterestOnly {
            principal_repayment:
                PrincipalRepaymentOption::FlexibleWithdrawal {
                    withdrawal_after_percent_of_tenure,
                    principal_settlement_term_months,
                },
        } => Ok((withdrawal_after_percent_of_tenure, principal_settlement_term_months)),
        _ => Err(EngineError::WithdrawalNotPermitted {
            message: format!("plan {} does not allow flexible withdrawal", plan.name),
        }),
    }
}
