use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;

use crate::calendar::add_months;
use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::plan::{PlanDefinition, RepaymentTerms};
use crate::types::AmortizationBasis;

use super::{Schedule, ScheduleEntry};

/// generate the schedule for a regular-frequency plan
pub fn generate_schedule(
    plan: &PlanDefinition,
    principal_amount: Money,
    investment_date: NaiveDate,
) -> Result<Schedule> {
    ScheduleGenerator::new().generate(plan, principal_amount, investment_date, &[])
}

/// generate the schedule with caller-supplied payout dates (custom frequency)
///
/// Dates must strictly increase after `investment_date` and none may fall
/// after `investment_date + tenure_months`.
pub fn generate_schedule_with_dates(
    plan: &PlanDefinition,
    principal_amount: Money,
    investment_date: NaiveDate,
    payout_dates: &[NaiveDate],
) -> Result<Schedule> {
    ScheduleGenerator::new().generate(plan, principal_amount, investment_date, payout_dates)
}

/// schedule generator
#[derive(Debug, Clone, Default)]
pub struct ScheduleGenerator {
    config: EngineConfig,
}

impl ScheduleGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// build the full schedule for `principal_amount` invested on `investment_date`
    pub fn generate(
        &self,
        plan: &PlanDefinition,
        principal_amount: Money,
        investment_date: NaiveDate,
        payout_dates: &[NaiveDate],
    ) -> Result<Schedule> {
        plan.validate()?;
        plan.check_principal(principal_amount)?;

        let due_dates = self.due_dates(plan, investment_date, payout_dates)?;

        let entries = match plan.repayment_terms {
            RepaymentTerms::InterestOnly { .. } => {
                self.interest_only_entries(plan, principal_amount, &due_dates)?
            }
            RepaymentTerms::InterestPlusPrincipal {
                principal_repayment_percent_per_period,
                basis,
            } => self.amortizing_entries(
                plan,
                principal_amount,
                &due_dates,
                principal_repayment_percent_per_period,
                basis,
            )?,
        };

        debug!(
            "generated {} periods for plan {} v{}: principal {}, {:?} {:?} at {}",
            entries.len(),
            plan.id,
            plan.version,
            principal_amount,
            plan.payment_type(),
            plan.interest_rate.mode,
            plan.interest_rate.rate_per_period,
        );

        Ok(Schedule {
            investment_date,
            principal_amount,
            payment_type: plan.payment_type(),
            payment_frequency: plan.payment_frequency,
            interest_rate: plan.interest_rate,
            planned_periods: entries.len() as u32,
            entries,
        })
    }

    /// due date of every period, in order
    fn due_dates(
        &self,
        plan: &PlanDefinition,
        investment_date: NaiveDate,
        payout_dates: &[NaiveDate],
    ) -> Result<Vec<NaiveDate>> {
        let months_per_period = match plan.payment_frequency.months_per_period() {
            Some(months) => months,
            None => return check_custom_dates(investment_date, plan.tenure_months, payout_dates),
        };

        if !payout_dates.is_empty() {
            return Err(EngineError::InvalidConfiguration {
                message: format!(
                    "payout dates only apply to custom frequency, plan pays {:?}",
                    plan.payment_frequency
                ),
            });
        }

        let periods = plan.tenure_months / months_per_period;
        if periods == 0 {
            return Err(EngineError::InvalidTenure {
                tenure_months: plan.tenure_months,
                message: "tenure shorter than one payment period".to_string(),
            });
        }

        (1..=periods)
            .map(|index| add_months(investment_date, index * months_per_period))
            .collect()
    }

    /// interest every period, principal back on the last one
    ///
    /// The balance never reduces before maturity, so reducing-balance interest
    /// equals flat interest here.
    fn interest_only_entries(
        &self,
        plan: &PlanDefinition,
        principal_amount: Money,
        due_dates: &[NaiveDate],
    ) -> Result<Vec<ScheduleEntry>> {
        let interest = self
            .config
            .round(plan.interest_rate.period_interest(principal_amount, principal_amount)?);
        let last_index = due_dates.len();

        let entries = due_dates
            .iter()
            .enumerate()
            .map(|(i, due_date)| {
                let period_index = i + 1;
                let principal_due = if period_index == last_index {
                    principal_amount
                } else {
                    Money::ZERO
                };
                ScheduleEntry::new(period_index as u32, *due_date, principal_amount, interest, principal_due)
            })
            .collect();

        Ok(entries)
    }

    /// interest plus a share of principal each period; the last period takes
    /// whatever balance is left so principal sums exactly
    fn amortizing_entries(
        &self,
        plan: &PlanDefinition,
        principal_amount: Money,
        due_dates: &[NaiveDate],
        percent_per_period: Decimal,
        basis: AmortizationBasis,
    ) -> Result<Vec<ScheduleEntry>> {
        let mut entries = Vec::with_capacity(due_dates.len());
        let mut outstanding = principal_amount;
        let last_index = due_dates.len();

        for (i, due_date) in due_dates.iter().enumerate() {
            let period_index = i + 1;
            let interest = self
                .config
                .round(plan.interest_rate.period_interest(outstanding, principal_amount)?);

            let principal_due = if period_index == last_index {
                outstanding
            } else {
                let base = match basis {
                    AmortizationBasis::OutstandingBalance => outstanding,
                    AmortizationBasis::OriginalPrincipal => principal_amount,
                };
                self.config.round(base.percentage(percent_per_period)).min(outstanding)
            };

            let entry = ScheduleEntry::new(period_index as u32, *due_date, outstanding, interest, principal_due);
            outstanding = entry.closing_balance;
            entries.push(entry);
        }

        Ok(entries)
    }
}

fn check_custom_dates(investment_date: NaiveDate, tenure_months: u32, payout_dates: &[NaiveDate]) -> Result<Vec<NaiveDate>> {
    if payout_dates.is_empty() {
        return Err(EngineError::MissingCustomDates);
    }

    let horizon = add_months(investment_date, tenure_months)?;

    let mut previous = investment_date;
    for date in payout_dates {
        if *date <= previous {
            return Err(EngineError::InvalidDate {
                message: format!(
                    "payout date {} must be after {} (investment date {})",
                    date, previous, investment_date
                ),
            });
        }
        if *date > horizon {
            return Err(EngineError::InvalidDate {
                message: format!(
                    "payout date {} falls after the {}-month tenure ending {}",
                    date, tenure_months, horizon
                ),
            });
        }
        previous = *date;
    }

    Ok(payout_dates.to_vec())
}
