pub mod generator;
pub mod withdrawal;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::interest::RateSpec;
use crate::types::{EntryStatus, PaymentFrequency, PaymentType};

pub use generator::{generate_schedule, generate_schedule_with_dates, ScheduleGenerator};
pub use withdrawal::{request_withdrawal, WithdrawalOutcome};

/// one payout period of an investment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub period_index: u32,
    pub due_date: NaiveDate,
    /// principal outstanding before this period's reduction
    pub opening_balance: Money,
    pub interest_due: Money,
    pub principal_due: Money,
    pub total_due: Money,
    /// principal outstanding after this period's reduction
    pub closing_balance: Money,
    pub paid_amount: Money,
    pub paid_interest: Money,
    pub paid_principal: Money,
    pub paid_penalty: Money,
    pub paid_bonus: Money,
    /// dues paid beyond total due, kept for reconciliation
    pub excess_amount: Money,
    pub status: EntryStatus,
}

impl ScheduleEntry {
    pub fn new(
        period_index: u32,
        due_date: NaiveDate,
        opening_balance: Money,
        interest_due: Money,
        principal_due: Money,
    ) -> Self {
        Self {
            period_index,
            due_date,
            opening_balance,
            interest_due,
            principal_due,
            total_due: interest_due + principal_due,
            closing_balance: opening_balance - principal_due,
            paid_amount: Money::ZERO,
            paid_interest: Money::ZERO,
            paid_principal: Money::ZERO,
            paid_penalty: Money::ZERO,
            paid_bonus: Money::ZERO,
            excess_amount: Money::ZERO,
            status: EntryStatus::Pending,
        }
    }

    /// paid toward interest and principal; penalty and bonus are excluded
    pub fn dues_paid(&self) -> Money {
        self.paid_amount.saturating_sub(self.paid_penalty + self.paid_bonus)
    }

    /// amount still owed on this entry
    pub fn remaining_due(&self) -> Money {
        self.total_due.saturating_sub(self.dues_paid())
    }

    pub fn is_overpaid(&self) -> bool {
        self.dues_paid() > self.total_due
    }

    pub fn is_settled(&self) -> bool {
        self.dues_paid() >= self.total_due
    }

    pub fn has_payments(&self) -> bool {
        !self.paid_amount.is_zero()
    }

    /// not fully paid and the due date has passed
    pub fn is_past_due(&self, as_of: NaiveDate) -> bool {
        as_of > self.due_date && !self.is_settled()
    }

    /// status implied by the dues paid and `as_of`
    ///
    /// A partially paid entry stays `Partial` after its due date; use
    /// `is_past_due` to find partial arrears.
    pub fn evaluate_status(&self, as_of: NaiveDate) -> EntryStatus {
        if self.is_settled() {
            EntryStatus::Paid
        } else if self.dues_paid().is_positive() {
            EntryStatus::Partial
        } else if as_of > self.due_date {
            EntryStatus::Overdue
        } else {
            EntryStatus::Pending
        }
    }
}

/// status transition reported by a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub period_index: u32,
    pub old_status: EntryStatus,
    pub new_status: EntryStatus,
}

/// ordered payout schedule for one investment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub investment_date: NaiveDate,
    pub principal_amount: Money,
    pub payment_type: PaymentType,
    pub payment_frequency: PaymentFrequency,
    pub interest_rate: RateSpec,
    /// period count at generation, before any withdrawal recompute
    pub planned_periods: u32,
    pub entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// entry for a 1-based period index
    pub fn entry(&self, period_index: u32) -> Option<&ScheduleEntry> {
        let position = period_index.checked_sub(1)? as usize;
        self.entries.get(position).filter(|e| e.period_index == period_index)
    }

    pub fn entry_mut(&mut self, period_index: u32) -> Option<&mut ScheduleEntry> {
        let position = period_index.checked_sub(1)? as usize;
        self.entries.get_mut(position).filter(|e| e.period_index == period_index)
    }

    pub fn final_due_date(&self) -> Option<NaiveDate> {
        self.entries.last().map(|e| e.due_date)
    }

    pub fn total_interest_due(&self) -> Money {
        self.entries.iter().map(|e| e.interest_due).sum()
    }

    pub fn total_principal_due(&self) -> Money {
        self.entries.iter().map(|e| e.principal_due).sum()
    }

    pub fn total_due(&self) -> Money {
        self.entries.iter().map(|e| e.total_due).sum()
    }

    /// principal still scheduled after the given period has been paid out
    pub fn outstanding_principal_after(&self, period_index: u32) -> Money {
        let repaid: Money = self
            .entries
            .iter()
            .filter(|e| e.period_index <= period_index)
            .map(|e| e.principal_due)
            .sum();
        self.principal_amount - repaid
    }

    /// number of periods whose due date is on or before `as_of`
    pub fn elapsed_periods(&self, as_of: NaiveDate) -> u32 {
        self.entries.iter().filter(|e| e.due_date <= as_of).count() as u32
    }

    pub fn is_fully_paid(&self) -> bool {
        self.entries.iter().all(ScheduleEntry::is_settled)
    }

    /// re-evaluate every entry against `as_of`, returning the transitions
    pub fn refresh_statuses(&mut self, as_of: NaiveDate) -> Vec<StatusChange> {
        let mut changes = Vec::new();
        for entry in self.entries.iter_mut() {
            let new_status = entry.evaluate_status(as_of);
            if new_status != entry.status {
                changes.push(StatusChange {
                    period_index: entry.period_index,
                    old_status: entry.status,
                    new_status,
                });
                entry.status = new_status;
            }
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PlanDefinition;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_schedule() -> Schedule {
        let plan = PlanDefinition::interest_only(
            "Fixed",
            RateSpec::flat(dec!(2)),
            3,
            PaymentFrequency::Monthly,
            Money::ZERO,
            Money::from_major(1_000_000),
        )
        .unwrap();
        generate_schedule(&plan, Money::from_major(100_000), date(2024, 1, 15)).unwrap()
    }

    #[test]
    fn test_entry_lookup() {
        let schedule = sample_schedule();
        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule.entry(1).unwrap().due_date, date(2024, 2, 15));
        assert_eq!(schedule.entry(3).unwrap().due_date, date(2024, 4, 15));
        assert!(schedule.entry(0).is_none());
        assert!(schedule.entry(4).is_none());
        assert_eq!(schedule.final_due_date(), Some(date(2024, 4, 15)));
    }

    #[test]
    fn test_totals_and_balances() {
        let schedule = sample_schedule();
        assert_eq!(schedule.total_interest_due(), Money::from_major(6_000));
        assert_eq!(schedule.total_principal_due(), Money::from_major(100_000));
        assert_eq!(schedule.total_due(), Money::from_major(106_000));
        assert_eq!(schedule.outstanding_principal_after(2), Money::from_major(100_000));
        assert_eq!(schedule.outstanding_principal_after(3), Money::ZERO);
        assert_eq!(schedule.entry(3).unwrap().closing_balance, Money::ZERO);
    }

    #[test]
    fn test_elapsed_periods() {
        let schedule = sample_schedule();
        assert_eq!(schedule.elapsed_periods(date(2024, 1, 20)), 0);
        assert_eq!(schedule.elapsed_periods(date(2024, 2, 15)), 1);
        assert_eq!(schedule.elapsed_periods(date(2024, 3, 20)), 2);
        assert_eq!(schedule.elapsed_periods(date(2025, 1, 1)), 3);
    }

    #[test]
    fn test_status_evaluation() {
        let mut entry = ScheduleEntry::new(
            1,
            date(2024, 2, 15),
            Money::from_major(50_000),
            Money::from_major(1_000),
            Money::from_major(4_000),
        );
        assert_eq!(entry.total_due, Money::from_major(5_000));
        assert_eq!(entry.evaluate_status(date(2024, 2, 15)), EntryStatus::Pending);
        assert_eq!(entry.evaluate_status(date(2024, 2, 16)), EntryStatus::Overdue);

        entry.paid_amount = Money::from_major(3_000);
        assert_eq!(entry.evaluate_status(date(2024, 3, 1)), EntryStatus::Partial);
        assert!(entry.is_past_due(date(2024, 3, 1)));
        assert_eq!(entry.remaining_due(), Money::from_major(2_000));

        entry.paid_amount = Money::from_major(5_500);
        assert_eq!(entry.evaluate_status(date(2024, 3, 1)), EntryStatus::Paid);
        assert!(entry.is_overpaid());
        assert_eq!(entry.remaining_due(), Money::ZERO);
    }

    #[test]
    fn test_refresh_statuses_reports_transitions() {
        let mut schedule = sample_schedule();
        let changes = schedule.refresh_statuses(date(2024, 3, 1));
        assert_eq!(
            changes,
            vec![StatusChange {
                period_index: 1,
                old_status: EntryStatus::Pending,
                new_status: EntryStatus::Overdue,
            }]
        );

        // second refresh on the same day is a no-op
        assert!(schedule.refresh_statuses(date(2024, 3, 1)).is_empty());
        assert!(!schedule.is_fully_paid());
    }
}
