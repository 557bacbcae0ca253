use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use log::info;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::events::{Event, EventStore};
use crate::payments::{PaymentAllocator, PaymentApplication, PaymentBreakdown};
use crate::plan::PlanDefinition;
use crate::schedule::{Schedule, ScheduleGenerator, StatusChange, WithdrawalOutcome};
use crate::serialization::InvestmentView;
use crate::summary::{summarize, ReturnsSummary};
use crate::types::{InvestmentId, InvestmentStatus};

/// an approved investment with its payout schedule
#[derive(Debug, Clone)]
pub struct Investment {
    pub id: InvestmentId,
    pub investor_id: String,
    /// plan version the investment was opened under
    pub plan: PlanDefinition,
    pub principal_amount: Money,
    pub investment_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub status: InvestmentStatus,
    pub schedule: Schedule,
    pub events: EventStore,
    pub config: EngineConfig,
}

impl Investment {
    /// open an investment, generating its schedule
    ///
    /// `payout_dates` is only used by custom-frequency plans and must be
    /// empty otherwise.
    pub fn open(
        investor_id: &str,
        plan: PlanDefinition,
        principal_amount: Money,
        investment_date: NaiveDate,
        payout_dates: &[NaiveDate],
        time_provider: &SafeTimeProvider,
    ) -> Result<Self> {
        Self::open_with_config(
            EngineConfig::default(),
            investor_id,
            plan,
            principal_amount,
            investment_date,
            payout_dates,
            time_provider,
        )
    }

    pub fn open_with_config(
        config: EngineConfig,
        investor_id: &str,
        plan: PlanDefinition,
        principal_amount: Money,
        investment_date: NaiveDate,
        payout_dates: &[NaiveDate],
        time_provider: &SafeTimeProvider,
    ) -> Result<Self> {
        config.validate()?;

        let generator = ScheduleGenerator::with_config(config.clone());
        let schedule = generator.generate(&plan, principal_amount, investment_date, payout_dates)?;
        let maturity_date = schedule.final_due_date().ok_or_else(|| EngineError::InvalidState {
            current: "empty schedule".to_string(),
            expected: "at least one period".to_string(),
        })?;

        let id = Uuid::new_v4();
        let now = time_provider.now();
        let mut events = EventStore::new();

        events.emit(Event::InvestmentOpened {
            investment_id: id,
            investor_id: investor_id.to_string(),
            plan_id: plan.id,
            plan_version: plan.version,
            principal_amount,
            investment_date,
            timestamp: now,
        });
        events.emit(Event::ScheduleGenerated {
            investment_id: id,
            period_count: schedule.len() as u32,
            total_interest: schedule.total_interest_due(),
            maturity_date,
            timestamp: now,
        });

        info!(
            "investment {} opened for {}: {} under {} v{}, matures {}",
            id, investor_id, principal_amount, plan.name, plan.version, maturity_date
        );

        Ok(Self {
            id,
            investor_id: investor_id.to_string(),
            plan,
            principal_amount,
            investment_date,
            maturity_date,
            status: InvestmentStatus::Active,
            schedule,
            events,
            config,
        })
    }

    /// schedule and summary for a prospective investment, nothing is recorded
    pub fn preview(
        plan: &PlanDefinition,
        principal_amount: Money,
        investment_date: NaiveDate,
        payout_dates: &[NaiveDate],
    ) -> Result<(Schedule, ReturnsSummary)> {
        let schedule = ScheduleGenerator::new().generate(plan, principal_amount, investment_date, payout_dates)?;
        let summary = summarize(&schedule, principal_amount)?;
        Ok((schedule, summary))
    }

    pub fn summary(&self) -> Result<ReturnsSummary> {
        summarize(&self.schedule, self.principal_amount)
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn is_active(&self) -> bool {
        self.status == InvestmentStatus::Active
    }

    /// record a payout against one period
    ///
    /// The investment completes itself once every period is paid.
    pub fn record_payment(
        &mut self,
        period_index: u32,
        amount: Money,
        breakdown: Option<PaymentBreakdown>,
        time_provider: &SafeTimeProvider,
    ) -> Result<PaymentApplication> {
        self.ensure_active()?;

        let entry = self
            .schedule
            .entry_mut(period_index)
            .ok_or(EngineError::PeriodNotFound { period_index })?;

        let allocator = PaymentAllocator::with_config(self.config.clone());
        let application = allocator.apply_now(entry, amount, breakdown, time_provider)?;

        let now = time_provider.now();
        self.events.emit(Event::PaymentApplied {
            investment_id: self.id,
            period_index,
            amount,
            to_interest: application.to_interest,
            to_principal: application.to_principal,
            to_penalty: application.to_penalty,
            to_bonus: application.to_bonus,
            timestamp: now,
        });

        if application.excess.is_positive() {
            self.events.emit(Event::OverpaymentFlagged {
                investment_id: self.id,
                period_index,
                excess: application.excess,
                timestamp: now,
            });
        }

        if application.status_changed() {
            self.events.emit(Event::EntryStatusChanged {
                investment_id: self.id,
                period_index,
                old_status: application.previous_status,
                new_status: application.new_status,
                timestamp: now,
            });
        }

        if self.schedule.is_fully_paid() {
            self.transition(InvestmentStatus::Completed, "all periods paid", time_provider);
        }

        Ok(application)
    }

    /// re-evaluate entry statuses against the provider's date
    pub fn refresh_statuses(&mut self, time_provider: &SafeTimeProvider) -> Result<Vec<StatusChange>> {
        self.ensure_active()?;

        let now = time_provider.now();
        let changes = self.schedule.refresh_statuses(now.date_naive());
        for change in &changes {
            self.events.emit(Event::EntryStatusChanged {
                investment_id: self.id,
                period_index: change.period_index,
                old_status: change.old_status,
                new_status: change.new_status,
                timestamp: now,
            });
        }

        Ok(changes)
    }

    /// ask for principal back early on a flexible-withdrawal plan
    ///
    /// Elapsed periods are those due on or before the provider's date.
    pub fn request_withdrawal(&mut self, time_provider: &SafeTimeProvider) -> Result<WithdrawalOutcome> {
        self.ensure_active()?;

        let now = time_provider.now();
        let after_period = self.schedule.elapsed_periods(now.date_naive());

        let generator = ScheduleGenerator::with_config(self.config.clone());
        let outcome = generator.recompute_for_withdrawal(&mut self.schedule, &self.plan, after_period)?;
        self.maturity_date = outcome.final_due_date;

        self.events.emit(Event::WithdrawalRequested {
            investment_id: self.id,
            after_period,
            settled_principal: outcome.settled_principal,
            settlement_periods: outcome.settlement_periods,
            final_due_date: outcome.final_due_date,
            timestamp: now,
        });

        Ok(outcome)
    }

    /// mark a fully paid investment as completed
    pub fn complete(&mut self, time_provider: &SafeTimeProvider) -> Result<()> {
        self.ensure_active()?;

        if !self.schedule.is_fully_paid() {
            let unpaid = self.schedule.entries().iter().filter(|e| e.remaining_due().is_positive()).count();
            return Err(EngineError::InvalidState {
                current: format!("{} periods unpaid", unpaid),
                expected: "all periods paid".to_string(),
            });
        }

        self.transition(InvestmentStatus::Completed, "all periods paid", time_provider);
        Ok(())
    }

    pub fn mark_defaulted(&mut self, reason: &str, time_provider: &SafeTimeProvider) -> Result<()> {
        self.ensure_active()?;
        self.transition(InvestmentStatus::Defaulted, reason, time_provider);
        Ok(())
    }

    /// close an active or defaulted investment
    pub fn close(&mut self, reason: &str, time_provider: &SafeTimeProvider) -> Result<()> {
        match self.status {
            InvestmentStatus::Active | InvestmentStatus::Defaulted => {
                self.transition(InvestmentStatus::Closed, reason, time_provider);
                Ok(())
            }
            status => Err(EngineError::InvalidState {
                current: format!("{:?}", status),
                expected: "Active or Defaulted".to_string(),
            }),
        }
    }

    /// get events
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    /// pretty JSON view of the investment, schedule and summary
    pub fn json(&self) -> String {
        match InvestmentView::from_investment(self) {
            Ok(view) => view.to_json_pretty().unwrap_or_else(|e| format!("JSON error: {}", e)),
            Err(e) => format!("view error: {}", e),
        }
    }

    fn ensure_active(&self) -> Result<()> {
        if !self.is_active() {
            return Err(EngineError::InvestmentNotActive { status: self.status });
        }
        Ok(())
    }

    fn transition(&mut self, new_status: InvestmentStatus, reason: &str, time_provider: &SafeTimeProvider) {
        let old_status = self.status;
        self.status = new_status;

        info!("investment {}: {:?} -> {:?} ({})", self.id, old_status, new_status, reason);

        self.events.emit(Event::InvestmentStatusChanged {
            investment_id: self.id,
            old_status,
            new_status,
            reason: reason.to_string(),
            timestamp: time_provider.now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interest::RateSpec;
    use crate::types::{EntryStatus, PaymentFrequency};
    use chrono::{Duration, TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn clock(y: i32, m: u32, d: u32) -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()))
    }

    fn fixed_plan(tenure: u32) -> PlanDefinition {
        PlanDefinition::interest_only(
            "Fixed Income",
            RateSpec::flat(dec!(2)),
            tenure,
            PaymentFrequency::Monthly,
            Money::from_major(10_000),
            Money::from_major(5_000_000),
        )
        .unwrap()
    }

    fn flexible_plan() -> PlanDefinition {
        PlanDefinition::flexible_withdrawal(
            "Flexi Income",
            RateSpec::reducing(dec!(1.5)),
            12,
            PaymentFrequency::Monthly,
            Money::from_major(10_000),
            Money::from_major(5_000_000),
            dec!(50),
            3,
        )
        .unwrap()
    }

    #[test]
    fn test_open_emits_events() {
        let time = clock(2024, 1, 15);
        let mut investment =
            Investment::open("INV-001", fixed_plan(12), Money::from_major(100_000), date(2024, 1, 15), &[], &time)
                .unwrap();

        assert!(investment.is_active());
        assert_eq!(investment.maturity_date, date(2025, 1, 15));
        assert_eq!(investment.schedule().len(), 12);

        let events = investment.take_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::InvestmentOpened { .. }));
        assert!(matches!(events[1], Event::ScheduleGenerated { period_count: 12, .. }));
    }

    #[test]
    fn test_open_rejects_principal_below_minimum() {
        let time = clock(2024, 1, 15);
        let plan = PlanDefinition::interest_only(
            "Premium",
            RateSpec::flat(dec!(2)),
            12,
            PaymentFrequency::Monthly,
            Money::from_major(20_000),
            Money::from_major(5_000_000),
        )
        .unwrap();

        let err = Investment::open("INV-002", plan, Money::from_major(10_000), date(2024, 1, 15), &[], &time)
            .unwrap_err();
        assert_eq!(err.kind(), "PrincipalOutOfRange");
    }

    #[test]
    fn test_preview_matches_open() {
        let time = clock(2024, 1, 15);
        let plan = fixed_plan(12);
        let (schedule, summary) = Investment::preview(&plan, Money::from_major(100_000), date(2024, 1, 15), &[]).unwrap();
        let investment =
            Investment::open("INV-003", plan, Money::from_major(100_000), date(2024, 1, 15), &[], &time).unwrap();

        assert_eq!(&schedule, investment.schedule());
        assert_eq!(summary, investment.summary().unwrap());
        assert_eq!(summary.total_returns, Money::from_major(124_000));
    }

    #[test]
    fn test_record_payment_events() {
        let time = clock(2024, 2, 15);
        let mut investment =
            Investment::open("INV-004", fixed_plan(12), Money::from_major(100_000), date(2024, 1, 15), &[], &time)
                .unwrap();
        investment.take_events();

        let application = investment
            .record_payment(1, Money::from_major(2_300), None, &time)
            .unwrap();
        assert_eq!(application.new_status, EntryStatus::Paid);
        assert_eq!(application.excess, Money::from_major(300));

        let events = investment.take_events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], Event::PaymentApplied { period_index: 1, .. }));
        assert!(matches!(events[1], Event::OverpaymentFlagged { period_index: 1, .. }));
        assert!(matches!(
            events[2],
            Event::EntryStatusChanged {
                old_status: EntryStatus::Pending,
                new_status: EntryStatus::Paid,
                ..
            }
        ));

        let summary = investment.summary().unwrap();
        assert_eq!(summary.overpaid_amount, Money::from_major(300));
        assert_eq!(summary.paid_periods, 1);
    }

    #[test]
    fn test_unknown_period() {
        let time = clock(2024, 2, 15);
        let mut investment =
            Investment::open("INV-005", fixed_plan(12), Money::from_major(100_000), date(2024, 1, 15), &[], &time)
                .unwrap();

        let err = investment
            .record_payment(13, Money::from_major(2_000), None, &time)
            .unwrap_err();
        assert_eq!(err, EngineError::PeriodNotFound { period_index: 13 });
    }

    #[test]
    fn test_paying_every_period_completes() {
        let time = clock(2024, 2, 15);
        let mut investment =
            Investment::open("INV-006", fixed_plan(3), Money::from_major(50_000), date(2024, 1, 15), &[], &time)
                .unwrap();

        investment.record_payment(1, Money::from_major(1_000), None, &time).unwrap();
        investment.record_payment(2, Money::from_major(1_000), None, &time).unwrap();
        assert!(investment.is_active());
        investment.record_payment(3, Money::from_major(51_000), None, &time).unwrap();

        assert_eq!(investment.status, InvestmentStatus::Completed);
        assert!(investment.summary().unwrap().is_settled());

        let err = investment
            .record_payment(3, Money::from_major(10), None, &time)
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvestmentNotActive {
                status: InvestmentStatus::Completed
            }
        );
    }

    #[test]
    fn test_refresh_flags_overdue_periods() {
        let time = clock(2024, 1, 15);
        let control = time.test_control().unwrap();
        let mut investment =
            Investment::open("INV-007", fixed_plan(12), Money::from_major(100_000), date(2024, 1, 15), &[], &time)
                .unwrap();
        investment.take_events();

        assert!(investment.refresh_statuses(&time).unwrap().is_empty());

        control.advance(Duration::days(50));
        let changes = investment.refresh_statuses(&time).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].new_status, EntryStatus::Overdue);
        assert_eq!(investment.take_events().len(), 1);
    }

    #[test]
    fn test_withdrawal_uses_elapsed_periods() {
        let time = clock(2024, 1, 1);
        let control = time.test_control().unwrap();
        let mut investment =
            Investment::open("INV-008", flexible_plan(), Money::from_major(60_000), date(2024, 1, 1), &[], &time)
                .unwrap();

        // five periods due by 2024-06-10
        control.advance(Duration::days(161));
        let err = investment.request_withdrawal(&time).unwrap_err();
        assert_eq!(err.kind(), "WithdrawalNotPermitted");

        control.advance(Duration::days(30));
        let outcome = investment.request_withdrawal(&time).unwrap();
        assert_eq!(outcome.after_period, 6);
        assert_eq!(outcome.settlement_periods, 3);
        assert_eq!(investment.maturity_date, date(2024, 10, 1));
        assert_eq!(investment.schedule().len(), 9);
        assert_eq!(investment.schedule().total_principal_due(), Money::from_major(60_000));
        assert!(investment
            .take_events()
            .iter()
            .any(|e| matches!(e, Event::WithdrawalRequested { after_period: 6, .. })));
    }

    #[test]
    fn test_complete_requires_all_paid() {
        let time = clock(2024, 2, 15);
        let mut investment =
            Investment::open("INV-009", fixed_plan(3), Money::from_major(50_000), date(2024, 1, 15), &[], &time)
                .unwrap();
        let err = investment.complete(&time).unwrap_err();
        assert_eq!(err.kind(), "InvalidState");
    }

    #[test]
    fn test_default_then_close() {
        let time = clock(2024, 5, 1);
        let mut investment =
            Investment::open("INV-010", fixed_plan(12), Money::from_major(100_000), date(2024, 1, 15), &[], &time)
                .unwrap();
        investment.take_events();

        investment.mark_defaulted("payouts suspended", &time).unwrap();
        assert_eq!(investment.status, InvestmentStatus::Defaulted);

        let err = investment.mark_defaulted("again", &time).unwrap_err();
        assert_eq!(err.kind(), "InvestmentNotActive");

        investment.close("written off", &time).unwrap();
        assert_eq!(investment.status, InvestmentStatus::Closed);

        let err = investment.close("again", &time).unwrap_err();
        assert_eq!(err.kind(), "InvalidState");

        let events = investment.take_events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| matches!(e, Event::InvestmentStatusChanged { .. })));
    }

    #[test]
    fn test_json_view() {
        let time = clock(2024, 1, 15);
        let investment =
            Investment::open("INV-011", fixed_plan(3), Money::from_major(100_000), date(2024, 1, 15), &[], &time)
                .unwrap();

        let json = investment.json();
        assert!(json.contains("\"investor_id\": \"INV-011\""));
        assert!(json.contains("\"period_index\": 3"));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let total_returns: rust_decimal::Decimal =
            value["summary"]["total_returns"].as_str().unwrap().parse().unwrap();
        assert_eq!(total_returns, dec!(106000));
    }
}
