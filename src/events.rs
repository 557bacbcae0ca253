use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{EntryStatus, InvestmentId, InvestmentStatus, PlanId};

/// all events that can be emitted by an investment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    InvestmentOpened {
        investment_id: InvestmentId,
        investor_id: String,
        plan_id: PlanId,
        plan_version: u32,
        principal_amount: Money,
        investment_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    ScheduleGenerated {
        investment_id: InvestmentId,
        period_count: u32,
        total_interest: Money,
        maturity_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    InvestmentStatusChanged {
        investment_id: InvestmentId,
        old_status: InvestmentStatus,
        new_status: InvestmentStatus,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    // payment events
    PaymentApplied {
        investment_id: InvestmentId,
        period_index: u32,
        amount: Money,
        to_interest: Money,
        to_principal: Money,
        to_penalty: Money,
        to_bonus: Money,
        timestamp: DateTime<Utc>,
    },
    OverpaymentFlagged {
        investment_id: InvestmentId,
        period_index: u32,
        excess: Money,
        timestamp: DateTime<Utc>,
    },
    EntryStatusChanged {
        investment_id: InvestmentId,
        period_index: u32,
        old_status: EntryStatus,
        new_status: EntryStatus,
        timestamp: DateTime<Utc>,
    },

    // principal events
    WithdrawalRequested {
        investment_id: InvestmentId,
        after_period: u32,
        settled_principal: Money,
        settlement_periods: u32,
        final_due_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_take_events_drains_store() {
        let mut store = EventStore::new();
        let investment_id = Uuid::new_v4();
        store.emit(Event::OverpaymentFlagged {
            investment_id,
            period_index: 3,
            excess: Money::from_major(250),
            timestamp: Utc::now(),
        });
        assert_eq!(store.len(), 1);

        let taken = store.take_events();
        assert_eq!(taken.len(), 1);
        assert!(store.is_empty());
        assert!(matches!(taken[0], Event::OverpaymentFlagged { period_index: 3, .. }));
    }
}
