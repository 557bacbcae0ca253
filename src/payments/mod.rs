pub mod allocator;

use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::types::EntryStatus;

pub use allocator::{apply_payment, PaymentAllocator};

/// caller-specified split of a payment across components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaymentBreakdown {
    pub interest: Money,
    pub principal: Money,
    pub penalty: Money,
    pub bonus: Money,
}

impl PaymentBreakdown {
    pub fn new(interest: Money, principal: Money, penalty: Money, bonus: Money) -> Self {
        Self {
            interest,
            principal,
            penalty,
            bonus,
        }
    }

    /// interest and principal only
    pub fn interest_and_principal(interest: Money, principal: Money) -> Self {
        Self::new(interest, principal, Money::ZERO, Money::ZERO)
    }

    pub fn total(&self) -> Money {
        self.interest + self.principal + self.penalty + self.bonus
    }

    /// every component must be zero or positive
    pub fn validate(&self) -> Result<()> {
        for component in [self.interest, self.principal, self.penalty, self.bonus] {
            if component.is_negative() {
                return Err(EngineError::InvalidPaymentAmount { amount: component });
            }
        }
        Ok(())
    }
}

/// how one payment landed on a schedule entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentApplication {
    pub period_index: u32,
    pub amount: Money,
    pub to_interest: Money,
    pub to_principal: Money,
    pub to_penalty: Money,
    pub to_bonus: Money,
    /// part of this payment beyond the entry's total due
    pub excess: Money,
    pub previous_status: EntryStatus,
    pub new_status: EntryStatus,
    /// entry holds more than its total due after this payment
    pub overpaid: bool,
}

impl PaymentApplication {
    pub fn status_changed(&self) -> bool {
        self.previous_status != self.new_status
    }

    pub fn total_allocated(&self) -> Money {
        self.to_interest + self.to_principal + self.to_penalty + self.to_bonus
    }
}
