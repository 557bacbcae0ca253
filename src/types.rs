use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a plan (shared by all versions of the plan)
pub type PlanId = Uuid;

/// unique identifier for an investment
pub type InvestmentId = Uuid;

/// how interest is computed each period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterestMode {
    /// interest on the original principal every period
    Flat,
    /// interest on the outstanding balance before the period's principal reduction
    Reducing,
}

/// what the investor receives each period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    /// interest every period, principal returned at the end
    InterestOnly,
    /// interest plus a share of principal every period
    InterestPlusPrincipal,
}

/// payout frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentFrequency {
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
    /// caller supplies the payout dates
    Custom,
}

impl PaymentFrequency {
    /// months per period, None for custom schedules
    pub fn months_per_period(&self) -> Option<u32> {
        match self {
            PaymentFrequency::Monthly => Some(1),
            PaymentFrequency::Quarterly => Some(3),
            PaymentFrequency::HalfYearly => Some(6),
            PaymentFrequency::Yearly => Some(12),
            PaymentFrequency::Custom => None,
        }
    }
}

/// principal basis for interest-plus-principal amortization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AmortizationBasis {
    /// percentage applied to the balance outstanding at the start of each period
    #[default]
    OutstandingBalance,
    /// percentage applied to the original principal (straight line)
    OriginalPrincipal,
}

/// status of a single schedule entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryStatus {
    Pending,
    Partial,
    Paid,
    Overdue,
}

/// investment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvestmentStatus {
    /// schedule running
    Active,
    /// every entry paid
    Completed,
    /// investor payouts defaulted
    Defaulted,
    /// closed early by the back office
    Closed,
}
