use thiserror::Error;

use crate::decimal::Money;
use crate::types::InvestmentStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid rate input: {message}")]
    InvalidRateInput {
        message: String,
    },

    #[error("principal {amount} outside plan bounds [{min}, {max}]")]
    PrincipalOutOfRange {
        amount: Money,
        min: Money,
        max: Money,
    },

    #[error("invalid tenure of {tenure_months} months: {message}")]
    InvalidTenure {
        tenure_months: u32,
        message: String,
    },

    #[error("custom payment frequency requires explicit payout dates")]
    MissingCustomDates,

    #[error("payment breakdown totals {breakdown_total} but payment amount is {amount}")]
    BreakdownMismatch {
        amount: Money,
        breakdown_total: Money,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("withdrawal not permitted: {message}")]
    WithdrawalNotPermitted {
        message: String,
    },

    #[error("no schedule entry for period {period_index}")]
    PeriodNotFound {
        period_index: u32,
    },

    #[error("investment not active: current status is {status:?}")]
    InvestmentNotActive {
        status: InvestmentStatus,
    },

    #[error("invalid state: current {current}, expected {expected}")]
    InvalidState {
        current: String,
        expected: String,
    },
}

impl EngineError {
    /// stable name of the error kind, for callers mapping errors to messages
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidRateInput { .. } => "InvalidRateInput",
            EngineError::PrincipalOutOfRange { .. } => "PrincipalOutOfRange",
            EngineError::InvalidTenure { .. } => "InvalidTenure",
            EngineError::MissingCustomDates => "MissingCustomDates",
            EngineError::BreakdownMismatch { .. } => "BreakdownMismatch",
            EngineError::InvalidConfiguration { .. } => "InvalidConfiguration",
            EngineError::InvalidPaymentAmount { .. } => "InvalidPaymentAmount",
            EngineError::InvalidDate { .. } => "InvalidDate",
            EngineError::WithdrawalNotPermitted { .. } => "WithdrawalNotPermitted",
            EngineError::PeriodNotFound { .. } => "PeriodNotFound",
            EngineError::InvestmentNotActive { .. } => "InvestmentNotActive",
            EngineError::InvalidState { .. } => "InvalidState",
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_detail() {
        let err = EngineError::PrincipalOutOfRange {
            amount: Money::from_major(10_000),
            min: Money::from_major(20_000),
            max: Money::from_major(500_000),
        };
        assert_eq!(err.kind(), "PrincipalOutOfRange");
        assert_eq!(err.to_string(), "principal 10000 outside plan bounds [20000, 500000]");

        let err = EngineError::BreakdownMismatch {
            amount: Money::from_major(3_000),
            breakdown_total: Money::from_major(2_500),
        };
        assert_eq!(err.kind(), "BreakdownMismatch");
        assert!(err.to_string().contains("2500"));
    }
}
