use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};
use crate::types::InterestMode;

/// per-period interest rate together with its compounding mode
///
/// The rate is always per payment period of the plan it belongs to: a
/// quarterly plan at 6% pays 6% per quarter. Nothing here converts between
/// frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSpec {
    pub rate_per_period: Rate,
    pub mode: InterestMode,
}

impl RateSpec {
    pub fn new(rate_per_period: Rate, mode: InterestMode) -> Self {
        Self { rate_per_period, mode }
    }

    /// flat rate from a percentage per period
    pub fn flat(percent_per_period: Decimal) -> Self {
        Self::new(Rate::from_percentage(percent_per_period), InterestMode::Flat)
    }

    /// reducing-balance rate from a percentage per period
    pub fn reducing(percent_per_period: Decimal) -> Self {
        Self::new(Rate::from_percentage(percent_per_period), InterestMode::Reducing)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rate_per_period.is_negative() {
            return Err(EngineError::InvalidRateInput {
                message: format!("rate per period {} is negative", self.rate_per_period),
            });
        }
        Ok(())
    }

    /// interest for one period
    pub fn period_interest(&self, outstanding_principal: Money, original_principal: Money) -> Result<Money> {
        period_interest(outstanding_principal, original_principal, self)
    }
}

/// interest due for one period, unrounded
///
/// Flat charges `original × rate` every period. Reducing charges
/// `outstanding × rate`, where `outstanding` is the balance left after the
/// previous period's principal reduction.
pub fn period_interest(
    outstanding_principal: Money,
    original_principal: Money,
    rate: &RateSpec,
) -> Result<Money> {
    rate.validate()?;

    if outstanding_principal.is_negative() || original_principal.is_negative() {
        return Err(EngineError::InvalidRateInput {
            message: format!(
                "principal must not be negative (outstanding {}, original {})",
                outstanding_principal, original_principal
            ),
        });
    }

    let base = match rate.mode {
        InterestMode::Flat => original_principal,
        InterestMode::Reducing => outstanding_principal,
    };

    base.checked_apply_rate(rate.rate_per_period)
        .ok_or_else(|| EngineError::InvalidRateInput {
            message: format!(
                "interest on {} at {} exceeds the largest supported amount {}",
                base, rate.rate_per_period, Money::MAX
            ),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_flat_uses_original_principal() {
        let rate = RateSpec::flat(dec!(2));
        let interest = rate
            .period_interest(Money::from_major(45_000), Money::from_major(50_000))
            .unwrap();
        assert_eq!(interest, Money::from_major(1_000));
    }

    #[test]
    fn test_reducing_uses_outstanding_principal() {
        let rate = RateSpec::reducing(dec!(2));
        let interest = rate
            .period_interest(Money::from_major(45_000), Money::from_major(50_000))
            .unwrap();
        assert_eq!(interest, Money::from_major(900));
    }

    #[test]
    fn test_fractional_rate_stays_unrounded() {
        let rate = RateSpec::flat(dec!(1.375));
        let interest = rate
            .period_interest(Money::from_decimal(dec!(12345.67)), Money::from_decimal(dec!(12345.67)))
            .unwrap();
        assert_eq!(interest, Money::from_decimal(dec!(169.75296250)));
    }

    #[test]
    fn test_zero_rate() {
        let rate = RateSpec::reducing(Decimal::ZERO);
        let interest = rate
            .period_interest(Money::from_major(10_000), Money::from_major(10_000))
            .unwrap();
        assert!(interest.is_zero());
    }

    #[test]
    fn test_rejects_negative_inputs() {
        let negative_rate = RateSpec::flat(dec!(-1));
        let err = negative_rate
            .period_interest(Money::from_major(100), Money::from_major(100))
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidRateInput");

        let rate = RateSpec::reducing(dec!(2));
        let err = period_interest(Money::from_major(-5), Money::from_major(100), &rate).unwrap_err();
        assert_eq!(err.kind(), "InvalidRateInput");

        let err = period_interest(Money::from_major(5), Money::from_major(-100), &rate).unwrap_err();
        assert_eq!(err.kind(), "InvalidRateInput");
    }

    #[test]
    fn test_oversized_interest_is_an_error() {
        let rate = RateSpec::reducing(dec!(1000000000000000));
        let err = rate.period_interest(Money::MAX, Money::MAX).unwrap_err();
        assert_eq!(err.kind(), "InvalidRateInput");

        let rate = RateSpec::flat(dec!(150));
        let err = rate.period_interest(Money::MAX, Money::MAX).unwrap_err();
        assert_eq!(err.kind(), "InvalidRateInput");
    }
}
