use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{EngineError, Result};

/// rounding applied when an amount is fixed onto a schedule entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RoundingMode {
    /// 0.005 -> 0.01
    #[default]
    HalfUp,
    /// banker's rounding, 0.005 -> 0.00, 0.015 -> 0.02
    HalfEven,
}

impl RoundingMode {
    pub fn strategy(&self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

/// engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// decimal places of the settlement currency (2 for INR)
    pub currency_decimal_places: u32,
    /// allowed difference between a payment and the sum of its breakdown
    pub breakdown_tolerance: Money,
    pub rounding: RoundingMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            currency_decimal_places: 2,
            breakdown_tolerance: Money::MINOR_UNIT,
            rounding: RoundingMode::HalfUp,
        }
    }
}

impl EngineConfig {
    /// parse a (possibly partial) JSON configuration, missing keys take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| EngineError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.currency_decimal_places > 8 {
            return Err(EngineError::InvalidConfiguration {
                message: format!(
                    "currency precision of {} places exceeds internal precision",
                    self.currency_decimal_places
                ),
            });
        }
        if self.breakdown_tolerance.is_negative() {
            return Err(EngineError::InvalidConfiguration {
                message: "breakdown tolerance must not be negative".to_string(),
            });
        }
        Ok(())
    }

    /// round an amount to currency precision
    pub fn round(&self, amount: Money) -> Money {
        amount.round_with(self.currency_decimal_places, self.rounding.strategy())
    }
}
