use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::interest::RateSpec;
use crate::types::{AmortizationBasis, PaymentFrequency, PaymentType, PlanId};

/// how principal comes back on an interest-only plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrincipalRepaymentOption {
    /// principal returned in full on the last period
    FixedTenure,
    /// investor may ask for principal early once enough of the tenure has elapsed
    FlexibleWithdrawal {
        /// share of tenure (0-100) that must elapse before a request is accepted
        withdrawal_after_percent_of_tenure: Decimal,
        /// months over which the principal is paid back after a request
        principal_settlement_term_months: u32,
    },
}

/// type-specific repayment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepaymentTerms {
    InterestOnly {
        principal_repayment: PrincipalRepaymentOption,
    },
    InterestPlusPrincipal {
        /// share of principal (0-100) amortized each period
        principal_repayment_percent_per_period: Decimal,
        basis: AmortizationBasis,
    },
}

impl RepaymentTerms {
    pub fn payment_type(&self) -> PaymentType {
        match self {
            RepaymentTerms::InterestOnly { .. } => PaymentType::InterestOnly,
            RepaymentTerms::InterestPlusPrincipal { .. } => PaymentType::InterestPlusPrincipal,
        }
    }
}

/// immutable lending plan, validated on construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDefinition {
    pub id: PlanId,
    pub name: String,
    pub version: u32,
    pub interest_rate: RateSpec,
    pub tenure_months: u32,
    pub payment_frequency: PaymentFrequency,
    pub min_investment: Money,
    pub max_investment: Money,
    pub repayment_terms: RepaymentTerms,
}

impl PlanDefinition {
    pub fn builder() -> PlanBuilder {
        PlanBuilder::new()
    }

    /// interest-only plan returning principal at maturity
    pub fn interest_only(
        name: &str,
        interest_rate: RateSpec,
        tenure_months: u32,
        payment_frequency: PaymentFrequency,
        min_investment: Money,
        max_investment: Money,
    ) -> Result<Self> {
        PlanBuilder::new()
            .name(name)
            .interest_rate(interest_rate)
            .tenure_months(tenure_months)
            .payment_frequency(payment_frequency)
            .investment_bounds(min_investment, max_investment)
            .fixed_tenure()
            .build()
    }

    /// interest-only plan with early principal withdrawal
    pub fn flexible_withdrawal(
        name: &str,
        interest_rate: RateSpec,
        tenure_months: u32,
        payment_frequency: PaymentFrequency,
        min_investment: Money,
        max_investment: Money,
        withdrawal_after_percent_of_tenure: Decimal,
        principal_settlement_term_months: u32,
    ) -> Result<Self> {
        PlanBuilder::new()
            .name(name)
            .interest_rate(interest_rate)
            .tenure_months(tenure_months)
            .payment_frequency(payment_frequency)
            .investment_bounds(min_investment, max_investment)
            .flexible_withdrawal(withdrawal_after_percent_of_tenure, principal_settlement_term_months)
            .build()
    }

    /// interest-plus-principal plan amortizing a share of principal each period
    pub fn interest_plus_principal(
        name: &str,
        interest_rate: RateSpec,
        tenure_months: u32,
        payment_frequency: PaymentFrequency,
        min_investment: Money,
        max_investment: Money,
        principal_repayment_percent_per_period: Decimal,
    ) -> Result<Self> {
        PlanBuilder::new()
            .name(name)
            .interest_rate(interest_rate)
            .tenure_months(tenure_months)
            .payment_frequency(payment_frequency)
            .investment_bounds(min_investment, max_investment)
            .principal_repayment_percent(principal_repayment_percent_per_period)
            .build()
    }

    pub fn payment_type(&self) -> PaymentType {
        self.repayment_terms.payment_type()
    }

    /// number of periods for regular frequencies, None for custom
    pub fn period_count(&self) -> Option<u32> {
        self.payment_frequency
            .months_per_period()
            .map(|months| self.tenure_months / months)
    }

    /// check bounds, tenure and percentages
    pub fn validate(&self) -> Result<()> {
        self.interest_rate.validate()?;

        if self.tenure_months < 1 {
            return Err(EngineError::InvalidTenure {
                tenure_months: self.tenure_months,
                message: "tenure must be at least one month".to_string(),
            });
        }

        if let Some(months) = self.payment_frequency.months_per_period() {
            if self.tenure_months % months != 0 {
                return Err(EngineError::InvalidTenure {
                    tenure_months: self.tenure_months,
                    message: format!(
                        "tenure is not a whole number of {:?} periods",
                        self.payment_frequency
                    ),
                });
            }
        }

        if self.min_investment.is_negative() || self.max_investment.is_negative() {
            return Err(EngineError::InvalidConfiguration {
                message: "investment bounds must not be negative".to_string(),
            });
        }

        if self.max_investment > Money::MAX {
            return Err(EngineError::InvalidConfiguration {
                message: format!(
                    "maximum investment {} exceeds the largest supported amount {}",
                    self.max_investment,
                    Money::MAX
                ),
            });
        }

        if self.min_investment > self.max_investment {
            return Err(EngineError::InvalidConfiguration {
                message: format!(
                    "minimum investment {} exceeds maximum {}",
                    self.min_investment, self.max_investment
                ),
            });
        }

        match self.repayment_terms {
            RepaymentTerms::InterestOnly {
                principal_repayment: PrincipalRepaymentOption::FixedTenure,
            } => {}
            RepaymentTerms::InterestOnly {
                principal_repayment:
                    PrincipalRepaymentOption::FlexibleWithdrawal {
                        withdrawal_after_percent_of_tenure,
                        principal_settlement_term_months,
                    },
            } => {
                check_percentage("withdrawal_after_percent_of_tenure", withdrawal_after_percent_of_tenure)?;
                if principal_settlement_term_months < 1 {
                    return Err(EngineError::InvalidConfiguration {
                        message: "principal settlement term must be at least one month".to_string(),
                    });
                }
            }
            RepaymentTerms::InterestPlusPrincipal {
                principal_repayment_percent_per_period,
                ..
            } => {
                check_percentage(
                    "principal_repayment_percent_per_period",
                    principal_repayment_percent_per_period,
                )?;
            }
        }

        Ok(())
    }

    /// check that a principal amount fits the plan bounds
    pub fn check_principal(&self, principal_amount: Money) -> Result<()> {
        if !principal_amount.is_positive()
            || principal_amount < self.min_investment
            || principal_amount > self.max_investment
        {
            return Err(EngineError::PrincipalOutOfRange {
                amount: principal_amount,
                min: self.min_investment,
                max: self.max_investment,
            });
        }
        Ok(())
    }

    /// new version of this plan; existing investments keep the old one
    pub fn revise<F>(&self, change: F) -> Result<PlanDefinition>
    where
        F: FnOnce(PlanBuilder) -> PlanBuilder,
    {
        let builder = PlanBuilder::from_plan(self).version(self.version + 1);
        change(builder).build()
    }
}

fn check_percentage(field: &str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(EngineError::InvalidConfiguration {
            message: format!("{} must be within 0-100, got {}", field, value),
        });
    }
    Ok(())
}

/// builder for plan definitions
#[derive(Debug, Clone, Default)]
pub struct PlanBuilder {
    id: Option<PlanId>,
    name: Option<String>,
    version: Option<u32>,
    interest_rate: Option<RateSpec>,
    tenure_months: Option<u32>,
    payment_frequency: Option<PaymentFrequency>,
    min_investment: Option<Money>,
    max_investment: Option<Money>,
    repayment_terms: Option<RepaymentTerms>,
    amortization_basis: Option<AmortizationBasis>,
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_plan(plan: &PlanDefinition) -> Self {
        Self {
            id: Some(plan.id),
            name: Some(plan.name.clone()),
            version: Some(plan.version),
            interest_rate: Some(plan.interest_rate),
            tenure_months: Some(plan.tenure_months),
            payment_frequency: Some(plan.payment_frequency),
            min_investment: Some(plan.min_investment),
            max_investment: Some(plan.max_investment),
            repayment_terms: Some(plan.repayment_terms),
            amortization_basis: match plan.repayment_terms {
                RepaymentTerms::InterestPlusPrincipal { basis, .. } => Some(basis),
                RepaymentTerms::InterestOnly { .. } => None,
            },
        }
    }

    pub fn id(mut self, id: PlanId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    pub fn interest_rate(mut self, rate: RateSpec) -> Self {
        self.interest_rate = Some(rate);
        self
    }

    pub fn tenure_months(mut self, months: u32) -> Self {
        self.tenure_months = Some(months);
        self
    }

    pub fn payment_frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.payment_frequency = Some(frequency);
        self
    }

    pub fn investment_bounds(mut self, min: Money, max: Money) -> Self {
        self.min_investment = Some(min);
        self.max_investment = Some(max);
        self
    }

    pub fn fixed_tenure(mut self) -> Self {
        self.repayment_terms = Some(RepaymentTerms::InterestOnly {
            principal_repayment: PrincipalRepaymentOption::FixedTenure,
        });
        self
    }

    pub fn flexible_withdrawal(mut self, after_percent_of_tenure: Decimal, settlement_term_months: u32) -> Self {
        self.repayment_terms = Some(RepaymentTerms::InterestOnly {
            principal_repayment: PrincipalRepaymentOption::FlexibleWithdrawal {
                withdrawal_after_percent_of_tenure: after_percent_of_tenure,
                principal_settlement_term_months: settlement_term_months,
            },
        });
        self
    }

    pub fn principal_repayment_percent(mut self, percent_per_period: Decimal) -> Self {
        self.repayment_terms = Some(RepaymentTerms::InterestPlusPrincipal {
            principal_repayment_percent_per_period: percent_per_period,
            basis: self.amortization_basis.unwrap_or_default(),
        });
        self
    }

    /// principal basis for interest-plus-principal terms, in either call order
    pub fn amortization_basis(mut self, basis: AmortizationBasis) -> Self {
        self.amortization_basis = Some(basis);
        if let Some(RepaymentTerms::InterestPlusPrincipal { basis: current, .. }) = self.repayment_terms.as_mut() {
            *current = basis;
        }
        self
    }

    pub fn build(self) -> Result<PlanDefinition> {
        let interest_rate = self.interest_rate.ok_or_else(|| missing("interest_rate"))?;
        let tenure_months = self.tenure_months.ok_or_else(|| missing("tenure_months"))?;
        let repayment_terms = self.repayment_terms.ok_or_else(|| missing("repayment_terms"))?;

        let plan = PlanDefinition {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            name: self.name.unwrap_or_default(),
            version: self.version.unwrap_or(1),
            interest_rate,
            tenure_months,
            payment_frequency: self.payment_frequency.unwrap_or(PaymentFrequency::Monthly),
            min_investment: self.min_investment.unwrap_or(Money::ZERO),
            max_investment: self.max_investment.unwrap_or(Money::MAX),
            repayment_terms,
        };

        plan.validate()?;
        Ok(plan)
    }
}

fn missing(field: &str) -> EngineError {
    EngineError::InvalidConfiguration {
        message: format!("plan is missing {}", field),
    }
}
