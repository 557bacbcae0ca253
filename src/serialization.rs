/// serialization support for investments
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::investment::Investment;
use crate::schedule::ScheduleEntry;
use crate::summary::{summarize, ReturnsSummary};
use crate::types::{InterestMode, InvestmentId, InvestmentStatus, PaymentFrequency, PaymentType, PlanId};

/// serializable view of an investment and its schedule
#[derive(Debug, Serialize, Deserialize)]
pub struct InvestmentView {
    pub id: InvestmentId,
    pub investor_id: String,
    pub status: InvestmentStatus,
    pub principal_amount: Money,
    pub investment_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub plan: PlanView,
    pub summary: ReturnsSummary,
    pub entries: Vec<ScheduleEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlanView {
    pub id: PlanId,
    pub name: String,
    pub version: u32,
    pub rate_per_period: Rate,
    pub interest_mode: InterestMode,
    pub payment_type: PaymentType,
    pub payment_frequency: PaymentFrequency,
    pub tenure_months: u32,
}

impl InvestmentView {
    pub fn from_investment(investment: &Investment) -> Result<Self> {
        let plan = &investment.plan;
        Ok(InvestmentView {
            id: investment.id,
            investor_id: investment.investor_id.clone(),
            status: investment.status,
            principal_amount: investment.principal_amount,
            investment_date: investment.investment_date,
            maturity_date: investment.maturity_date,
            plan: PlanView {
                id: plan.id,
                name: plan.name.clone(),
                version: plan.version,
                rate_per_period: plan.interest_rate.rate_per_period,
                interest_mode: plan.interest_rate.mode,
                payment_type: plan.payment_type(),
                payment_frequency: plan.payment_frequency,
                tenure_months: plan.tenure_months,
            },
            summary: summarize(&investment.schedule, investment.principal_amount)?,
            entries: investment.schedule.entries().to_vec(),
        })
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
