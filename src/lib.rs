pub mod calendar;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod interest;
pub mod investment;
pub mod payments;
pub mod plan;
pub mod schedule;
pub mod serialization;
pub mod summary;
pub mod types;

// re-export key types
pub use config::{EngineConfig, RoundingMode};
pub use decimal::{Money, Rate};
pub use errors::{EngineError, Result};
pub use events::{Event, EventStore};
pub use interest::{period_interest, RateSpec};
pub use investment::Investment;
pub use payments::{apply_payment, PaymentAllocator, PaymentApplication, PaymentBreakdown};
pub use plan::{PlanBuilder, PlanDefinition, PrincipalRepaymentOption, RepaymentTerms};
pub use schedule::{
    generate_schedule, generate_schedule_with_dates, request_withdrawal, Schedule, ScheduleEntry,
    ScheduleGenerator, StatusChange, WithdrawalOutcome,
};
pub use serialization::InvestmentView;
pub use summary::{summarize, ReturnsSummary};
pub use types::{
    AmortizationBasis, EntryStatus, InterestMode, InvestmentId, InvestmentStatus, PaymentFrequency,
    PaymentType, PlanId,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
