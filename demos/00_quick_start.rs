/// quick start - preview returns, open an investment and record a payout
use investment_returns_rs::{
    Investment, Money, PaymentFrequency, PlanDefinition, RateSpec, SafeTimeProvider, TimeSource,
};
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 2% a month, interest only, principal back after 12 months
    let plan = PlanDefinition::interest_only(
        "Fixed Income 12",
        RateSpec::flat(dec!(2)),
        12,
        PaymentFrequency::Monthly,
        Money::from_major(10_000),
        Money::from_major(5_000_000),
    )?;

    let start = NaiveDate::from_ymd_opt(2024, 1, 15).ok_or("bad date")?;
    let principal = Money::from_major(100_000);

    // preview before committing
    let (_, summary) = Investment::preview(&plan, principal, start, &[])?;
    println!("total interest: {}", summary.total_interest);
    println!("total returns:  {}", summary.total_returns);
    println!("effective rate: {}%", summary.effective_rate_display());

    // open and pay the first period
    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 2, 15, 9, 0, 0).unwrap()));
    let mut investment = Investment::open("INV-001", plan, principal, start, &[], &time)?;
    investment.record_payment(1, Money::from_major(2_000), None, &time)?;

    println!("{}", investment.json());

    Ok(())
}
