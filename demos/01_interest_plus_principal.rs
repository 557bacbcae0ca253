/// interest plus principal - amortizing schedule on a reducing balance
use investment_returns_rs::{generate_schedule, summarize, Money, PaymentFrequency, PlanDefinition, RateSpec};
use chrono::NaiveDate;
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== interest plus principal ===\n");

    // 2% a month on the outstanding balance, 10% of it repaid each month
    let plan = PlanDefinition::interest_plus_principal(
        "Amortizing 10",
        RateSpec::reducing(dec!(2)),
        10,
        PaymentFrequency::Monthly,
        Money::from_major(10_000),
        Money::from_major(1_000_000),
        dec!(10),
    )?;

    let principal = Money::from_major(50_000);
    let start = NaiveDate::from_ymd_opt(2024, 1, 31).ok_or("bad date")?;
    let schedule = generate_schedule(&plan, principal, start)?;

    println!("{:>3}  {:<10}  {:>10}  {:>10}  {:>10}  {:>10}", "#", "due", "opening", "interest", "principal", "closing");
    for entry in schedule.entries() {
        println!(
            "{:>3}  {:<10}  {:>10}  {:>10}  {:>10}  {:>10}",
            entry.period_index,
            entry.due_date,
            entry.opening_balance,
            entry.interest_due,
            entry.principal_due,
            entry.closing_balance
        );
    }

    let summary = summarize(&schedule, principal)?;
    println!("\ntotal interest:  {}", summary.total_interest);
    println!("total principal: {}", summary.total_principal_scheduled);
    println!("total returns:   {}", summary.total_returns);
    println!("effective rate:  {}%", summary.effective_rate_display());
    if let Some(annualized) = summary.annualized_rate {
        println!("annualized rate: {}%", annualized.round_dp(2));
    }

    Ok(())
}
