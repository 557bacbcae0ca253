/// flexible withdrawal - early principal request with controlled time
use investment_returns_rs::{
    Investment, Money, PaymentFrequency, PlanDefinition, RateSpec, SafeTimeProvider, TimeSource,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== flexible withdrawal ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
    let controller = time.test_control().unwrap();

    // withdrawal allowed after half the tenure, principal returned over 3 months
    let plan = PlanDefinition::flexible_withdrawal(
        "Flexi Income",
        RateSpec::reducing(dec!(1.5)),
        12,
        PaymentFrequency::Monthly,
        Money::from_major(10_000),
        Money::from_major(5_000_000),
        dec!(50),
        3,
    )?;

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?;
    let mut investment = Investment::open("INV-042", plan, Money::from_major(120_000), start, &[], &time)?;
    println!("matures on {}", investment.maturity_date);

    // pay out interest as each period falls due
    for period in 1..=4 {
        controller.advance(Duration::days(31));
        let due = investment.schedule().entry(period).map(|e| e.total_due).ok_or("missing period")?;
        investment.record_payment(period, due, None, &time)?;
    }

    // too early: only four periods have elapsed
    if let Err(e) = investment.request_withdrawal(&time) {
        println!("request on {} rejected: {}", time.now().format("%Y-%m-%d"), e);
    }

    controller.advance(Duration::days(62));
    let outcome = investment.request_withdrawal(&time)?;
    println!(
        "request on {} accepted: {} over {} periods, {} periods dropped",
        time.now().format("%Y-%m-%d"),
        outcome.settled_principal,
        outcome.settlement_periods,
        outcome.dropped_periods
    );
    println!("new maturity: {}\n", investment.maturity_date);

    for entry in investment.schedule().entries() {
        println!(
            "{:>3}  {}  interest {:>9}  principal {:>10}  {:?}",
            entry.period_index, entry.due_date, entry.interest_due, entry.principal_due, entry.status
        );
    }

    for event in investment.take_events() {
        println!("{:?}", event);
    }

    Ok(())
}
