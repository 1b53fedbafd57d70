/// time control - watch a loan cross its compounding boundaries
use chrono::{Duration, TimeZone, Utc};
use cycle_interest_rs::{
    AccrualConfig, CycleEngine, EventStore, LoanRecord, Money, MonthlyRate, SafeTimeProvider,
    TimeSource,
};
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    println!("=== time control example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2018, 4, 10, 0, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();

    let engine = CycleEngine::new(AccrualConfig::three_year_cycle())?;
    let start = time.now().date_naive();
    let loan = LoanRecord::new(Money::from_major(20_000), MonthlyRate::per_hundred(dec!(1.5)), start)
        .with_partial_payment(Money::from_major(5_000), start + Duration::days(200));

    println!("loan taken on {}", start);

    for _ in 0..8 {
        controller.advance(Duration::days(365));
        let today = time.now().date_naive();

        let mut events = EventStore::new();
        let breakdown = engine.accrue_recording(&loan, today, &mut events)?;

        println!(
            "{}: cycles {}, principal {}, interest {}, payable {}",
            today,
            breakdown.full_cycles(),
            breakdown.compounded_principal,
            breakdown.total_interest,
            breakdown.total_payable,
        );
        for event in events.take_events() {
            println!("    {:?}", event);
        }
    }

    Ok(())
}
