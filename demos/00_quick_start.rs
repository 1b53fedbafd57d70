/// quick start - interest on a single loan
use cycle_interest_rs::chrono::NaiveDate;
use cycle_interest_rs::{accrue, LoanRecord, Money, MonthlyRate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 50,000 at 2 per 100 per month, taken on 1 march 2019
    let start = NaiveDate::from_ymd_opt(2019, 3, 1).ok_or("bad date")?;
    let loan = LoanRecord::new(Money::from_major(50_000), MonthlyRate::from_whole(2), start);

    let today = NaiveDate::from_ymd_opt(2024, 8, 15).ok_or("bad date")?;
    let breakdown = accrue(&loan, today)?;

    println!("{}", breakdown.to_json_pretty()?);

    Ok(())
}
