/// loan book - batch accrual and upcoming cycle anniversaries
use cycle_interest_rs::chrono::NaiveDate;
use cycle_interest_rs::{LoanBook, LoanPatch, LoanRecord, Money, MonthlyRate};

fn date(y: i32, m: u32, d: u32) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    Ok(NaiveDate::from_ymd_opt(y, m, d).ok_or("bad date")?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut book = LoanBook::default();

    let shop = LoanRecord::new(Money::from_major(100_000), MonthlyRate::from_whole(1), date(2020, 6, 1)?);
    let shop_id = shop.id;
    book.add_borrower_with_loan("Meena Iyer", "9811122233", "3 Market Road", shop)?;
    book.add_borrower_with_loan(
        "Meena Iyer",
        "9811122233",
        "3 Market Road",
        LoanRecord::new(Money::from_major(25_000), MonthlyRate::from_whole(2), date(2022, 1, 10)?),
    )?;
    book.add_borrower_with_loan(
        "Joseph Mathew",
        "9744455566",
        "18 Church Street",
        LoanRecord::new(Money::from_major(40_000), MonthlyRate::from_whole(2), date(2021, 11, 5)?),
    )?;

    // part of the shop loan was returned
    book.apply_loan_patch(
        shop_id,
        &LoanPatch::partial_payment(Money::from_major(30_000), date(2021, 12, 1)?),
    )?;

    let today = date(2024, 9, 20)?;
    println!("=== outstanding as of {} ===", today);
    for report in book.accrue_all(today)? {
        println!(
            "{:<15} loan {} cycles {} interest {:>10} payable {:>10}",
            report.borrower_name,
            report.loan_id(),
            report.breakdown.full_cycles(),
            report.breakdown.total_interest,
            report.total_payable(),
        );
    }

    println!("\n=== reaching a cycle within 2 months ===");
    for borrower in book.borrowers_reaching_cycle(2, today) {
        println!("{} ({} borrowed)", borrower.full_name, borrower.total_borrowed());
    }

    Ok(())
}
