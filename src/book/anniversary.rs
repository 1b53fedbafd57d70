use chrono::{Datelike, Months, NaiveDate};

use crate::interest::days_in_month;
use crate::loan::LoanRecord;
use crate::types::CycleLength;

/// last day of the month `months_ahead` months after `today`
pub fn window_end(today: NaiveDate, months_ahead: u32) -> Option<NaiveDate> {
    let target = today.checked_add_months(Months::new(months_ahead))?;
    NaiveDate::from_ymd_opt(
        target.year(),
        target.month(),
        days_in_month(target.year(), target.month()),
    )
}

/// latest start date whose first cycle completes by the end of the window
pub fn start_cutoff(today: NaiveDate, months_ahead: u32, cycle: CycleLength) -> Option<NaiveDate> {
    window_end(today, months_ahead).and_then(|end| cycle.sub_from(end))
}

/// unpaid loan that has reached, or will reach within the window, its first
/// cycle anniversary
pub fn reaches_cycle_within(
    loan: &LoanRecord,
    today: NaiveDate,
    months_ahead: u32,
    cycle: CycleLength,
) -> bool {
    if loan.is_paid {
        return false;
    }
    start_cutoff(today, months_ahead, cycle).is_some_and(|cutoff| loan.start_date <= cutoff)
}
