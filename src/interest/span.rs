use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{AccrualError, Result};

/// whole calendar months plus leftover days between two dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateSpan {
    pub months: u32,
    pub days: u32,
}

impl DateSpan {
    pub const ZERO: DateSpan = DateSpan { months: 0, days: 0 };

    pub fn is_zero(&self) -> bool {
        self.months == 0 && self.days == 0
    }
}

/// split `start..end` into whole months and leftover days
///
/// months follow the calendar exactly. when the end day-of-month is before the
/// start day-of-month, one month is given back and the length of the month
/// preceding `end` is borrowed. a start on the 29th-31st can overshoot a short
/// preceding month; the leftover is floored at zero in that case.
pub fn months_and_days(start: NaiveDate, end: NaiveDate) -> Result<DateSpan> {
    AccrualError::check_range(start, end)?;

    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    let mut days = end.day() as i32 - start.day() as i32;

    if days < 0 {
        months -= 1;
        let (year, month) = preceding_month(end.year(), end.month());
        days += days_in_month(year, month) as i32;
    }

    Ok(DateSpan {
        months: months.max(0) as u32,
        days: days.max(0) as u32,
    })
}

/// number of days in a calendar month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 30,
    }
}

fn preceding_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
