use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AccrualError, Result};

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a borrower
pub type BorrowerId = Uuid;

/// fixed duration after which accrued interest is folded into principal
///
/// measured in calendar months so that a cycle that starts on the 31st lands on
/// the last day of a shorter month instead of spilling into the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CycleLength {
    months: u32,
}

impl CycleLength {
    /// three calendar years
    pub const THREE_YEARS: CycleLength = CycleLength { months: 36 };

    pub fn months(months: u32) -> Result<Self> {
        if months == 0 {
            return Err(AccrualError::invalid_configuration(
                "cycle length must be at least one month",
            ));
        }
        Ok(Self { months })
    }

    pub fn years(years: u32) -> Result<Self> {
        let months = years.checked_mul(12).ok_or_else(|| {
            AccrualError::invalid_configuration(format!("cycle of {years} years is too long"))
        })?;
        Self::months(months)
    }

    pub fn as_months(&self) -> u32 {
        self.months
    }

    /// date one cycle after `date`, or `None` past the end of the calendar
    pub fn add_to(&self, date: NaiveDate) -> Option<NaiveDate> {
        date.checked_add_months(Months::new(self.months))
    }

    /// date one cycle before `date`, or `None` before the start of the calendar
    pub fn sub_from(&self, date: NaiveDate) -> Option<NaiveDate> {
        date.checked_sub_months(Months::new(self.months))
    }
}

impl Default for CycleLength {
    fn default() -> Self {
        CycleLength::THREE_YEARS
    }
}
