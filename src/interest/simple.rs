use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{AccrualConfig, DEFAULT_DAYS_PER_MONTH};
use crate::decimal::{Money, MonthlyRate, MONEY_DECIMAL_PLACES};
use crate::errors::{AccrualError, Result};
use crate::interest::span::{months_and_days, DateSpan};

/// flat interest accrued over one span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentInterest {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub span: DateSpan,
    pub principal_base: Money,
    pub interest: Money,
}

impl SegmentInterest {
    pub fn months(&self) -> u32 {
        self.span.months
    }

    pub fn days(&self) -> u32 {
        self.span.days
    }
}

/// simple (non-compounding) interest keyed on a monthly rate per 100
///
/// whole months use the rate as-is; leftover days are pro-rated against a fixed
/// month length regardless of the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleInterestCalculator {
    days_per_month: u32,
    decimal_places: u32,
}

impl Default for SimpleInterestCalculator {
    fn default() -> Self {
        Self {
            days_per_month: DEFAULT_DAYS_PER_MONTH,
            decimal_places: MONEY_DECIMAL_PLACES,
        }
    }
}

impl SimpleInterestCalculator {
    pub fn from_config(config: &AccrualConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            days_per_month: config.days_per_month,
            decimal_places: config.money_decimal_places,
        })
    }

    /// interest for an already split span, rounded half-to-even
    pub fn interest_for_span(
        &self,
        principal: Money,
        rate: MonthlyRate,
        span: DateSpan,
    ) -> Result<Money> {
        let overflow = || AccrualError::overflow("computing interest");

        let per_month = Money::from_decimal(principal.hundreds())
            .checked_mul(rate.as_decimal())
            .ok_or_else(overflow)?;
        let day_fraction = Decimal::from(span.days) / Decimal::from(self.days_per_month);

        let months_part = per_month
            .checked_mul(Decimal::from(span.months))
            .ok_or_else(overflow)?;
        let days_part = per_month.checked_mul(day_fraction).ok_or_else(overflow)?;
        let total = months_part.checked_add(days_part).ok_or_else(overflow)?;

        Ok(total.round_dp(self.decimal_places))
    }

    /// interest between two dates with its month/day breakdown
    pub fn calculate(
        &self,
        principal: Money,
        rate: MonthlyRate,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SegmentInterest> {
        let span = months_and_days(start, end)?;
        Ok(SegmentInterest {
            start,
            end,
            span,
            principal_base: principal,
            interest: self.interest_for_span(principal, rate, span)?,
        })
    }

    /// interest between two dates
    pub fn interest(
        &self,
        principal: Money,
        rate: MonthlyRate,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Money> {
        Ok(self.calculate(principal, rate, start, end)?.interest)
    }
}

/// interest between two dates using the default 30-day month fraction
pub fn interest(
    principal: Money,
    rate: MonthlyRate,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Money> {
    SimpleInterestCalculator::default().interest(principal, rate, start, end)
}
