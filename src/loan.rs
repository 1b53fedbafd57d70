use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, MonthlyRate};
use crate::errors::{AccrualError, Result};
use crate::types::{CycleLength, LoanId};

/// a loan as read from the record store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub id: LoanId,
    pub principal: Money,
    pub rate: MonthlyRate,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub partial_payment: Money,
    #[serde(default)]
    pub partial_payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_paid: bool,
}

impl LoanRecord {
    /// create an unpaid loan with no partial payment
    pub fn new(principal: Money, rate: MonthlyRate, start_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            principal,
            rate,
            start_date,
            partial_payment: Money::ZERO,
            partial_payment_date: None,
            is_paid: false,
        }
    }

    pub fn with_partial_payment(mut self, amount: Money, paid_on: NaiveDate) -> Self {
        self.partial_payment = amount;
        self.partial_payment_date = Some(paid_on);
        self
    }

    pub fn paid(mut self) -> Self {
        self.is_paid = true;
        self
    }

    /// the partial payment and its date, when one was recorded
    pub fn partial_payment_segment(&self) -> Option<(Money, NaiveDate)> {
        match self.partial_payment_date {
            Some(date) if self.partial_payment.is_positive() => Some((self.partial_payment, date)),
            _ => None,
        }
    }

    /// end of the first compounding cycle
    pub fn maturity_date(&self, cycle: CycleLength) -> Option<NaiveDate> {
        cycle.add_to(self.start_date)
    }

    /// whether `now` is on or past the first cycle anniversary
    pub fn has_reached_cycle(&self, now: NaiveDate, cycle: CycleLength) -> bool {
        self.maturity_date(cycle).is_some_and(|maturity| now >= maturity)
    }

    /// check record invariants before any arithmetic runs
    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_positive() {
            return Err(AccrualError::invalid_input(format!(
                "principal must be positive, got {}",
                self.principal
            )));
        }

        if self.rate.is_negative() {
            return Err(AccrualError::invalid_input(format!(
                "rate must not be negative, got {}",
                self.rate
            )));
        }

        if self.partial_payment.is_negative() {
            return Err(AccrualError::invalid_input(format!(
                "partial payment must not be negative, got {}",
                self.partial_payment
            )));
        }

        if self.partial_payment > self.principal {
            return Err(AccrualError::invalid_input(format!(
                "partial payment {} exceeds principal {}",
                self.partial_payment, self.principal
            )));
        }

        match (self.partial_payment.is_positive(), self.partial_payment_date) {
            (true, None) => {
                return Err(AccrualError::invalid_input(
                    "partial payment amount recorded without a payment date",
                ));
            }
            (false, Some(_)) => {
                return Err(AccrualError::invalid_input(
                    "partial payment date recorded without a payment amount",
                ));
            }
            (true, Some(paid_on)) if paid_on < self.start_date => {
                return Err(AccrualError::invalid_input(format!(
                    "partial payment date {} precedes loan start {}",
                    paid_on, self.start_date
                )));
            }
            _ => {}
        }

        Ok(())
    }
}
