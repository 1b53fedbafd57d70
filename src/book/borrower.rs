use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, MonthlyRate};
use crate::errors::{AccrualError, Result};
use crate::loan::LoanRecord;
use crate::types::{BorrowerId, CycleLength, LoanId};

/// a borrower and every loan recorded against them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrower {
    pub id: BorrowerId,
    pub full_name: String,
    pub phone_number: String,
    pub address: String,
    #[serde(default)]
    pub loans: Vec<LoanRecord>,
}

impl Borrower {
    pub fn new(
        full_name: impl Into<String>,
        phone_number: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: full_name.into(),
            phone_number: phone_number.into(),
            address: address.into(),
            loans: Vec::new(),
        }
    }

    /// record a new loan; the same amount starting on the same day twice is refused
    pub fn add_loan(&mut self, loan: LoanRecord) -> Result<LoanId> {
        loan.validate()?;

        let duplicate = self
            .loans
            .iter()
            .any(|l| l.principal == loan.principal && l.start_date == loan.start_date);
        if duplicate {
            return Err(AccrualError::DuplicateLoan {
                name: self.full_name.clone(),
                amount: loan.principal,
                start_date: loan.start_date,
            });
        }

        let id = loan.id;
        self.loans.push(loan);
        Ok(id)
    }

    pub fn loan(&self, id: LoanId) -> Option<&LoanRecord> {
        self.loans.iter().find(|l| l.id == id)
    }

    /// sum of every original principal, paid or not
    pub fn total_borrowed(&self) -> Money {
        self.loans.iter().map(|l| l.principal).sum()
    }

    /// whether any loan has reached its first cycle anniversary
    pub fn has_reached_cycle(&self, now: NaiveDate, cycle: CycleLength) -> bool {
        self.loans.iter().any(|l| l.has_reached_cycle(now, cycle))
    }

    pub fn matches_name(&self, fragment: &str) -> bool {
        fold_name(&self.full_name).contains(&fold_name(fragment))
    }

    /// same name as `full_name`, ignoring case and surrounding whitespace
    pub fn has_name(&self, full_name: &str) -> bool {
        fold_name(&self.full_name) == fold_name(full_name)
    }
}

fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// fields to overwrite on a stored loan; `None` leaves the field as it is
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanPatch {
    pub principal: Option<Money>,
    pub rate: Option<MonthlyRate>,
    pub start_date: Option<NaiveDate>,
    pub partial_payment: Option<Money>,
    pub partial_payment_date: Option<NaiveDate>,
    pub is_paid: Option<bool>,
}

impl LoanPatch {
    /// record a partial payment
    pub fn partial_payment(amount: Money, paid_on: NaiveDate) -> Self {
        Self {
            partial_payment: Some(amount),
            partial_payment_date: Some(paid_on),
            ..Self::default()
        }
    }

    /// mark the loan settled
    pub fn mark_paid() -> Self {
        Self {
            is_paid: Some(true),
            ..Self::default()
        }
    }

    /// the patched copy of `loan`, checked against the record invariants
    pub fn apply_to(&self, loan: &LoanRecord) -> Result<LoanRecord> {
        let mut patched = loan.clone();
        if let Some(principal) = self.principal {
            patched.principal = principal;
        }
        if let Some(rate) = self.rate {
            patched.rate = rate;
        }
        if let Some(start_date) = self.start_date {
            patched.start_date = start_date;
        }
        if let Some(amount) = self.partial_payment {
            patched.partial_payment = amount;
        }
        if let Some(paid_on) = self.partial_payment_date {
            patched.partial_payment_date = Some(paid_on);
        }
        if let Some(is_paid) = self.is_paid {
            patched.is_paid = is_paid;
        }
        patched.validate()?;
        Ok(patched)
    }
}

/// contact fields to overwrite on a borrower; blank values are ignored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorrowerPatch {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

impl BorrowerPatch {
    pub fn apply_to(&self, borrower: &mut Borrower) {
        fn overwrite(target: &mut String, value: &Option<String>) {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                *target = v.to_string();
            }
        }

        overwrite(&mut borrower.full_name, &self.full_name);
        overwrite(&mut borrower.phone_number, &self.phone_number);
        overwrite(&mut borrower.address, &self.address);
    }
}
