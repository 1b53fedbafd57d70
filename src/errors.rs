use chrono::NaiveDate;
use thiserror::Error;

use crate::decimal::Money;
use crate::types::{BorrowerId, LoanId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccrualError {
    #[error("invalid range: end {end} precedes start {start}")]
    InvalidRange {
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("invalid input: {message}")]
    InvalidInput {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },

    #[error("borrower not found: {id}")]
    BorrowerNotFound {
        id: BorrowerId,
    },

    #[error("duplicate loan: {name} already has a loan of {amount} starting {start_date}")]
    DuplicateLoan {
        name: String,
        amount: Money,
        start_date: NaiveDate,
    },
}

impl AccrualError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        AccrualError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        AccrualError::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// an amount grew past what a decimal can hold
    pub fn overflow(context: &str) -> Self {
        AccrualError::invalid_input(format!("amount overflowed while {context}"))
    }

    /// fail with `InvalidRange` unless `end >= start`
    pub fn check_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
        if end < start {
            return Err(AccrualError::InvalidRange { start, end });
        }
        Ok(())
    }
}

pub type Result<T> = std::result::Result<T, AccrualError>;
