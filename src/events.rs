use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::LoanId;

/// all events that can be emitted while accruing interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    PartialPaymentApplied {
        loan_id: LoanId,
        amount: Money,
        interest_to_date: Money,
        remaining_principal: Money,
        paid_on: NaiveDate,
    },
    InterestCapitalized {
        loan_id: LoanId,
        cycle: u32,
        amount: Money,
        new_principal: Money,
        cycle_start: NaiveDate,
        cycle_end: NaiveDate,
    },
    OpenSegmentAccrued {
        loan_id: LoanId,
        amount: Money,
        principal_base: Money,
        from: NaiveDate,
        to: NaiveDate,
    },
    LoanSkippedPaid {
        loan_id: LoanId,
    },
}

impl Event {
    pub fn loan_id(&self) -> LoanId {
        match self {
            Event::PartialPaymentApplied { loan_id, .. }
            | Event::InterestCapitalized { loan_id, .. }
            | Event::OpenSegmentAccrued { loan_id, .. }
            | Event::LoanSkippedPaid { loan_id } => *loan_id,
        }
    }
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
