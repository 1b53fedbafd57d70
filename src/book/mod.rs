pub mod anniversary;
pub mod borrower;

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::decimal::Money;
use crate::errors::{AccrualError, Result};
use crate::events::{Event, EventStore};
use crate::interest::{CycleEngine, InterestBreakdown};
use crate::loan::LoanRecord;
use crate::types::{BorrowerId, LoanId};

pub use anniversary::{reaches_cycle_within, start_cutoff, window_end};
pub use borrower::{Borrower, BorrowerPatch, LoanPatch};

/// interest breakdown for one loan, labelled with its borrower
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanInterestReport {
    pub borrower_id: BorrowerId,
    pub borrower_name: String,
    pub borrower_total_borrowed: Money,
    pub is_paid: bool,
    pub breakdown: InterestBreakdown,
}

impl LoanInterestReport {
    fn new(borrower: &Borrower, loan: &LoanRecord, breakdown: InterestBreakdown) -> Self {
        Self {
            borrower_id: borrower.id,
            borrower_name: borrower.full_name.clone(),
            borrower_total_borrowed: borrower.total_borrowed(),
            is_paid: loan.is_paid,
            breakdown,
        }
    }

    pub fn loan_id(&self) -> LoanId {
        self.breakdown.loan_id
    }

    pub fn total_payable(&self) -> Money {
        self.breakdown.total_payable
    }
}

/// in-memory set of borrowers and their loans
///
/// the book never reads the clock itself: every date-dependent call takes `now`
/// (or a time provider in the `_with_time` variants).
#[derive(Debug, Clone, Default)]
pub struct LoanBook {
    engine: CycleEngine,
    borrowers: Vec<Borrower>,
}

impl LoanBook {
    pub fn new(engine: CycleEngine) -> Self {
        Self {
            engine,
            borrowers: Vec::new(),
        }
    }

    pub fn engine(&self) -> &CycleEngine {
        &self.engine
    }

    pub fn borrowers(&self) -> &[Borrower] {
        &self.borrowers
    }

    /// add a fully formed borrower record
    ///
    /// loans go through the same checks as `add_borrower_with_loan`, and a borrower
    /// with the same name absorbs them. nothing is stored if any loan is refused.
    pub fn add_borrower(&mut self, borrower: Borrower) -> Result<BorrowerId> {
        let Borrower {
            id,
            full_name,
            phone_number,
            address,
            loans,
        } = borrower;

        let existing = self.borrowers.iter().position(|b| b.has_name(&full_name));
        let mut target = match existing {
            Some(pos) => self.borrowers[pos].clone(),
            None => Borrower {
                id,
                full_name,
                phone_number,
                address,
                loans: Vec::new(),
            },
        };
        for loan in loans {
            target.add_loan(loan)?;
        }

        let id = target.id;
        match existing {
            Some(pos) => {
                self.borrowers[pos] = target;
                debug!(borrower_id = %id, "loans merged into existing borrower");
            }
            None => {
                self.borrowers.push(target);
                info!(borrower_id = %id, "borrower created");
            }
        }
        Ok(id)
    }

    /// record a loan, creating the borrower unless one with the same name exists
    pub fn add_borrower_with_loan(
        &mut self,
        full_name: &str,
        phone_number: &str,
        address: &str,
        loan: LoanRecord,
    ) -> Result<BorrowerId> {
        let existing = self
            .borrowers
            .iter_mut()
            .find(|b| b.has_name(full_name));

        match existing {
            Some(borrower) => {
                borrower.add_loan(loan)?;
                debug!(borrower_id = %borrower.id, "loan added to existing borrower");
                Ok(borrower.id)
            }
            None => {
                let mut borrower = Borrower::new(full_name.trim(), phone_number, address);
                borrower.add_loan(loan)?;
                let id = borrower.id;
                self.borrowers.push(borrower);
                info!(borrower_id = %id, "borrower created");
                Ok(id)
            }
        }
    }

    pub fn borrower(&self, id: BorrowerId) -> Result<&Borrower> {
        self.borrowers
            .iter()
            .find(|b| b.id == id)
            .ok_or(AccrualError::BorrowerNotFound { id })
    }

    /// borrowers whose name contains `fragment`, ignoring case
    pub fn find_by_name(&self, fragment: &str) -> Vec<&Borrower> {
        self.borrowers
            .iter()
            .filter(|b| b.matches_name(fragment))
            .collect()
    }

    /// a loan together with the borrower holding it
    pub fn loan(&self, id: LoanId) -> Result<(&Borrower, &LoanRecord)> {
        self.borrowers
            .iter()
            .find_map(|b| b.loan(id).map(|l| (b, l)))
            .ok_or(AccrualError::LoanNotFound { id })
    }

    pub fn apply_loan_patch(&mut self, id: LoanId, patch: &LoanPatch) -> Result<&LoanRecord> {
        let loan = self
            .borrowers
            .iter_mut()
            .flat_map(|b| b.loans.iter_mut())
            .find(|l| l.id == id)
            .ok_or(AccrualError::LoanNotFound { id })?;

        *loan = patch.apply_to(loan)?;
        debug!(loan_id = %id, "loan updated");
        Ok(&*loan)
    }

    pub fn apply_borrower_patch(
        &mut self,
        id: BorrowerId,
        patch: &BorrowerPatch,
    ) -> Result<&Borrower> {
        let borrower = self
            .borrowers
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(AccrualError::BorrowerNotFound { id })?;

        patch.apply_to(borrower);
        debug!(borrower_id = %id, "borrower updated");
        Ok(&*borrower)
    }

    pub fn remove_loan(&mut self, id: LoanId) -> Result<LoanRecord> {
        for borrower in &mut self.borrowers {
            if let Some(pos) = borrower.loans.iter().position(|l| l.id == id) {
                return Ok(borrower.loans.remove(pos));
            }
        }
        Err(AccrualError::LoanNotFound { id })
    }

    /// remove a borrower along with all of their loans
    pub fn remove_borrower(&mut self, id: BorrowerId) -> Result<Borrower> {
        let pos = self
            .borrowers
            .iter()
            .position(|b| b.id == id)
            .ok_or(AccrualError::BorrowerNotFound { id })?;
        Ok(self.borrowers.remove(pos))
    }

    /// interest on a single loan as of `now`, paid or not
    pub fn accrue_loan(&self, id: LoanId, now: NaiveDate) -> Result<LoanInterestReport> {
        let (borrower, loan) = self.loan(id)?;
        let breakdown = self.engine.accrue(loan, now)?;
        Ok(LoanInterestReport::new(borrower, loan, breakdown))
    }

    /// interest on every unpaid loan in the book as of `now`
    pub fn accrue_all(&self, now: NaiveDate) -> Result<Vec<LoanInterestReport>> {
        self.accrue_unpaid(now, None)
    }

    /// `accrue_all`, recording skipped loans and accrual steps in `events`
    pub fn accrue_all_recording(
        &self,
        now: NaiveDate,
        events: &mut EventStore,
    ) -> Result<Vec<LoanInterestReport>> {
        self.accrue_unpaid(now, Some(events))
    }

    fn accrue_unpaid(
        &self,
        now: NaiveDate,
        mut events: Option<&mut EventStore>,
    ) -> Result<Vec<LoanInterestReport>> {
        let mut reports = Vec::new();

        for borrower in &self.borrowers {
            for loan in &borrower.loans {
                if loan.is_paid {
                    warn!(loan_id = %loan.id, "skipping paid loan");
                    if let Some(store) = events.as_deref_mut() {
                        store.emit(Event::LoanSkippedPaid { loan_id: loan.id });
                    }
                    continue;
                }

                let breakdown = self.engine.accrue(loan, now)?;
                if let Some(store) = events.as_deref_mut() {
                    breakdown.emit_events(store);
                }
                reports.push(LoanInterestReport::new(borrower, loan, breakdown));
            }
        }

        info!(loans = reports.len(), %now, "book accrued");
        Ok(reports)
    }

    /// borrowers with an unpaid loan at or within `months_ahead` months of
    /// its first cycle anniversary
    pub fn borrowers_reaching_cycle(&self, months_ahead: u32, today: NaiveDate) -> Vec<&Borrower> {
        let cycle = self.engine.cycle_length();
        self.borrowers
            .iter()
            .filter(|b| {
                b.loans
                    .iter()
                    .any(|l| reaches_cycle_within(l, today, months_ahead, cycle))
            })
            .collect()
    }

    pub fn accrue_loan_with_time(
        &self,
        id: LoanId,
        time_provider: &SafeTimeProvider,
    ) -> Result<LoanInterestReport> {
        self.accrue_loan(id, time_provider.now().date_naive())
    }

    pub fn accrue_all_with_time(
        &self,
        time_provider: &SafeTimeProvider,
    ) -> Result<Vec<LoanInterestReport>> {
        self.accrue_all(time_provider.now().date_naive())
    }

    pub fn borrowers_reaching_cycle_with_time(
        &self,
        months_ahead: u32,
        time_provider: &SafeTimeProvider,
    ) -> Vec<&Borrower> {
        self.borrowers_reaching_cycle(months_ahead, time_provider.now().date_naive())
    }
}
