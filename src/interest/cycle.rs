use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::AccrualConfig;
use crate::decimal::{Money, MonthlyRate};
use crate::errors::{AccrualError, Result};
use crate::events::{Event, EventStore};
use crate::interest::simple::{SegmentInterest, SimpleInterestCalculator};
use crate::loan::LoanRecord;
use crate::types::{CycleLength, LoanId};

/// running state of the compounding fold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleState {
    pub principal: Money,
    pub cycle_start: NaiveDate,
    pub completed: u32,
}

impl CycleState {
    pub fn opening(principal: Money, cycle_start: NaiveDate) -> Self {
        Self {
            principal,
            cycle_start,
            completed: 0,
        }
    }

    /// state after capitalizing one cycle's interest
    fn capitalize(self, cycle_end: NaiveDate, interest: Money) -> Result<Self> {
        let principal = self
            .principal
            .checked_add(interest)
            .ok_or_else(|| AccrualError::overflow("capitalizing interest"))?;
        Ok(Self {
            principal,
            cycle_start: cycle_end,
            completed: self.completed + 1,
        })
    }
}

/// one completed cycle whose interest was folded into principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleRecord {
    /// 1-based position of the cycle
    pub index: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub opening_principal: Money,
    pub interest: Money,
    pub closing_principal: Money,
}

/// interest owed on a loan as of a given date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestBreakdown {
    pub loan_id: LoanId,
    pub calculated_at: NaiveDate,
    pub principal: Money,
    pub rate: MonthlyRate,
    pub partial_payment: Money,
    /// start date to partial payment date, on the original principal
    pub partial_segment: Option<SegmentInterest>,
    pub cycles: Vec<CycleRecord>,
    pub last_cycle_start: NaiveDate,
    /// last cycle start to `calculated_at`, on the compounded principal
    pub open_segment: Option<SegmentInterest>,
    pub compounded_principal: Money,
    pub total_interest: Money,
    pub total_payable: Money,
}

impl InterestBreakdown {
    pub fn full_cycles(&self) -> u32 {
        self.cycles.len() as u32
    }

    pub fn partial_interest(&self) -> Money {
        self.partial_segment.map_or(Money::ZERO, |s| s.interest)
    }

    pub fn remaining_interest(&self) -> Money {
        self.open_segment.map_or(Money::ZERO, |s| s.interest)
    }

    /// interest absorbed into principal across all full cycles
    pub fn capitalized_interest(&self) -> Money {
        self.cycles.iter().map(|c| c.interest).sum()
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// replay the breakdown as accrual events
    pub fn emit_events(&self, events: &mut EventStore) {
        if let Some(segment) = self.partial_segment {
            events.emit(Event::PartialPaymentApplied {
                loan_id: self.loan_id,
                amount: self.partial_payment,
                interest_to_date: segment.interest,
                remaining_principal: self.principal - self.partial_payment,
                paid_on: segment.end,
            });
        }

        for cycle in &self.cycles {
            events.emit(Event::InterestCapitalized {
                loan_id: self.loan_id,
                cycle: cycle.index,
                amount: cycle.interest,
                new_principal: cycle.closing_principal,
                cycle_start: cycle.start,
                cycle_end: cycle.end,
            });
        }

        if let Some(segment) = self.open_segment {
            events.emit(Event::OpenSegmentAccrued {
                loan_id: self.loan_id,
                amount: segment.interest,
                principal_base: segment.principal_base,
                from: segment.start,
                to: segment.end,
            });
        }
    }
}

/// accrues interest, capitalizing it at every full cycle boundary
#[derive(Debug, Clone, Copy)]
pub struct CycleEngine {
    cycle_length: CycleLength,
    decimal_places: u32,
    calculator: SimpleInterestCalculator,
}

impl Default for CycleEngine {
    fn default() -> Self {
        let config = AccrualConfig::default();
        Self {
            cycle_length: config.cycle_length,
            decimal_places: config.money_decimal_places,
            calculator: SimpleInterestCalculator::default(),
        }
    }
}

impl CycleEngine {
    pub fn new(config: AccrualConfig) -> Result<Self> {
        let calculator = SimpleInterestCalculator::from_config(&config)?;
        Ok(Self {
            cycle_length: config.cycle_length,
            decimal_places: config.money_decimal_places,
            calculator,
        })
    }

    pub fn cycle_length(&self) -> CycleLength {
        self.cycle_length
    }

    /// compute the interest breakdown for `loan` as of `now`
    #[instrument(skip_all, fields(loan_id = %loan.id, %now))]
    pub fn accrue(&self, loan: &LoanRecord, now: NaiveDate) -> Result<InterestBreakdown> {
        loan.validate()?;
        AccrualError::check_range(loan.start_date, now)?;

        // 1. interest up to the partial payment, on the original principal
        let (partial_segment, opening) = match loan.partial_payment_segment() {
            Some((amount, paid_on)) => {
                AccrualError::check_range(paid_on, now)?;
                let segment = self
                    .calculator
                    .calculate(loan.principal, loan.rate, loan.start_date, paid_on)?;
                debug!(
                    interest = %segment.interest,
                    months = segment.months(),
                    days = segment.days(),
                    "partial payment segment closed"
                );
                (Some(segment), CycleState::opening(loan.principal - amount, paid_on))
            }
            None => (None, CycleState::opening(loan.principal, loan.start_date)),
        };

        // 2. full cycles, each folding its interest into principal
        let (cycles, state) = self.compound_cycles(opening, loan.rate, now)?;

        // 3. the remaining sub-cycle span on the compounded principal
        let open_segment = if state.cycle_start < now {
            let segment = self
                .calculator
                .calculate(state.principal, loan.rate, state.cycle_start, now)?;
            debug!(
                interest = %segment.interest,
                months = segment.months(),
                days = segment.days(),
                "open segment accrued"
            );
            Some(segment)
        } else {
            None
        };

        // 4. capitalized interest lives in the principal, not in the total
        let partial_interest = partial_segment.map_or(Money::ZERO, |s| s.interest);
        let remaining_interest = open_segment.map_or(Money::ZERO, |s| s.interest);
        let total_interest = partial_interest
            .checked_add(remaining_interest)
            .ok_or_else(|| AccrualError::overflow("totalling interest"))?;
        let total_payable = state
            .principal
            .checked_add(total_interest)
            .and_then(|m| m.checked_sub(loan.partial_payment))
            .ok_or_else(|| AccrualError::overflow("totalling the amount payable"))?;

        Ok(InterestBreakdown {
            loan_id: loan.id,
            calculated_at: now,
            principal: loan.principal,
            rate: loan.rate,
            partial_payment: loan.partial_payment,
            partial_segment,
            cycles,
            last_cycle_start: state.cycle_start,
            open_segment,
            compounded_principal: state.principal.round_dp(self.decimal_places),
            total_interest: total_interest.round_dp(self.decimal_places),
            total_payable: total_payable.round_dp(self.decimal_places),
        })
    }

    /// accrue and record what happened in `events`
    pub fn accrue_recording(
        &self,
        loan: &LoanRecord,
        now: NaiveDate,
        events: &mut EventStore,
    ) -> Result<InterestBreakdown> {
        let breakdown = self.accrue(loan, now)?;
        breakdown.emit_events(events);
        Ok(breakdown)
    }

    /// run every full cycle that ends on or before `now`
    pub fn compound_cycles(
        &self,
        opening: CycleState,
        rate: MonthlyRate,
        now: NaiveDate,
    ) -> Result<(Vec<CycleRecord>, CycleState)> {
        let mut cycles = Vec::new();
        let mut state = opening;

        while let Some((record, next)) = self.next_cycle(state, rate, now)? {
            cycles.push(record);
            state = next;
        }

        Ok((cycles, state))
    }

    /// a single fold step: the cycle starting at `state.cycle_start`, if it
    /// completes by `now`, and the state that follows it
    pub fn next_cycle(
        &self,
        state: CycleState,
        rate: MonthlyRate,
        now: NaiveDate,
    ) -> Result<Option<(CycleRecord, CycleState)>> {
        let cycle_end = match self.cycle_length.add_to(state.cycle_start) {
            Some(end) if end <= now => end,
            _ => return Ok(None),
        };

        let interest = self
            .calculator
            .interest(state.principal, rate, state.cycle_start, cycle_end)?;
        let next = state.capitalize(cycle_end, interest)?;

        debug!(
            cycle = next.completed,
            %interest,
            new_principal = %next.principal,
            "cycle interest capitalized"
        );

        let record = CycleRecord {
            index: next.completed,
            start: state.cycle_start,
            end: cycle_end,
            opening_principal: state.principal,
            interest,
            closing_principal: next.principal,
        };

        Ok(Some((record, next)))
    }
}

/// accrue with the default three-year cycle
pub fn accrue(loan: &LoanRecord, now: NaiveDate) -> Result<InterestBreakdown> {
    CycleEngine::default().accrue(loan, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn loan(start: NaiveDate) -> LoanRecord {
        LoanRecord::new(Money::from_major(10_000), MonthlyRate::from_whole(2), start)
    }

    #[test]
    fn test_zero_duration() {
        let record = loan(date(2020, 1, 1));
        let result = accrue(&record, date(2020, 1, 1)).unwrap();

        assert_eq!(result.full_cycles(), 0);
        assert!(result.total_interest.is_zero());
        assert!(result.partial_segment.is_none());
        assert!(result.open_segment.is_none());
        assert_eq!(result.compounded_principal, Money::from_major(10_000));
        assert_eq!(result.total_payable, Money::from_major(10_000));
    }

    #[test]
    fn test_within_first_cycle() {
        let record = loan(date(2020, 1, 15));
        let result = accrue(&record, date(2020, 3, 10)).unwrap();

        assert_eq!(result.full_cycles(), 0);
        let open = result.open_segment.unwrap();
        assert_eq!((open.months(), open.days()), (1, 24));
        assert_eq!(result.total_interest, Money::from_decimal(dec!(360.00)));
        assert_eq!(result.total_payable, Money::from_decimal(dec!(10360.00)));
    }

    #[test]
    fn test_exact_cycle_boundary() {
        let record = loan(date(2020, 1, 1));
        let result = accrue(&record, date(2023, 1, 1)).unwrap();

        assert_eq!(result.full_cycles(), 1);
        assert!(result.open_segment.is_none());
        assert_eq!(result.last_cycle_start, date(2023, 1, 1));

        // 100 * 2 * 36 months
        let cycle = result.cycles[0];
        assert_eq!(cycle.interest, Money::from_major(7_200));
        assert_eq!(result.compounded_principal, Money::from_major(17_200));
        assert_eq!(
            result.compounded_principal,
            record.principal + result.cycles[0].interest
        );
        assert!(result.total_interest.is_zero());
    }

    #[test]
    fn test_one_day_before_boundary() {
        let record = loan(date(2020, 1, 1));
        let result = accrue(&record, date(2022, 12, 31)).unwrap();

        assert_eq!(result.full_cycles(), 0);
        let open = result.open_segment.unwrap();
        assert_eq!((open.months(), open.days()), (35, 30));
        // 7000 for 35 months + 200 for 30/30
        assert_eq!(result.total_interest, Money::from_major(7_200));
    }

    #[test]
    fn test_second_cycle_compounds() {
        let record = loan(date(2017, 1, 1));
        let result = accrue(&record, date(2023, 7, 1)).unwrap();

        assert_eq!(result.full_cycles(), 2);
        assert_eq!(result.cycles[0].interest, Money::from_major(7_200));
        assert_eq!(result.cycles[1].opening_principal, Money::from_major(17_200));

        // 172 * 2 * 36, not the flat 7200
        assert_eq!(result.cycles[1].interest, Money::from_major(12_384));
        assert!(result.cycles[1].interest > result.cycles[0].interest);
        assert_eq!(result.compounded_principal, Money::from_major(29_584));
        assert_eq!(result.capitalized_interest(), Money::from_major(19_584));

        // 295.84 * 2 * 6 months
        let open = result.open_segment.unwrap();
        assert_eq!(open.start, date(2023, 1, 1));
        assert_eq!(open.principal_base, Money::from_major(29_584));
        assert_eq!(result.total_interest, Money::from_decimal(dec!(3550.08)));
        assert_eq!(result.total_payable, Money::from_decimal(dec!(33134.08)));
    }

    #[test]
    fn test_partial_payment_reduces_base() {
        let unpaid = loan(date(2020, 1, 1));
        let partly_paid = unpaid
            .clone()
            .with_partial_payment(Money::from_major(4_000), date(2021, 7, 1));
        let now = date(2022, 7, 1);

        let base = accrue(&unpaid, now).unwrap();
        let reduced = accrue(&partly_paid, now).unwrap();

        // 18 months on the full principal
        let partial = reduced.partial_segment.unwrap();
        assert_eq!((partial.months(), partial.days()), (18, 0));
        assert_eq!(partial.interest, Money::from_major(3_600));
        assert_eq!(partial.principal_base, Money::from_major(10_000));

        // 12 months on the remaining 6000
        let open = reduced.open_segment.unwrap();
        assert_eq!(open.principal_base, Money::from_major(6_000));
        assert_eq!(open.interest, Money::from_major(1_440));
        assert_eq!(reduced.total_interest, Money::from_major(5_040));
        assert_eq!(reduced.total_payable, Money::from_major(7_040));

        assert_eq!(base.open_segment.unwrap().principal_base, Money::from_major(10_000));
        assert_eq!(base.total_interest, Money::from_major(6_000));
        assert!(reduced.remaining_interest() < base.remaining_interest());
    }

    #[test]
    fn test_cycles_restart_from_partial_payment_date() {
        let record = loan(date(2018, 1, 1))
            .with_partial_payment(Money::from_major(5_000), date(2019, 1, 1));
        let result = accrue(&record, date(2022, 3, 1)).unwrap();

        assert_eq!(result.partial_interest(), Money::from_major(2_400));
        assert_eq!(result.full_cycles(), 1);
        assert_eq!(result.cycles[0].start, date(2019, 1, 1));
        assert_eq!(result.cycles[0].end, date(2022, 1, 1));
        // 50 * 2 * 36
        assert_eq!(result.cycles[0].interest, Money::from_major(3_600));
        assert_eq!(result.compounded_principal, Money::from_major(8_600));

        // 86 * 2 * 2 months
        assert_eq!(result.remaining_interest(), Money::from_major(344));
        assert_eq!(result.total_interest, Money::from_major(2_744));
    }

    #[test]
    fn test_partial_payment_on_now() {
        let record = loan(date(2020, 1, 1))
            .with_partial_payment(Money::from_major(1_000), date(2020, 7, 1));
        let result = accrue(&record, date(2020, 7, 1)).unwrap();

        assert_eq!(result.partial_interest(), Money::from_major(1_200));
        assert!(result.open_segment.is_none());
        assert_eq!(result.last_cycle_start, date(2020, 7, 1));
    }

    #[test]
    fn test_zero_rate_runs_cycles() {
        let mut record = loan(date(2015, 1, 1));
        record.rate = MonthlyRate::ZERO;
        let result = accrue(&record, date(2022, 6, 1)).unwrap();

        assert_eq!(result.full_cycles(), 2);
        assert!(result.cycles.iter().all(|c| c.interest.is_zero()));
        assert!(result.total_interest.is_zero());
        assert_eq!(result.compounded_principal, Money::from_major(10_000));
        assert_eq!(result.last_cycle_start, date(2021, 1, 1));
    }

    #[test]
    fn test_leap_day_start_clamps_cycle_end() {
        let record = loan(date(2020, 2, 29));
        let result = accrue(&record, date(2026, 3, 1)).unwrap();

        assert_eq!(result.full_cycles(), 2);
        assert_eq!(result.cycles[0].end, date(2023, 2, 28));
        assert_eq!(result.cycles[1].end, date(2026, 2, 28));
        let open = result.open_segment.unwrap();
        assert_eq!((open.months(), open.days()), (0, 1));
    }

    #[test]
    fn test_custom_cycle_length() {
        let config = AccrualConfig::default().with_cycle_length(CycleLength::years(1).unwrap());
        let engine = CycleEngine::new(config).unwrap();
        let result = engine.accrue(&loan(date(2020, 1, 1)), date(2022, 1, 1)).unwrap();

        assert_eq!(result.full_cycles(), 2);
        // 2400 then 124 * 2 * 12
        assert_eq!(result.cycles[0].interest, Money::from_major(2_400));
        assert_eq!(result.cycles[1].interest, Money::from_major(2_976));
        assert_eq!(result.compounded_principal, Money::from_major(15_376));
    }

    #[test]
    fn test_now_before_start_is_invalid_range() {
        let err = accrue(&loan(date(2020, 1, 1)), date(2019, 12, 31)).unwrap_err();
        assert!(matches!(err, AccrualError::InvalidRange { .. }));
    }

    #[test]
    fn test_partial_payment_after_now_is_invalid_range() {
        let record = loan(date(2020, 1, 1))
            .with_partial_payment(Money::from_major(1_000), date(2021, 1, 1));
        let err = accrue(&record, date(2020, 6, 1)).unwrap_err();
        assert_eq!(
            err,
            AccrualError::InvalidRange {
                start: date(2021, 1, 1),
                end: date(2020, 6, 1),
            }
        );
    }

    #[test]
    fn test_invalid_record_rejected_before_arithmetic() {
        let record = loan(date(2020, 1, 1))
            .with_partial_payment(Money::from_major(20_000), date(2021, 1, 1));
        let err = accrue(&record, date(2019, 1, 1)).unwrap_err();
        assert!(matches!(err, AccrualError::InvalidInput { .. }));
    }

    #[test]
    fn test_runaway_compounding_is_an_error() {
        // principal multiplies by 19 each cycle and leaves the decimal range by the 18th
        let record = LoanRecord::new(
            Money::from_major(1_000_000),
            MonthlyRate::from_whole(50),
            date(1900, 1, 1),
        );
        let err = accrue(&record, date(1960, 1, 1)).unwrap_err();
        assert!(matches!(err, AccrualError::InvalidInput { .. }));

        // the same loan is fine while it stays in range
        let result = accrue(&record, date(1903, 1, 1)).unwrap();
        assert_eq!(result.compounded_principal, Money::from_major(19_000_000));
    }

    #[test]
    fn test_engine_rejects_zero_day_basis() {
        let err = CycleEngine::new(AccrualConfig::default().with_days_per_month(0)).unwrap_err();
        assert!(matches!(err, AccrualError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_fold_step_by_step() {
        let engine = CycleEngine::default();
        let rate = MonthlyRate::from_whole(1);
        let now = date(2026, 1, 1);
        let opening = CycleState::opening(Money::from_major(1_000), date(2020, 1, 1));

        let (first, state) = engine.next_cycle(opening, rate, now).unwrap().unwrap();
        assert_eq!(first.index, 1);
        assert_eq!(first.interest, Money::from_major(360));
        assert_eq!(state.principal, Money::from_major(1_360));
        assert_eq!(opening.completed, 0);

        let (second, state) = engine.next_cycle(state, rate, now).unwrap().unwrap();
        assert_eq!(second.index, 2);
        assert_eq!(second.interest, Money::from_decimal(dec!(489.60)));
        assert_eq!(state.cycle_start, now);

        assert!(engine.next_cycle(state, rate, now).unwrap().is_none());
    }

    #[test]
    fn test_events_recorded() {
        let record = loan(date(2017, 1, 1))
            .with_partial_payment(Money::from_major(2_000), date(2017, 7, 1));
        let mut events = EventStore::new();
        let result = CycleEngine::default()
            .accrue_recording(&record, date(2023, 9, 1), &mut events)
            .unwrap();

        assert_eq!(result.full_cycles(), 2);
        let events = events.take_events();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], Event::PartialPaymentApplied { .. }));
        assert!(matches!(events[1], Event::InterestCapitalized { cycle: 1, .. }));
        assert!(matches!(events[2], Event::InterestCapitalized { cycle: 2, .. }));
        assert!(matches!(events[3], Event::OpenSegmentAccrued { .. }));
        assert!(events.iter().all(|e| e.loan_id() == record.id));
    }

    #[test]
    fn test_breakdown_serializes() {
        let result = accrue(&loan(date(2020, 1, 15)), date(2020, 3, 10)).unwrap();
        let json = result.to_json_pretty().unwrap();
        assert!(json.contains("\"total_interest\": \"360.00\""));
        let back: InterestBreakdown = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
