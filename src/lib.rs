pub mod book;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod interest;
pub mod loan;
pub mod types;

// re-export key types
pub use book::{Borrower, BorrowerPatch, LoanBook, LoanInterestReport, LoanPatch};
pub use config::AccrualConfig;
pub use decimal::{Money, MonthlyRate};
pub use errors::{AccrualError, Result};
pub use events::{Event, EventStore};
pub use interest::{
    accrue, interest, months_and_days, CycleEngine, CycleRecord, DateSpan, InterestBreakdown,
    SegmentInterest, SimpleInterestCalculator,
};
pub use loan::LoanRecord;
pub use types::{BorrowerId, CycleLength, LoanId};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
