pub mod cycle;
pub mod simple;
pub mod span;

pub use cycle::{accrue, CycleEngine, CycleRecord, CycleState, InterestBreakdown};
pub use simple::{interest, SegmentInterest, SimpleInterestCalculator};
pub use span::{days_in_month, months_and_days, DateSpan};
