//! Row-level summaries: column totals, units with movement and the filter
//! values a caller can offer.

mod financial;
mod units;

pub use financial::{ExerciseSummary, FinancialSummary};
pub use units::{AvailableFilters, UNNAMED_UNIT, UnitWithMovement, units_with_movement};
