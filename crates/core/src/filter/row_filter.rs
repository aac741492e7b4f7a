//! The row filter applied before aggregation.

use std::fmt;

use serde::Serialize;

use super::error::FilterError;
use crate::ledger::{LedgerRow, UnitCode, UnitFilter};

/// Exercise years a filter accepts.
pub const EXERCISE_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

/// Exercise year, month ceiling and unit selection for one report period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RowFilter {
    exercise: i32,
    month_ceiling: u8,
    unit: UnitFilter,
}

impl RowFilter {
    /// Creates a filter.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidExercise` if `exercise` is outside
    /// [`EXERCISE_RANGE`] and `FilterError::InvalidMonthCeiling` if
    /// `month_ceiling` is not in 1..=12.
    pub fn new(exercise: i32, month_ceiling: u8, unit: UnitFilter) -> Result<Self, FilterError> {
        if !EXERCISE_RANGE.contains(&exercise) {
            return Err(FilterError::InvalidExercise(exercise));
        }
        if !(1..=12).contains(&month_ceiling) {
            return Err(FilterError::InvalidMonthCeiling(month_ceiling));
        }
        Ok(Self {
            exercise,
            month_ceiling,
            unit,
        })
    }

    /// Exercise year.
    #[must_use]
    pub const fn exercise(&self) -> i32 {
        self.exercise
    }

    /// Last month included.
    #[must_use]
    pub const fn month_ceiling(&self) -> u8 {
        self.month_ceiling
    }

    /// Unit selection.
    #[must_use]
    pub const fn unit(&self) -> &UnitFilter {
        &self.unit
    }

    /// The same month ceiling and unit, one exercise earlier.
    ///
    /// Saturates at `i32::MIN`; filters built through [`RowFilter::new`] are
    /// never that low.
    #[must_use]
    pub fn prior_year(&self) -> Self {
        Self {
            exercise: self.exercise.saturating_sub(1),
            month_ceiling: self.month_ceiling,
            unit: self.unit.clone(),
        }
    }

    /// The same exercise and month ceiling over all units.
    #[must_use]
    pub fn consolidated(&self) -> Self {
        Self {
            exercise: self.exercise,
            month_ceiling: self.month_ceiling,
            unit: UnitFilter::Consolidated,
        }
    }

    /// Returns true if the row belongs to this period and unit.
    #[must_use]
    pub fn matches(&self, row: &LedgerRow) -> bool {
        self.covers(row.exercise, row.month, &row.unit)
    }

    /// Returns true if a movement of `unit` in `exercise`/`month` belongs to
    /// this period and unit.
    #[must_use]
    pub fn covers(&self, exercise: i32, month: u8, unit: &UnitCode) -> bool {
        exercise == self.exercise && month <= self.month_ceiling && self.unit.admits(unit)
    }

    /// Borrows the matching rows, preserving input order.
    #[must_use]
    pub fn apply<'a>(&self, rows: &'a [LedgerRow]) -> Vec<&'a LedgerRow> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }

    /// Keeps the matching rows of an owned set, preserving input order.
    #[must_use]
    pub fn retain(&self, mut rows: Vec<LedgerRow>) -> Vec<LedgerRow> {
        rows.retain(|row| self.matches(row));
        rows
    }
}

impl fmt::Display for RowFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{:02} {}",
            self.exercise, self.month_ceiling, self.unit
        )
    }
}
