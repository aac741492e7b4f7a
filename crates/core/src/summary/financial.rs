//! Column totals over a row set.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::ledger::{AggregateBucket, LedgerRow};

/// Record count and totals of one exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExerciseSummary {
    /// Exercise year.
    pub exercise: i32,
    /// Rows of this exercise.
    pub records: u64,
    /// Column totals of this exercise.
    pub totals: AggregateBucket,
}

/// Record counts and column totals of a row set.
///
/// Unlike an aggregation result this counts every row, classified or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FinancialSummary {
    /// Rows summarized.
    pub total_records: u64,
    /// Distinct exercises, ascending.
    pub exercises: Vec<i32>,
    /// Distinct months, ascending.
    pub months: Vec<u8>,
    /// Column totals, with updated allotment and balance derived.
    pub totals: AggregateBucket,
    /// Per-exercise counts and totals, ascending by exercise.
    pub by_exercise: Vec<ExerciseSummary>,
}

impl FinancialSummary {
    /// Summarizes `rows`.
    #[must_use]
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a LedgerRow>,
    {
        let mut total_records = 0u64;
        let mut totals = AggregateBucket::ZERO;
        let mut months = BTreeSet::new();
        let mut by_exercise: BTreeMap<i32, (u64, AggregateBucket)> = BTreeMap::new();

        for row in rows {
            total_records += 1;
            totals.accumulate(&row.amounts);
            months.insert(row.month);
            let (records, exercise_totals) = by_exercise.entry(row.exercise).or_default();
            *records += 1;
            exercise_totals.accumulate(&row.amounts);
        }

        Self {
            total_records,
            exercises: by_exercise.keys().copied().collect(),
            months: months.into_iter().collect(),
            totals,
            by_exercise: by_exercise
                .into_iter()
                .map(|(exercise, (records, totals))| ExerciseSummary {
                    exercise,
                    records,
                    totals,
                })
                .collect(),
        }
    }
}
