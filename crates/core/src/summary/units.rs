//! Units with financial movement and the filter values derived from rows.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::ledger::{AggregateBucket, LedgerRow, UnitCode};

/// Display name for a unit whose rows carry no name.
pub const UNNAMED_UNIT: &str = "SEM NOME";

/// An organizational unit with non-zero amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitWithMovement {
    /// Unit code.
    pub code: UnitCode,
    /// Unit name, or [`UNNAMED_UNIT`].
    pub name: String,
}

fn has_movement(totals: &AggregateBucket) -> bool {
    [
        totals.initial_allotment,
        totals.supplementary_allotment,
        totals.committed,
        totals.settled,
        totals.paid,
    ]
    .iter()
    .any(|amount| !amount.is_zero())
}

/// Units whose summed initial, supplementary, committed, settled or paid
/// amounts are non-zero, sorted by code.
#[must_use]
pub fn units_with_movement<'a, I>(rows: I) -> Vec<UnitWithMovement>
where
    I: IntoIterator<Item = &'a LedgerRow>,
{
    let mut units: BTreeMap<&UnitCode, (Option<&str>, AggregateBucket)> = BTreeMap::new();
    for row in rows {
        let (name, totals) = units.entry(&row.unit).or_default();
        totals.accumulate(&row.amounts);
        if name.is_none() {
            *name = row.unit_name.as_deref().filter(|n| !n.is_empty());
        }
    }

    units
        .into_iter()
        .filter(|(_, (_, totals))| has_movement(totals))
        .map(|(code, (name, _))| UnitWithMovement {
            code: code.clone(),
            name: name.unwrap_or(UNNAMED_UNIT).to_string(),
        })
        .collect()
}

/// Exercises, months and units a caller can filter by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AvailableFilters {
    /// Distinct exercises, ascending.
    pub exercises: Vec<i32>,
    /// Distinct months, ascending.
    pub months: Vec<u8>,
    /// Units with movement, by code.
    pub units: Vec<UnitWithMovement>,
}

impl AvailableFilters {
    /// Collects the filter values present in `rows`.
    #[must_use]
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a LedgerRow>,
        I::IntoIter: Clone,
    {
        let rows = rows.into_iter();
        let exercises: BTreeSet<i32> = rows.clone().map(|r| r.exercise).collect();
        let months: BTreeSet<u8> = rows.clone().map(|r| r.month).collect();
        Self {
            exercises: exercises.into_iter().collect(),
            months: months.into_iter().collect(),
            units: units_with_movement(rows),
        }
    }
}
