//! Per-category rollup of additional credits.

use serde::Serialize;
use tracing::{debug, warn};

use super::bucket::CreditBucket;
use super::row::CreditRow;
use crate::classification::ClassificationTree;
use crate::filter::RowFilter;

/// A category with its credit totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreditCategory {
    /// Category code.
    pub code: String,
    /// Category name.
    pub name: String,
    /// Credit totals of the category.
    pub totals: CreditBucket,
}

/// Additional credits of one report period, by category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreditsResult {
    /// The period and unit the credits were filtered for.
    pub period: RowFilter,
    /// Sum of every classified credit row.
    pub grand_total: CreditBucket,
    /// Categories with non-zero credits, in classification order.
    pub categories: Vec<CreditCategory>,
    /// Credit rows folded, classified or not.
    pub records_processed: u64,
    /// Credit rows with a missing or unknown category.
    pub unclassified_rows: u64,
}

impl CreditsResult {
    /// Looks up a category by code.
    #[must_use]
    pub fn category(&self, code: &str) -> Option<&CreditCategory> {
        self.categories.iter().find(|c| c.code == code)
    }

    /// Returns true if no category carries credits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Folds credit rows into category totals.
#[derive(Debug, Clone, Copy)]
pub struct CreditRollup<'t> {
    tree: &'t ClassificationTree,
}

impl<'t> CreditRollup<'t> {
    /// Creates a rollup over a classification tree.
    #[must_use]
    pub const fn new(tree: &'t ClassificationTree) -> Self {
        Self { tree }
    }

    /// Totals credit rows already narrowed by `period`.
    #[must_use]
    pub fn rollup<'a, I>(&self, period: &RowFilter, rows: I) -> CreditsResult
    where
        I: IntoIterator<Item = &'a CreditRow>,
    {
        let mut totals = vec![CreditBucket::ZERO; self.tree.categories().len()];
        let mut records_processed = 0u64;
        let mut unclassified_rows = 0u64;

        for row in rows {
            records_processed += 1;
            match row
                .category
                .as_deref()
                .and_then(|code| self.tree.category_index(code))
            {
                Some(idx) => totals[idx].accumulate(&row.amounts),
                None => unclassified_rows += 1,
            }
        }

        if unclassified_rows > 0 {
            warn!(
                period = %period,
                unclassified_rows,
                "credit rows with unknown category excluded from totals"
            );
        }

        let categories: Vec<CreditCategory> = self
            .tree
            .categories()
            .iter()
            .zip(totals)
            .filter(|(_, totals)| !totals.is_zero())
            .map(|(def, totals)| CreditCategory {
                code: def.code.to_string(),
                name: def.name.to_string(),
                totals,
            })
            .collect();

        let mut grand_total = CreditBucket::ZERO;
        for category in &categories {
            grand_total.accumulate(&category.totals);
        }

        debug!(
            period = %period,
            records = records_processed,
            categories = categories.len(),
            "credits rolled up"
        );

        CreditsResult {
            period: period.clone(),
            grand_total,
            categories,
            records_processed,
            unclassified_rows,
        }
    }
}
