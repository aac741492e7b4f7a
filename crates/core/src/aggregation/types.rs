//! Aggregation result types.

use serde::Serialize;

use crate::filter::RowFilter;
use crate::ledger::AggregateBucket;

/// A group with its totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupNode {
    /// Group code.
    pub code: String,
    /// Group name.
    pub name: String,
    /// Group totals.
    pub totals: AggregateBucket,
}

/// A category with its totals and non-empty groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    /// Category code.
    pub code: String,
    /// Category name.
    pub name: String,
    /// Category totals, including rows whose group did not resolve.
    pub totals: AggregateBucket,
    /// Non-empty groups in classification order.
    pub groups: Vec<GroupNode>,
}

impl CategoryNode {
    /// Looks up a group by code.
    #[must_use]
    pub fn group(&self, code: &str) -> Option<&GroupNode> {
        self.groups.iter().find(|g| g.code == code)
    }
}

/// The nested totals for one report period.
///
/// Empty categories and groups are pruned. The grand total is the sum of the
/// surviving categories; rows whose category is unknown are counted in
/// `unclassified_rows` but contribute to no total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregationResult {
    /// The period and unit the rows were filtered for.
    pub period: RowFilter,
    /// Sum of every classified row.
    pub grand_total: AggregateBucket,
    /// Non-empty categories in classification order.
    pub categories: Vec<CategoryNode>,
    /// Rows folded, classified or not.
    pub records_processed: u64,
    /// Rows with a missing or unknown category.
    pub unclassified_rows: u64,
    /// Rows whose category has groups but whose group did not resolve.
    pub ungrouped_rows: u64,
}

impl AggregationResult {
    /// Looks up a category by code.
    #[must_use]
    pub fn category(&self, code: &str) -> Option<&CategoryNode> {
        self.categories.iter().find(|c| c.code == code)
    }

    /// Looks up a group by category and group code.
    #[must_use]
    pub fn group(&self, category: &str, group: &str) -> Option<&GroupNode> {
        self.category(category)?.group(group)
    }

    /// Returns true if no category survived pruning.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
