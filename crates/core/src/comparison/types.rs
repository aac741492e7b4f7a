//! Comparison result types.

use serde::Serialize;

use super::variance::Variance;
use crate::filter::RowFilter;
use crate::ledger::AggregateBucket;

/// Variances for the three expense stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricVariances {
    /// Committed expense variance.
    pub committed: Variance,
    /// Settled expense variance.
    pub settled: Variance,
    /// Paid expense variance.
    pub paid: Variance,
}

impl MetricVariances {
    /// Computes the variances of `current` against `prior`.
    #[must_use]
    pub fn between(current: &AggregateBucket, prior: &AggregateBucket) -> Self {
        Self {
            committed: Variance::between(current.committed, prior.committed),
            settled: Variance::between(current.settled, prior.settled),
            paid: Variance::between(current.paid, prior.paid),
        }
    }
}

/// Both periods' totals for one node, with their variances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComparedBucket {
    /// Current-period totals.
    pub current: AggregateBucket,
    /// Prior-period totals; zero when the node is absent from the prior period.
    pub prior: AggregateBucket,
    /// Variances of current against prior.
    pub variances: MetricVariances,
}

impl ComparedBucket {
    /// Pairs two buckets.
    #[must_use]
    pub fn new(current: AggregateBucket, prior: AggregateBucket) -> Self {
        Self {
            current,
            prior,
            variances: MetricVariances::between(&current, &prior),
        }
    }
}

/// A compared group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparedGroup {
    /// Group code.
    pub code: String,
    /// Group name.
    pub name: String,
    /// Both periods' totals.
    pub values: ComparedBucket,
}

/// A compared category and its groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparedCategory {
    /// Category code.
    pub code: String,
    /// Category name.
    pub name: String,
    /// Both periods' totals.
    pub values: ComparedBucket,
    /// Groups present in either period, in classification order.
    pub groups: Vec<ComparedGroup>,
}

impl ComparedCategory {
    /// Looks up a group by code.
    #[must_use]
    pub fn group(&self, code: &str) -> Option<&ComparedGroup> {
        self.groups.iter().find(|g| g.code == code)
    }
}

/// Current and prior-year aggregations addressed by the same keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    /// Current period.
    pub current_period: RowFilter,
    /// Prior-year period.
    pub prior_period: RowFilter,
    /// Grand totals of each side, summed directly from their buckets.
    pub grand_total: ComparedBucket,
    /// Categories present in either period, in classification order.
    pub categories: Vec<ComparedCategory>,
    /// Rows folded into the current side.
    pub records_current: u64,
    /// Rows folded into the prior side.
    pub records_prior: u64,
}

impl ComparisonResult {
    /// Looks up a category by code.
    #[must_use]
    pub fn category(&self, code: &str) -> Option<&ComparedCategory> {
        self.categories.iter().find(|c| c.code == code)
    }

    /// Looks up a group by category and group code.
    #[must_use]
    pub fn group(&self, category: &str, group: &str) -> Option<&ComparedGroup> {
        self.category(category)?.group(group)
    }
}
