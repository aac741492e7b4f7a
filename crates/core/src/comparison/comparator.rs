//! Walks two aggregation results node by node.

use super::types::{ComparedBucket, ComparedCategory, ComparedGroup, ComparisonResult};
use crate::aggregation::{AggregationResult, CategoryNode};
use crate::classification::{CategoryDef, ClassificationTree};
use crate::ledger::AggregateBucket;

/// Builds comparison results over a classification tree.
#[derive(Debug, Clone, Copy)]
pub struct Comparator<'t> {
    tree: &'t ClassificationTree,
}

impl<'t> Comparator<'t> {
    /// Creates a comparator over a classification tree.
    #[must_use]
    pub const fn new(tree: &'t ClassificationTree) -> Self {
        Self { tree }
    }

    /// Compares a current result against a prior-year result.
    ///
    /// Every node present on either side appears in the output, with an
    /// all-zero bucket standing in for the missing side.
    #[must_use]
    pub fn compare(&self, current: &AggregationResult, prior: &AggregationResult) -> ComparisonResult {
        let categories = self
            .tree
            .categories()
            .iter()
            .filter_map(|def| {
                Self::compare_category(def, current.category(def.code), prior.category(def.code))
            })
            .collect();

        ComparisonResult {
            current_period: current.period.clone(),
            prior_period: prior.period.clone(),
            grand_total: ComparedBucket::new(current.grand_total, prior.grand_total),
            categories,
            records_current: current.records_processed,
            records_prior: prior.records_processed,
        }
    }

    fn compare_category(
        def: &CategoryDef,
        current: Option<&CategoryNode>,
        prior: Option<&CategoryNode>,
    ) -> Option<ComparedCategory> {
        if current.is_none() && prior.is_none() {
            return None;
        }

        let groups = def
            .groups
            .iter()
            .filter_map(|group| {
                let current = current.and_then(|c| c.group(group.code)).map(|g| g.totals);
                let prior = prior.and_then(|p| p.group(group.code)).map(|g| g.totals);
                if current.is_none() && prior.is_none() {
                    return None;
                }
                Some(ComparedGroup {
                    code: group.code.to_string(),
                    name: group.name.to_string(),
                    values: ComparedBucket::new(
                        current.unwrap_or(AggregateBucket::ZERO),
                        prior.unwrap_or(AggregateBucket::ZERO),
                    ),
                })
            })
            .collect();

        Some(ComparedCategory {
            code: def.code.to_string(),
            name: def.name.to_string(),
            values: ComparedBucket::new(
                current.map_or(AggregateBucket::ZERO, |c| c.totals),
                prior.map_or(AggregateBucket::ZERO, |p| p.totals),
            ),
            groups,
        })
    }
}
