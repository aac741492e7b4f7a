//! Single-pass aggregation over filtered rows.

use tracing::{debug, warn};

use super::types::{AggregationResult, CategoryNode, GroupNode};
use crate::classification::{ClassificationTree, Resolution};
use crate::filter::RowFilter;
use crate::ledger::{AggregateBucket, LedgerRow};

/// Folds ledger rows into category and group totals.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator<'t> {
    tree: &'t ClassificationTree,
}

struct CategoryAccumulator {
    totals: AggregateBucket,
    groups: Vec<AggregateBucket>,
}

impl<'t> Aggregator<'t> {
    /// Creates an aggregator over a classification tree.
    #[must_use]
    pub const fn new(tree: &'t ClassificationTree) -> Self {
        Self { tree }
    }

    /// Aggregates rows already narrowed by `period`.
    ///
    /// One pass over the rows; memory is proportional to the number of
    /// classification nodes. The period is recorded on the result, not
    /// re-applied.
    #[must_use]
    pub fn aggregate<'a, I>(&self, period: &RowFilter, rows: I) -> AggregationResult
    where
        I: IntoIterator<Item = &'a LedgerRow>,
    {
        let mut accumulators: Vec<CategoryAccumulator> = self
            .tree
            .categories()
            .iter()
            .map(|category| CategoryAccumulator {
                totals: AggregateBucket::ZERO,
                groups: vec![AggregateBucket::ZERO; category.groups.len()],
            })
            .collect();

        let mut records_processed = 0u64;
        let mut unclassified_rows = 0u64;
        let mut ungrouped_rows = 0u64;

        for row in rows {
            records_processed += 1;
            match self.tree.resolve(row) {
                Resolution::Group { category, group } => {
                    let acc = &mut accumulators[category];
                    acc.totals.accumulate(&row.amounts);
                    acc.groups[group].accumulate(&row.amounts);
                }
                Resolution::Leaf { category } => {
                    accumulators[category].totals.accumulate(&row.amounts);
                }
                Resolution::Ungrouped { category } => {
                    ungrouped_rows += 1;
                    accumulators[category].totals.accumulate(&row.amounts);
                }
                Resolution::Unknown => unclassified_rows += 1,
            }
        }

        if unclassified_rows > 0 {
            warn!(
                period = %period,
                unclassified_rows,
                "rows with unknown category excluded from hierarchy totals"
            );
        }
        if ungrouped_rows > 0 {
            warn!(
                period = %period,
                ungrouped_rows,
                "rows with unknown group counted at category level only"
            );
        }

        let categories: Vec<CategoryNode> = self
            .tree
            .categories()
            .iter()
            .zip(accumulators)
            .filter(|(_, acc)| !acc.totals.is_zero())
            .map(|(def, acc)| CategoryNode {
                code: def.code.to_string(),
                name: def.name.to_string(),
                totals: acc.totals,
                groups: def
                    .groups
                    .iter()
                    .zip(acc.groups)
                    .filter(|(_, totals)| !totals.is_zero())
                    .map(|(group, totals)| GroupNode {
                        code: group.code.to_string(),
                        name: group.name.to_string(),
                        totals,
                    })
                    .collect(),
            })
            .collect();

        let grand_total: AggregateBucket = categories.iter().map(|c| &c.totals).sum();

        debug!(
            period = %period,
            records_processed,
            categories = categories.len(),
            "aggregation complete"
        );

        AggregationResult {
            period: period.clone(),
            grand_total,
            categories,
            records_processed,
            unclassified_rows,
            ungrouped_rows,
        }
    }
}
