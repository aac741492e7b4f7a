//! Property-based tests for hierarchical aggregation.
//!
//! Properties: totals at each level equal the sum of the classified rows
//! beneath them, derived fields hold at every level, and aggregating the
//! same rows twice yields equal results.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::Aggregator;
use crate::classification::{ClassificationTree, Resolution};
use crate::filter::RowFilter;
use crate::ledger::{AggregateBucket, LedgerRow, UnitCode, UnitFilter};

/// Strategy for an amount between -1,000,000.00 and 1,000,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (-100_000_000i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn bucket_strategy() -> impl Strategy<Value = AggregateBucket> {
    (
        amount(),
        amount(),
        amount(),
        amount(),
        amount(),
        amount(),
        amount(),
    )
        .prop_map(
            |(initial, supplementary, cancellation, reallocation, committed, settled, paid)| {
                AggregateBucket {
                    initial_allotment: initial,
                    supplementary_allotment: supplementary,
                    allotment_cancellation: cancellation,
                    cancellation_reallocation: reallocation,
                    committed,
                    settled,
                    paid,
                }
            },
        )
}

/// Codes drawn from the standard tree plus a few that do not resolve.
fn code_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        prop::sample::select(vec!["1", "2", "3", "4", "5", "6", "7", "9"])
            .prop_map(|c| Some(c.to_string())),
    ]
}

fn row_strategy() -> impl Strategy<Value = LedgerRow> {
    (code_strategy(), code_strategy(), bucket_strategy()).prop_map(
        |(category, group, amounts)| LedgerRow {
            exercise: 2024,
            month: 6,
            unit: UnitCode::new("10901").unwrap(),
            unit_name: None,
            category,
            group,
            nature: None,
            amounts,
        },
    )
}

fn period() -> RowFilter {
    RowFilter::new(2024, 12, UnitFilter::Consolidated).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The grand total equals the sum of its categories and of every
    /// classified row.
    #[test]
    fn prop_grand_total_is_sum_of_classified_rows(
        rows in prop::collection::vec(row_strategy(), 0..60),
    ) {
        let tree = ClassificationTree::standard();
        let result = Aggregator::new(tree).aggregate(&period(), &rows);

        let from_rows: AggregateBucket = rows
            .iter()
            .filter(|r| tree.resolve(r) != Resolution::Unknown)
            .map(|r| &r.amounts)
            .sum();
        let from_categories: AggregateBucket =
            result.categories.iter().map(|c| &c.totals).sum();

        prop_assert_eq!(result.grand_total, from_rows);
        prop_assert_eq!(result.grand_total, from_categories);
    }

    /// Each category total is the sum of its groups plus the rows of that
    /// category whose group did not resolve.
    #[test]
    fn prop_category_is_sum_of_groups_and_ungrouped(
        rows in prop::collection::vec(row_strategy(), 0..60),
    ) {
        let tree = ClassificationTree::standard();
        let result = Aggregator::new(tree).aggregate(&period(), &rows);

        for category in &result.categories {
            let idx = tree.category_index(&category.code).unwrap();
            let ungrouped: AggregateBucket = rows
                .iter()
                .filter(|r| matches!(
                    tree.resolve(r),
                    Resolution::Ungrouped { category } | Resolution::Leaf { category } if category == idx
                ))
                .map(|r| &r.amounts)
                .sum();
            let groups: AggregateBucket = category.groups.iter().map(|g| &g.totals).sum();
            prop_assert_eq!(category.totals, groups + ungrouped);
        }
    }

    /// Updated allotment and balance follow their formulas at every level.
    #[test]
    fn prop_derived_fields_hold_everywhere(
        rows in prop::collection::vec(row_strategy(), 0..40),
    ) {
        let result = Aggregator::new(ClassificationTree::standard()).aggregate(&period(), &rows);

        let mut buckets = vec![result.grand_total];
        for category in &result.categories {
            buckets.push(category.totals);
            buckets.extend(category.groups.iter().map(|g| g.totals));
        }
        for bucket in buckets {
            prop_assert_eq!(
                bucket.updated_allotment(),
                bucket.initial_allotment
                    + bucket.supplementary_allotment
                    + bucket.allotment_cancellation
                    + bucket.cancellation_reallocation
            );
            prop_assert_eq!(bucket.balance(), bucket.updated_allotment() - bucket.committed);
        }
    }

    /// No surviving node is all-zero, and counters add up.
    #[test]
    fn prop_pruned_and_counted(
        rows in prop::collection::vec(row_strategy(), 0..60),
    ) {
        let result = Aggregator::new(ClassificationTree::standard()).aggregate(&period(), &rows);

        for category in &result.categories {
            prop_assert!(!category.totals.is_zero());
            for group in &category.groups {
                prop_assert!(!group.totals.is_zero());
            }
        }
        prop_assert_eq!(result.records_processed, rows.len() as u64);
        prop_assert!(result.unclassified_rows + result.ungrouped_rows <= result.records_processed);
    }

    /// Aggregating the same rows twice gives equal results.
    #[test]
    fn prop_aggregation_is_deterministic(
        rows in prop::collection::vec(row_strategy(), 0..60),
    ) {
        let aggregator = Aggregator::new(ClassificationTree::standard());
        let first = aggregator.aggregate(&period(), &rows);
        let second = aggregator.aggregate(&period(), &rows);
        prop_assert_eq!(first, second);
    }
}
