//! Groups the rows under one classification key by nature code.

use std::collections::BTreeMap;

use serde::Serialize;

use super::error::DetailError;
use crate::classification::{ClassificationTree, Resolution};
use crate::comparison::MetricVariances;
use crate::ledger::{AggregateBucket, LedgerRow};

/// Sentinel code for rows without a nature code, and for the drill-down key
/// of rows whose classification did not resolve.
pub const UNCLASSIFIED: &str = "unclassified";

/// A resolved drill-down key, as indices into the classification tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailKey {
    /// Rows of one group.
    Group {
        /// Category index.
        category: usize,
        /// Group index within the category.
        group: usize,
    },
    /// Every row of one category.
    Category {
        /// Category index.
        category: usize,
    },
    /// Rows of a known category whose group did not resolve.
    Ungrouped {
        /// Category index.
        category: usize,
    },
    /// Rows whose category did not resolve.
    Unclassified,
}

impl DetailKey {
    fn admits(self, resolution: Resolution) -> bool {
        match (self, resolution) {
            (
                Self::Group { category, group },
                Resolution::Group {
                    category: c,
                    group: g,
                },
            ) => category == c && group == g,
            (Self::Category { category }, resolution) => resolution.category() == Some(category),
            (Self::Ungrouped { category }, Resolution::Ungrouped { category: c }) => category == c,
            (Self::Unclassified, Resolution::Unknown) => true,
            _ => false,
        }
    }
}

/// Totals for one nature code, optionally against the prior period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailBucket {
    /// Nature code, or [`UNCLASSIFIED`].
    pub nature: String,
    /// Current-period totals.
    pub current: AggregateBucket,
    /// Prior-period totals, when comparing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior: Option<AggregateBucket>,
    /// Variances of current against prior, when comparing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variances: Option<MetricVariances>,
}

/// Drill-down over already-filtered row sets.
#[derive(Debug, Clone, Copy)]
pub struct DrillDown<'t> {
    tree: &'t ClassificationTree,
    include_unclassified: bool,
}

impl<'t> DrillDown<'t> {
    /// Creates a drill-down that rejects the unclassified sentinel keys.
    #[must_use]
    pub const fn new(tree: &'t ClassificationTree) -> Self {
        Self {
            tree,
            include_unclassified: false,
        }
    }

    /// Allows drilling into rows whose category or group did not resolve.
    #[must_use]
    pub const fn with_unclassified(mut self, include: bool) -> Self {
        self.include_unclassified = include;
        self
    }

    /// Resolves a category and optional group code into a key.
    ///
    /// `group = None` selects the whole category. [`UNCLASSIFIED`] as the
    /// category (or as the group of a known category) selects unresolved
    /// rows, and is only accepted when unclassified detail is enabled.
    ///
    /// # Errors
    ///
    /// Returns `DetailError::UnknownGroup` if the pair is not in the tree.
    pub fn key(&self, category: &str, group: Option<&str>) -> Result<DetailKey, DetailError> {
        let unknown = || DetailError::UnknownGroup {
            category: category.to_string(),
            group: group.map(String::from),
        };

        if category == UNCLASSIFIED {
            return if self.include_unclassified && group.is_none_or(|g| g == UNCLASSIFIED) {
                Ok(DetailKey::Unclassified)
            } else {
                Err(unknown())
            };
        }

        let category_idx = self.tree.category_index(category).ok_or_else(unknown)?;
        match group {
            None => Ok(DetailKey::Category {
                category: category_idx,
            }),
            Some(UNCLASSIFIED) if self.include_unclassified => Ok(DetailKey::Ungrouped {
                category: category_idx,
            }),
            Some(group) => self.tree.categories()[category_idx]
                .group_index(group)
                .map(|group_idx| DetailKey::Group {
                    category: category_idx,
                    group: group_idx,
                })
                .ok_or_else(unknown),
        }
    }

    /// Per-nature totals of the rows under `key`, sorted by nature code.
    ///
    /// With `prior`, natures present on either side appear once, the missing
    /// side as zero, each with its variances.
    #[must_use]
    pub fn detail(
        &self,
        key: DetailKey,
        current: &[LedgerRow],
        prior: Option<&[LedgerRow]>,
    ) -> Vec<DetailBucket> {
        let current_by_nature = self.by_nature(key, current);

        let Some(prior) = prior else {
            return current_by_nature
                .into_iter()
                .map(|(nature, current)| DetailBucket {
                    nature,
                    current,
                    prior: None,
                    variances: None,
                })
                .collect();
        };

        let mut merged: BTreeMap<String, (AggregateBucket, AggregateBucket)> = current_by_nature
            .into_iter()
            .map(|(nature, bucket)| (nature, (bucket, AggregateBucket::ZERO)))
            .collect();
        for (nature, bucket) in self.by_nature(key, prior) {
            merged.entry(nature).or_default().1 = bucket;
        }

        merged
            .into_iter()
            .map(|(nature, (current, prior))| DetailBucket {
                nature,
                current,
                prior: Some(prior),
                variances: Some(MetricVariances::between(&current, &prior)),
            })
            .collect()
    }

    fn by_nature(&self, key: DetailKey, rows: &[LedgerRow]) -> BTreeMap<String, AggregateBucket> {
        let mut natures: BTreeMap<String, AggregateBucket> = BTreeMap::new();
        for row in rows.iter().filter(|row| key.admits(self.tree.resolve(row))) {
            let nature = row
                .nature
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or(UNCLASSIFIED);
            if let Some(bucket) = natures.get_mut(nature) {
                bucket.accumulate(&row.amounts);
            } else {
                natures.insert(nature.to_string(), row.amounts);
            }
        }
        natures
    }
}
