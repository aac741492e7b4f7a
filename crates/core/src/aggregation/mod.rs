//! Folding filtered rows into the category → group hierarchy.

pub mod aggregator;
pub mod types;

#[cfg(test)]
mod props;

pub use aggregator::Aggregator;
pub use types::{AggregationResult, CategoryNode, GroupNode};
