//! Year-over-year comparison of aggregation results.

pub mod comparator;
pub mod types;
pub mod variance;

pub use comparator::Comparator;
pub use types::{ComparedBucket, ComparedCategory, ComparedGroup, ComparisonResult, MetricVariances};
pub use variance::{Direction, Variance};
