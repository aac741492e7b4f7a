//! Per-nature drill-down below a category or group.

pub mod drilldown;
pub mod error;

pub use drilldown::{DetailBucket, DetailKey, DrillDown, UNCLASSIFIED};
pub use error::DetailError;
