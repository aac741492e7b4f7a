//! Core engine for budgetexec.
//!
//! This crate turns validated ledger rows into the nested budget-execution
//! totals a presentation layer renders, and decides when a computed result
//! may be reused. It has no web or database dependencies; rows come in
//! through the [`source::RowSource`] trait.
//!
//! # Modules
//!
//! - `ledger` - Ledger rows, monetary buckets, unit codes
//! - `classification` - The fixed category → group tree
//! - `filter` - Exercise, month-ceiling and unit filtering
//! - `aggregation` - Single-pass hierarchical aggregation
//! - `comparison` - Year-over-year comparison and variances
//! - `credits` - Additional credits by category
//! - `detail` - Per-nature drill-down
//! - `cache` - Result cache with single-flight builds
//! - `source` - The row-retrieval collaborator
//! - `summary` - Column totals, units with movement, available filters
//! - `service` - The report engine operations

pub mod aggregation;
pub mod cache;
pub mod classification;
pub mod comparison;
pub mod credits;
pub mod detail;
pub mod error;
pub mod filter;
pub mod ledger;
pub mod service;
pub mod source;
pub mod summary;

pub use error::EngineError;
pub use service::{EngineConfig, ReportEngine};
