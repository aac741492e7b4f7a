//! Additional credits (créditos adicionais) by category.
//!
//! Credits come from their own source feed, not from the ledger rows, and
//! are totalled per category over the same period filter.

pub mod bucket;
pub mod rollup;
pub mod row;

pub use bucket::CreditBucket;
pub use rollup::{CreditCategory, CreditRollup, CreditsResult};
pub use row::{CreditRow, RawCreditRow};
