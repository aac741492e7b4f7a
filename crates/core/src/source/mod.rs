//! The row-retrieval collaborator.
//!
//! The engine never talks to a database itself: it asks a [`RowSource`] for
//! the validated rows of a year range and unit selection, and for the
//! additional credits of the same selection. Retry policy, if any, belongs
//! to the source.

mod error;
mod memory;

use std::ops::RangeInclusive;

use async_trait::async_trait;

pub use error::RetrievalError;
pub use memory::InMemorySource;

use crate::credits::CreditRow;
use crate::ledger::{LedgerRow, UnitFilter};

/// Supplies ledger rows and additional-credit movements to the engine.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Fetches every row of the given exercises for the given units.
    ///
    /// The month ceiling is not pushed down; the engine filters by month.
    async fn fetch_rows(
        &self,
        years: RangeInclusive<i32>,
        unit: &UnitFilter,
    ) -> Result<Vec<LedgerRow>, RetrievalError>;

    /// Fetches every additional-credit movement of the given exercises for
    /// the given units.
    ///
    /// Sources without a credits feed report none.
    async fn fetch_credits(
        &self,
        _years: RangeInclusive<i32>,
        _unit: &UnitFilter,
    ) -> Result<Vec<CreditRow>, RetrievalError> {
        Ok(Vec::new())
    }
}
