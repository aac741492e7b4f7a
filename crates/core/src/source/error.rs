//! Row retrieval errors.

use thiserror::Error;

use crate::ledger::RowValidationError;

/// Errors raised by a row source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrievalError {
    /// The source could not be reached.
    #[error("Row source unavailable: {0}")]
    Unavailable(String),

    /// The source was reached but the query failed.
    #[error("Row query failed: {0}")]
    Query(String),

    /// The payload could not be decoded.
    #[error("Malformed row payload: {0}")]
    Malformed(String),

    /// A decoded row failed boundary validation.
    #[error("Invalid row at index {index}: {source}")]
    InvalidRow {
        /// Position of the row in the payload.
        index: usize,
        /// What was wrong with it.
        source: RowValidationError,
    },

    /// The period's amounts are too large to total without overflowing.
    #[error("Amounts overflow the decimal range at row {index} of the period")]
    AmountOverflow {
        /// Position of the row, among the period's rows, where the running
        /// magnitude overflowed.
        index: usize,
    },
}
