//! Row validation errors.

use thiserror::Error;

/// Errors raised while validating a raw row at the retrieval boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowValidationError {
    /// Reference month outside 1..=12.
    #[error("Reference month must be between 1 and 12, got {0}")]
    MonthOutOfRange(i64),

    /// The row carries no organizational-unit code.
    #[error("Row has no organizational unit code")]
    MissingUnit,
}
