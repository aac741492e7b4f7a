//! Filter error types.

use thiserror::Error;

/// Errors raised when building a filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// Month ceiling outside 1..=12.
    #[error("Month ceiling must be between 1 and 12, got {0}")]
    InvalidMonthCeiling(u8),

    /// Exercise year outside 1..=9999.
    #[error("Exercise must be between 1 and 9999, got {0}")]
    InvalidExercise(i32),
}
