//! Narrowing raw rows by exercise, month ceiling and organizational unit.

pub mod error;
pub mod row_filter;

pub use error::FilterError;
pub use row_filter::{EXERCISE_RANGE, RowFilter};
