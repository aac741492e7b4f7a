//! Ledger rows and the monetary bucket they fold into.
//!
//! - Ledger rows (one raw accounting entry each)
//! - Boundary validation from the source's raw shape
//! - Organizational-unit codes and the unit filter
//! - The seven-field aggregate bucket with its derived figures

pub mod bucket;
pub mod error;
pub mod row;
pub mod unit;

pub use bucket::AggregateBucket;
pub use error::RowValidationError;
pub use row::{LedgerRow, RawLedgerRow};
pub use unit::{CONSOLIDATED, UnitCode, UnitFilter};
