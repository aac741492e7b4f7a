//! Engine-level errors.

use std::time::Duration;

use budgetexec_shared::AppError;
use thiserror::Error;

use crate::detail::DetailError;
use crate::filter::FilterError;
use crate::source::RetrievalError;

/// Errors returned by the report engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The row source failed.
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    /// The row source did not answer in time.
    #[error("Row retrieval timed out after {after:?}")]
    RetrievalTimeout {
        /// The timeout that elapsed.
        after: Duration,
    },

    /// The requested period is invalid.
    #[error(transparent)]
    InvalidFilter(#[from] FilterError),

    /// The drill-down key is not in the classification tree.
    #[error(transparent)]
    UnknownGroup(#[from] DetailError),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Retrieval(e) => Self::ExternalService(e.to_string()),
            EngineError::RetrievalTimeout { .. } => Self::Timeout(err.to_string()),
            EngineError::InvalidFilter(e) => Self::Validation(e.to_string()),
            EngineError::UnknownGroup(e) => Self::NotFound(e.to_string()),
        }
    }
}
