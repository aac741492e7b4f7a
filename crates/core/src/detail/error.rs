//! Drill-down errors.

use thiserror::Error;

/// Errors resolving a drill-down key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetailError {
    /// The category/group pair is not in the classification tree, or names
    /// the unclassified sentinel while unclassified detail is disabled.
    #[error("Unknown classification key {category}/{}", group.as_deref().unwrap_or("*"))]
    UnknownGroup {
        /// Requested category code.
        category: String,
        /// Requested group code, if any.
        group: Option<String>,
    },
}
