//! The operations exposed to the presentation layer.
//!
//! [`ReportEngine`] is the explicit context every call goes through: it owns
//! the row source, the classification tree and the snapshot cache. There is
//! no module-level state.

mod config;
mod engine;

#[cfg(test)]
mod tests;

pub use config::EngineConfig;
pub use engine::{PeriodSnapshot, ReportEngine};
