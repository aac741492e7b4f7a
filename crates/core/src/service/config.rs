//! Engine configuration.

use std::time::Duration;

use budgetexec_shared::AppConfig;
use chrono::TimeDelta;

use crate::cache::CacheSettings;

/// Settings the engine runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Snapshot cache behaviour.
    pub cache: CacheSettings,
    /// How long an available-filters listing stays fresh.
    pub filters_validity: TimeDelta,
    /// Upper bound on one row-source call.
    pub retrieval_timeout: Duration,
    /// Whether drill-down accepts the unclassified sentinel keys.
    pub unclassified_detail: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for EngineConfig {
    fn from(config: &AppConfig) -> Self {
        let filters_hours = i64::try_from(config.cache.filters_validity_hours).unwrap_or(i64::MAX);
        Self {
            cache: CacheSettings::from(&config.cache),
            filters_validity: TimeDelta::try_hours(filters_hours).unwrap_or(TimeDelta::MAX),
            retrieval_timeout: Duration::from_secs(config.retrieval.timeout_secs),
            unclassified_detail: config.report.unclassified_detail,
        }
    }
}
