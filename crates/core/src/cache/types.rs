//! Cache keys, settings and reports.

use std::fmt;
use std::sync::Arc;

use budgetexec_shared::config::CacheConfig;
use budgetexec_shared::StalePolicy;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Serialize, Serializer};

use crate::filter::RowFilter;
use crate::ledger::UnitFilter;

/// Identifies one period snapshot: exercise, month ceiling and unit selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CacheKey {
    /// Exercise year.
    pub exercise: i32,
    /// Last month included.
    pub month_ceiling: u8,
    /// Unit selection.
    pub unit: UnitFilter,
}

impl From<&RowFilter> for CacheKey {
    fn from(filter: &RowFilter) -> Self {
        Self {
            exercise: filter.exercise(),
            month_ceiling: filter.month_ceiling(),
            unit: filter.unit().clone(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "demonstrativo_{}_{}_{}",
            self.exercise, self.month_ceiling, self.unit
        )
    }
}

/// Cache behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// How long a built entry stays fresh.
    pub validity: TimeDelta,
    /// Maximum number of entries.
    pub max_capacity: u64,
    /// What a read does with a stale entry.
    pub stale_policy: StalePolicy,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

impl From<&CacheConfig> for CacheSettings {
    fn from(config: &CacheConfig) -> Self {
        let hours = i64::try_from(config.validity_hours).unwrap_or(i64::MAX);
        Self {
            validity: TimeDelta::try_hours(hours).unwrap_or(TimeDelta::MAX),
            max_capacity: config.max_capacity,
            stale_policy: config.stale_policy,
        }
    }
}

/// Where a lookup's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupSource {
    /// A fresh entry was already cached.
    Cached,
    /// This caller ran the build.
    Built,
    /// Another caller's build finished while this one waited.
    Shared,
    /// A stale entry was served; a background refresh was started.
    Stale,
}

/// A cached value and how it was obtained.
#[derive(Debug)]
pub struct Lookup<V> {
    /// The value, shared with every other reader of the entry.
    pub value: Arc<V>,
    /// How the value was obtained.
    pub source: LookupSource,
}

/// Lifecycle state of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    /// Built and within its validity window.
    Fresh,
    /// Built, but the validity window has elapsed.
    Stale,
    /// Never built, cleared, or discarded after a failed build.
    Absent,
}

/// State and age of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStatus {
    /// Lifecycle state.
    pub state: CacheState,
    /// When the entry was built.
    pub built_at: Option<DateTime<Utc>>,
    /// Time since the entry was built.
    #[serde(rename = "age_secs", serialize_with = "serialize_age")]
    pub age: Option<TimeDelta>,
}

impl CacheStatus {
    pub(crate) const ABSENT: Self = Self {
        state: CacheState::Absent,
        built_at: None,
        age: None,
    };
}

#[allow(clippy::ref_option)]
fn serialize_age<S: Serializer>(age: &Option<TimeDelta>, serializer: S) -> Result<S::Ok, S::Error> {
    age.map(|a| a.num_seconds()).serialize(serializer)
}

/// Summary of the cache contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Live entries.
    pub entries: usize,
    /// Entries within their validity window.
    pub fresh: usize,
    /// Entries past their validity window.
    pub stale: usize,
    /// Build time of the oldest entry.
    pub oldest_built_at: Option<DateTime<Utc>>,
    /// Build time of the newest entry.
    pub newest_built_at: Option<DateTime<Utc>>,
}
