//! Read-through result cache with single-flight builds.
//!
//! Entries are stamped with their build time and a validity window and aged
//! against an injected [`Clock`]. Builds for one key are serialized through
//! moka's per-key compute lock: a caller that finds the key absent or stale
//! runs the build while every other caller of that key waits and then reuses
//! the entry it produced.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use budgetexec_shared::StalePolicy;
use chrono::{DateTime, TimeDelta, Utc};
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use tracing::{debug, info, warn};

use super::clock::Clock;
use super::types::{
    CacheKey, CacheSettings, CacheState, CacheStats, CacheStatus, Lookup, LookupSource,
};

struct CachedEntry<V> {
    value: Arc<V>,
    built_at: DateTime<Utc>,
    validity: TimeDelta,
    generation: u64,
}

// Manual impl: cloning an entry clones the Arc, never the value.
impl<V> Clone for CachedEntry<V> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            built_at: self.built_at,
            validity: self.validity,
            generation: self.generation,
        }
    }
}

impl<V> CachedEntry<V> {
    /// `None` when the entry predates the last clear.
    fn state(&self, now: DateTime<Utc>, generation: u64) -> Option<CacheState> {
        if self.generation != generation {
            return None;
        }
        if now - self.built_at <= self.validity {
            Some(CacheState::Fresh)
        } else {
            Some(CacheState::Stale)
        }
    }

    fn is_fresh(&self, now: DateTime<Utc>, generation: u64) -> bool {
        self.state(now, generation) == Some(CacheState::Fresh)
    }
}

/// Keyed cache of built results.
pub struct ResultCache<V> {
    entries: Cache<CacheKey, CachedEntry<V>>,
    generation: Arc<AtomicU64>,
    clock: Arc<dyn Clock>,
    settings: CacheSettings,
}

impl<V> Clone for ResultCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            generation: Arc::clone(&self.generation),
            clock: Arc::clone(&self.clock),
            settings: self.settings,
        }
    }
}

impl<V> fmt::Debug for ResultCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultCache")
            .field("settings", &self.settings)
            .field("generation", &self.generation.load(Ordering::Acquire))
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl<V> ResultCache<V>
where
    V: Send + Sync + 'static,
{
    /// Creates an empty cache.
    #[must_use]
    pub fn new(settings: CacheSettings, clock: Arc<dyn Clock>) -> Self {
        let entries = Cache::builder().max_capacity(settings.max_capacity).build();
        Self {
            entries,
            generation: Arc::new(AtomicU64::new(0)),
            clock,
            settings,
        }
    }

    /// Settings in effect.
    #[must_use]
    pub const fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Returns the cached value for `key`, building it if absent or stale.
    ///
    /// At most one build runs per key at a time. Concurrent callers of the
    /// same key wait for that build and share its value. A failed build is
    /// returned to the caller that ran it and leaves the key absent.
    pub async fn get_or_build<F, Fut, E>(&self, key: CacheKey, build: F) -> Result<Lookup<V>, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: fmt::Display + Send + Sync + 'static,
    {
        self.get_or_build_with_validity(key, self.settings.validity, build)
            .await
    }

    /// Like [`get_or_build`](Self::get_or_build), with a validity window for
    /// this entry only.
    pub async fn get_or_build_with_validity<F, Fut, E>(
        &self,
        key: CacheKey,
        validity: TimeDelta,
        build: F,
    ) -> Result<Lookup<V>, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: fmt::Display + Send + Sync + 'static,
    {
        if let Some(entry) = self.entries.get(&key).await {
            match entry.state(self.clock.now(), self.current_generation()) {
                Some(CacheState::Fresh) => {
                    debug!(key = %key, "cache hit");
                    return Ok(Lookup {
                        value: entry.value,
                        source: LookupSource::Cached,
                    });
                }
                Some(CacheState::Stale) if self.settings.stale_policy == StalePolicy::ServeStale => {
                    info!(key = %key, built_at = %entry.built_at, "serving stale entry, refreshing");
                    self.spawn_refresh(key, validity, build);
                    return Ok(Lookup {
                        value: entry.value,
                        source: LookupSource::Stale,
                    });
                }
                _ => {}
            }
        }

        self.build_through(key, validity, build).await
    }

    fn spawn_refresh<F, Fut, E>(&self, key: CacheKey, validity: TimeDelta, build: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: fmt::Display + Send + Sync + 'static,
    {
        let cache = self.clone();
        tokio::spawn(async move {
            if let Ok(lookup) = cache.build_through(key, validity, build).await {
                debug!(source = ?lookup.source, "background refresh finished");
            }
        });
    }

    async fn build_through<F, Fut, E>(
        &self,
        key: CacheKey,
        validity: TimeDelta,
        build: F,
    ) -> Result<Lookup<V>, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: fmt::Display + Send + Sync + 'static,
    {
        let clock = Arc::clone(&self.clock);
        let generations = Arc::clone(&self.generation);

        let outcome = self
            .entries
            .entry(key.clone())
            .and_try_compute_with(|current| async move {
                // Read inside the lock so a clear during the build is detected.
                let generation = generations.load(Ordering::Acquire);
                if current.is_some_and(|entry| entry.value().is_fresh(clock.now(), generation)) {
                    return Ok(Op::Nop);
                }
                let value = build().await?;
                Ok(Op::Put(CachedEntry {
                    value: Arc::new(value),
                    built_at: clock.now(),
                    validity,
                    generation,
                }))
            })
            .await;

        match outcome {
            Ok(CompResult::Inserted(entry) | CompResult::ReplacedWith(entry)) => {
                let entry = entry.into_value();
                info!(key = %key, built_at = %entry.built_at, "cache entry built");
                Ok(Lookup {
                    value: entry.value,
                    source: LookupSource::Built,
                })
            }
            Ok(CompResult::Unchanged(entry)) => {
                debug!(key = %key, "reused concurrent build");
                Ok(Lookup {
                    value: entry.into_value().value,
                    source: LookupSource::Shared,
                })
            }
            Ok(CompResult::StillNone(_) | CompResult::Removed(_)) => {
                unreachable!("compute only skips over a present entry and never removes")
            }
            Err(err) => {
                warn!(key = %key, error = %err, "cache build failed");
                self.discard_unusable(&key).await;
                Err(err)
            }
        }
    }

    /// Drops a stale or pre-clear entry so the key reads as absent.
    async fn discard_unusable(&self, key: &CacheKey) {
        let clock = Arc::clone(&self.clock);
        let generations = Arc::clone(&self.generation);
        let _ = self
            .entries
            .entry(key.clone())
            .and_compute_with(|current| async move {
                let generation = generations.load(Ordering::Acquire);
                match current {
                    Some(entry) if !entry.value().is_fresh(clock.now(), generation) => Op::Remove,
                    _ => Op::Nop,
                }
            })
            .await;
    }

    /// State and age of one key.
    pub async fn status(&self, key: &CacheKey) -> CacheStatus {
        let Some(entry) = self.entries.get(key).await else {
            return CacheStatus::ABSENT;
        };
        let now = self.clock.now();
        match entry.state(now, self.current_generation()) {
            Some(state) => CacheStatus {
                state,
                built_at: Some(entry.built_at),
                age: Some(now - entry.built_at),
            },
            None => CacheStatus::ABSENT,
        }
    }

    /// Removes every entry.
    ///
    /// Builds in flight when this is called still answer their own waiters,
    /// but their entries are never served to later readers.
    pub fn invalidate_all(&self) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.entries.invalidate_all();
        info!(generation, "cache cleared");
    }

    /// Removes one entry.
    pub async fn invalidate(&self, key: &CacheKey) {
        self.entries.invalidate(key).await;
        info!(key = %key, "cache entry invalidated");
    }

    /// Removes stale and pre-clear entries, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let generation = self.current_generation();
        let expired: Vec<Arc<CacheKey>> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.state(now, generation) != Some(CacheState::Fresh))
            .map(|(key, _)| key)
            .collect();

        for key in &expired {
            self.entries.invalidate(key.as_ref()).await;
        }
        if !expired.is_empty() {
            info!(removed = expired.len(), "expired cache entries purged");
        }
        expired.len()
    }

    /// Entry counts and build-time range of the live entries.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let generation = self.current_generation();
        self.entries
            .iter()
            .filter_map(|(_, entry)| entry.state(now, generation).map(|state| (state, entry.built_at)))
            .fold(CacheStats::default(), |mut stats, (state, built_at)| {
                stats.entries += 1;
                match state {
                    CacheState::Fresh => stats.fresh += 1,
                    _ => stats.stale += 1,
                }
                stats.oldest_built_at = Some(stats.oldest_built_at.map_or(built_at, |t| t.min(built_at)));
                stats.newest_built_at = Some(stats.newest_built_at.map_or(built_at, |t| t.max(built_at)));
                stats
            })
    }
}
