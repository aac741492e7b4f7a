//! Result cache for period snapshots.
//!
//! Keys move through absent, building, fresh and stale. A read of an absent
//! key builds it; a read of a stale key either rebuilds it (the default) or
//! serves it while one background refresh runs, per [`StalePolicy`].
//!
//! [`StalePolicy`]: budgetexec_shared::StalePolicy

mod clock;
mod store;
mod types;

#[cfg(test)]
pub(crate) use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use store::ResultCache;
pub use types::{CacheKey, CacheSettings, CacheState, CacheStats, CacheStatus, Lookup, LookupSource};
