//! Report engine over a row source and a snapshot cache.

use std::sync::Arc;
use std::time::Duration;

use budgetexec_shared::types::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::config::EngineConfig;
use crate::aggregation::{AggregationResult, Aggregator};
use crate::cache::{CacheKey, CacheStats, CacheStatus, Clock, ResultCache, SystemClock};
use crate::classification::ClassificationTree;
use crate::comparison::{Comparator, ComparisonResult};
use crate::credits::{CreditRollup, CreditRow, CreditsResult};
use crate::detail::{DetailBucket, DrillDown};
use crate::error::EngineError;
use crate::filter::RowFilter;
use crate::ledger::{LedgerRow, UnitFilter};
use crate::source::{RetrievalError, RowSource};
use crate::summary::{AvailableFilters, FinancialSummary};

/// The filtered rows of one period, their aggregation and the period's
/// additional credits.
///
/// This is what the cache stores per key, so drill-down and paging reuse the
/// rows behind a cached result instead of fetching them again.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSnapshot {
    /// The period the rows were filtered for.
    pub filter: RowFilter,
    /// Matching rows, in source order.
    pub rows: Vec<LedgerRow>,
    /// Aggregation of `rows`.
    pub result: AggregationResult,
    /// Additional credits of the period, by category.
    pub credits: CreditsResult,
}

/// Reads period snapshots through the snapshot cache.
#[derive(Clone)]
struct SnapshotLoader {
    source: Arc<dyn RowSource>,
    tree: &'static ClassificationTree,
    snapshots: ResultCache<PeriodSnapshot>,
    timeout: Duration,
}

impl SnapshotLoader {
    async fn load(&self, filter: RowFilter) -> Result<Arc<PeriodSnapshot>, EngineError> {
        let key = CacheKey::from(&filter);
        let source = Arc::clone(&self.source);
        let tree = self.tree;
        let timeout = self.timeout;

        let lookup = self
            .snapshots
            .get_or_build(key, move || build_snapshot(source, tree, filter, timeout))
            .await?;
        debug!(period = %lookup.value.filter, source = ?lookup.source, "snapshot ready");
        Ok(lookup.value)
    }

    async fn load_with_prior(
        &self,
        filter: RowFilter,
    ) -> Result<(Arc<PeriodSnapshot>, Arc<PeriodSnapshot>), EngineError> {
        let prior = filter.prior_year();
        tokio::try_join!(self.load(filter), self.load(prior))
    }
}

/// Budget-execution report engine.
pub struct ReportEngine {
    loader: SnapshotLoader,
    filters: ResultCache<AvailableFilters>,
    config: EngineConfig,
}

impl std::fmt::Debug for ReportEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportEngine")
            .field("snapshots", &self.loader.snapshots)
            .field("filters", &self.filters)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ReportEngine {
    /// Creates an engine on the system clock and the standard tree.
    #[must_use]
    pub fn new(source: Arc<dyn RowSource>, config: EngineConfig) -> Self {
        Self::with_clock(source, config, Arc::new(SystemClock))
    }

    /// Creates an engine with an explicit clock.
    #[must_use]
    pub fn with_clock(source: Arc<dyn RowSource>, config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            loader: SnapshotLoader {
                source,
                tree: ClassificationTree::standard(),
                snapshots: ResultCache::new(config.cache, Arc::clone(&clock)),
                timeout: config.retrieval_timeout,
            },
            filters: ResultCache::new(config.cache, clock),
            config,
        }
    }

    /// Settings in effect.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the snapshot for `filter`, building it on a cache miss.
    pub async fn snapshot(&self, filter: RowFilter) -> Result<Arc<PeriodSnapshot>, EngineError> {
        self.loader.load(filter).await
    }

    async fn snapshots_with_prior(
        &self,
        filter: RowFilter,
    ) -> Result<(Arc<PeriodSnapshot>, Arc<PeriodSnapshot>), EngineError> {
        self.loader.load_with_prior(filter).await
    }

    /// Aggregation of one period.
    pub async fn get_demonstrativo(
        &self,
        year: i32,
        month_ceiling: u8,
        unit: &UnitFilter,
    ) -> Result<AggregationResult, EngineError> {
        let filter = RowFilter::new(year, month_ceiling, unit.clone())?;
        Ok(self.snapshot(filter).await?.result.clone())
    }

    /// Aggregation of one period against the same period a year earlier.
    pub async fn get_comparative_demonstrativo(
        &self,
        year: i32,
        month_ceiling: u8,
        unit: &UnitFilter,
    ) -> Result<ComparisonResult, EngineError> {
        let filter = RowFilter::new(year, month_ceiling, unit.clone())?;
        let (current, prior) = self.snapshots_with_prior(filter).await?;
        Ok(Comparator::new(self.loader.tree).compare(&current.result, &prior.result))
    }

    /// Additional credits of one period, by category.
    pub async fn get_credits(
        &self,
        year: i32,
        month_ceiling: u8,
        unit: &UnitFilter,
    ) -> Result<CreditsResult, EngineError> {
        let filter = RowFilter::new(year, month_ceiling, unit.clone())?;
        Ok(self.snapshot(filter).await?.credits.clone())
    }

    /// Per-nature breakdown of one category or group.
    ///
    /// `group = None` drills into the whole category. With `compare`, each
    /// nature carries the prior year's totals and variances.
    pub async fn get_group_detail(
        &self,
        category: &str,
        group: Option<&str>,
        year: i32,
        month_ceiling: u8,
        unit: &UnitFilter,
        compare: bool,
    ) -> Result<Vec<DetailBucket>, EngineError> {
        let drilldown =
            DrillDown::new(self.loader.tree).with_unclassified(self.config.unclassified_detail);
        let key = drilldown.key(category, group)?;
        let filter = RowFilter::new(year, month_ceiling, unit.clone())?;

        if compare {
            let (current, prior) = self.snapshots_with_prior(filter).await?;
            Ok(drilldown.detail(key, &current.rows, Some(&prior.rows)))
        } else {
            let current = self.snapshot(filter).await?;
            Ok(drilldown.detail(key, &current.rows, None))
        }
    }

    /// Record counts and column totals of a period and the year before it.
    pub async fn get_summary(
        &self,
        year: i32,
        month_ceiling: u8,
        unit: &UnitFilter,
    ) -> Result<FinancialSummary, EngineError> {
        let filter = RowFilter::new(year, month_ceiling, unit.clone())?;
        let (current, prior) = self.snapshots_with_prior(filter).await?;
        Ok(FinancialSummary::from_rows(prior.rows.iter().chain(&current.rows)))
    }

    /// Exercises, months and units with movement across all units, for a
    /// period and the year before it.
    ///
    /// The listing is cached on its own for `filters_validity`, which may
    /// outlive the snapshots it was built from.
    pub async fn get_available_filters(
        &self,
        year: i32,
        month_ceiling: u8,
    ) -> Result<AvailableFilters, EngineError> {
        let filter = RowFilter::new(year, month_ceiling, UnitFilter::Consolidated)?;
        let key = CacheKey::from(&filter);
        let loader = self.loader.clone();

        let lookup = self
            .filters
            .get_or_build_with_validity(key, self.config.filters_validity, move || async move {
                let (current, prior) = loader.load_with_prior(filter).await?;
                Ok::<_, EngineError>(AvailableFilters::from_rows(
                    prior.rows.iter().chain(&current.rows),
                ))
            })
            .await?;
        Ok(AvailableFilters::clone(&lookup.value))
    }

    /// One page of a period's filtered rows, in source order.
    pub async fn get_rows_page(
        &self,
        year: i32,
        month_ceiling: u8,
        unit: &UnitFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<LedgerRow>, EngineError> {
        let filter = RowFilter::new(year, month_ceiling, unit.clone())?;
        let snapshot = self.snapshot(filter).await?;
        let total = snapshot.rows.len() as u64;
        Ok(PageResponse::paginate(snapshot.rows.iter().cloned(), total, page))
    }

    /// Drops every cached snapshot and filters listing.
    pub fn invalidate_cache(&self) {
        self.loader.snapshots.invalidate_all();
        self.filters.invalidate_all();
    }

    /// Drops the cached snapshot and filters listing of one key.
    pub async fn invalidate_key(&self, key: &CacheKey) {
        self.loader.snapshots.invalidate(key).await;
        self.filters.invalidate(key).await;
    }

    /// State and age of one cached snapshot.
    pub async fn cache_status(&self, key: &CacheKey) -> CacheStatus {
        self.loader.snapshots.status(key).await
    }

    /// State and age of one cached filters listing.
    pub async fn filters_cache_status(&self, key: &CacheKey) -> CacheStatus {
        self.filters.status(key).await
    }

    /// Drops stale snapshots and filters listings, returning how many.
    pub async fn purge_expired(&self) -> usize {
        self.loader.snapshots.purge_expired().await + self.filters.purge_expired().await
    }

    /// Snapshot cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.loader.snapshots.stats()
    }
}

async fn build_snapshot(
    source: Arc<dyn RowSource>,
    tree: &'static ClassificationTree,
    filter: RowFilter,
    timeout: Duration,
) -> Result<PeriodSnapshot, EngineError> {
    let year = filter.exercise();
    let (fetched, fetched_credits) = tokio::time::timeout(timeout, async {
        tokio::try_join!(
            source.fetch_rows(year..=year, filter.unit()),
            source.fetch_credits(year..=year, filter.unit()),
        )
    })
    .await
    .map_err(|_| EngineError::RetrievalTimeout { after: timeout })??;

    let fetched_count = fetched.len();
    let rows = filter.retain(fetched);
    let credit_rows: Vec<CreditRow> = fetched_credits
        .into_iter()
        .filter(|credit| filter.covers(credit.exercise, credit.month, &credit.unit))
        .collect();
    debug!(
        period = %filter,
        fetched = fetched_count,
        matched = rows.len(),
        credits = credit_rows.len(),
        "rows filtered"
    );

    ensure_summable(rows.iter().map(|row| row.amounts.magnitude()))?;
    ensure_summable(credit_rows.iter().map(|credit| credit.amounts.magnitude()))?;

    let result = Aggregator::new(tree).aggregate(&filter, &rows);
    let credits = CreditRollup::new(tree).rollup(&filter, &credit_rows);
    info!(
        period = %filter,
        records = result.records_processed,
        unclassified = result.unclassified_rows,
        credit_records = credits.records_processed,
        "snapshot built"
    );

    Ok(PeriodSnapshot {
        filter,
        rows,
        result,
        credits,
    })
}

/// Rejects a period whose amounts could overflow once totalled.
///
/// Reports combine at most two periods, so twice the summed magnitude of
/// one period must fit in a decimal.
fn ensure_summable<I>(magnitudes: I) -> Result<(), RetrievalError>
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    let mut total = Decimal::ZERO;
    for (index, magnitude) in magnitudes.into_iter().enumerate() {
        total = magnitude
            .and_then(|m| m.checked_mul(Decimal::TWO))
            .and_then(|m| total.checked_add(m))
            .ok_or(RetrievalError::AmountOverflow { index })?;
    }
    Ok(())
}
