//! Engine tests over in-memory and scripted row sources.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use budgetexec_shared::types::PageRequest;
use chrono::TimeDelta;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{EngineConfig, ReportEngine};
use crate::cache::{CacheKey, CacheState, ManualClock};
use crate::credits::{CreditBucket, CreditRow};
use crate::detail::UNCLASSIFIED;
use crate::error::EngineError;
use crate::filter::FilterError;
use crate::ledger::{AggregateBucket, LedgerRow, UnitCode, UnitFilter};
use crate::source::{InMemorySource, RetrievalError, RowSource};

fn row(exercise: i32, month: u8, unit: &str, nature: &str, committed: Decimal) -> LedgerRow {
    let mut digits = nature.chars();
    LedgerRow {
        exercise,
        month,
        unit: UnitCode::new(unit).unwrap(),
        unit_name: Some(format!("UG {unit}")),
        category: digits.next().map(String::from),
        group: digits.next().map(String::from),
        nature: Some(nature.to_string()),
        amounts: AggregateBucket {
            initial_allotment: dec!(1000),
            committed,
            settled: committed,
            paid: committed,
            ..AggregateBucket::ZERO
        },
    }
}

fn ledger() -> Vec<LedgerRow> {
    vec![
        row(2024, 3, "10901", "33903900", dec!(100)),
        row(2024, 5, "10901", "33903900", dec!(50)),
        row(2024, 2, "20000", "31901100", dec!(400)),
        row(2024, 4, "20000", "44905200", dec!(80)),
        row(2024, 1, "10901", "71000000", dec!(9)),
        row(2023, 3, "10901", "33903900", dec!(80)),
        row(2023, 2, "20000", "31901100", dec!(400)),
        row(2023, 8, "20000", "46907100", dec!(30)),
    ]
}

fn credit(exercise: i32, month: u8, unit: &str, category: &str, supplementary: Decimal) -> CreditRow {
    CreditRow {
        exercise,
        month,
        unit: UnitCode::new(unit).unwrap(),
        category: Some(category.to_string()),
        group: None,
        amounts: CreditBucket {
            supplementary,
            total_changes: supplementary,
            ..CreditBucket::ZERO
        },
    }
}

fn credits() -> Vec<CreditRow> {
    vec![
        credit(2024, 2, "10901", "3", dec!(500)),
        credit(2024, 3, "20000", "3", dec!(120)),
        credit(2024, 4, "20000", "4", dec!(60)),
        credit(2024, 9, "10901", "4", dec!(1000)),
        credit(2024, 3, "10901", "8", dec!(7)),
        credit(2023, 3, "10901", "3", dec!(90)),
    ]
}

fn engine_over(rows: Vec<LedgerRow>, config: EngineConfig) -> (ReportEngine, Arc<InMemorySource>) {
    let source = Arc::new(InMemorySource::new(rows));
    (ReportEngine::new(source.clone(), config), source)
}

fn engine() -> (ReportEngine, Arc<InMemorySource>) {
    engine_over(ledger(), EngineConfig::default())
}

fn unit(code: &str) -> UnitFilter {
    UnitFilter::from_optional(Some(code))
}

fn key(year: i32, month: u8, unit: UnitFilter) -> CacheKey {
    CacheKey {
        exercise: year,
        month_ceiling: month,
        unit,
    }
}

/// Counts calls and answers after a delay.
#[derive(Debug)]
struct SlowSource {
    inner: InMemorySource,
    delay: Duration,
    calls: AtomicUsize,
}

#[async_trait]
impl RowSource for SlowSource {
    async fn fetch_rows(
        &self,
        years: RangeInclusive<i32>,
        unit: &UnitFilter,
    ) -> Result<Vec<LedgerRow>, RetrievalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.inner.fetch_rows(years, unit).await
    }
}

/// Fails the first `failures` calls.
#[derive(Debug)]
struct FlakySource {
    inner: InMemorySource,
    failures: AtomicUsize,
}

#[async_trait]
impl RowSource for FlakySource {
    async fn fetch_rows(
        &self,
        years: RangeInclusive<i32>,
        unit: &UnitFilter,
    ) -> Result<Vec<LedgerRow>, RetrievalError> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(RetrievalError::Unavailable("connection refused".into()));
        }
        self.inner.fetch_rows(years, unit).await
    }
}

// ============================================================================
// Reports
// ============================================================================

#[tokio::test]
async fn test_demonstrativo_filters_and_aggregates() {
    let (engine, _) = engine();
    let result = engine.get_demonstrativo(2024, 4, &unit("10901")).await.unwrap();

    assert_eq!(result.records_processed, 2);
    assert_eq!(result.unclassified_rows, 1);
    assert_eq!(result.grand_total.committed, dec!(100));
    assert_eq!(result.group("3", "3").unwrap().totals.committed, dec!(100));
    assert!(result.category("4").is_none());
}

#[tokio::test]
async fn test_consolidated_demonstrativo() {
    let (engine, _) = engine();
    let result = engine
        .get_demonstrativo(2024, 12, &UnitFilter::Consolidated)
        .await
        .unwrap();

    assert_eq!(result.grand_total.committed, dec!(630));
    assert_eq!(result.category("3").unwrap().totals.committed, dec!(550));
    assert_eq!(result.group("4", "4").unwrap().totals.committed, dec!(80));
}

#[tokio::test]
async fn test_empty_period_is_well_formed() {
    let (engine, _) = engine();
    let result = engine.get_demonstrativo(2030, 12, &unit("10901")).await.unwrap();
    assert!(result.is_empty());
    assert!(result.grand_total.is_zero());
}

#[tokio::test]
async fn test_comparative_derives_prior_year() {
    let (engine, _) = engine();
    let result = engine
        .get_comparative_demonstrativo(2024, 6, &UnitFilter::Consolidated)
        .await
        .unwrap();

    assert_eq!(result.prior_period.exercise(), 2023);
    assert_eq!(result.prior_period.month_ceiling(), 6);

    let other_current = result.group("3", "3").unwrap();
    assert_eq!(other_current.values.current.committed, dec!(150));
    assert_eq!(other_current.values.prior.committed, dec!(80));
    assert_eq!(other_current.values.variances.committed.to_string(), "+87.50%");

    let personnel = result.group("3", "1").unwrap();
    assert_eq!(personnel.values.variances.paid.to_string(), "0.00%");

    let investments = result.group("4", "4").unwrap();
    assert!(investments.values.prior.is_zero());
    assert_eq!(investments.values.variances.committed.to_string(), "+100.00%");

    // August 2023 is past the ceiling.
    assert!(result.group("4", "6").is_none());
    assert_eq!(result.records_current, 5);
    assert_eq!(result.records_prior, 2);
}

#[tokio::test]
async fn test_invalid_month_ceiling() {
    let (engine, source) = engine();
    let err = engine
        .get_demonstrativo(2024, 13, &UnitFilter::Consolidated)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidFilter(FilterError::InvalidMonthCeiling(13)));
    assert_eq!(source.fetch_count(), 0);
}

#[tokio::test]
async fn test_out_of_range_exercise_rejected_before_fetching() {
    let (engine, source) = engine();
    let err = engine
        .get_comparative_demonstrativo(i32::MIN, 12, &UnitFilter::Consolidated)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidFilter(FilterError::InvalidExercise(i32::MIN)));
    assert_eq!(source.fetch_count(), 0);
}

// ============================================================================
// Drill-down
// ============================================================================

#[tokio::test]
async fn test_group_detail_with_comparison() {
    let (engine, _) = engine();
    let detail = engine
        .get_group_detail("3", Some("3"), 2024, 12, &unit("10901"), true)
        .await
        .unwrap();

    assert_eq!(detail.len(), 1);
    assert_eq!(detail[0].nature, "33903900");
    assert_eq!(detail[0].current.committed, dec!(150));
    assert_eq!(detail[0].prior.unwrap().committed, dec!(80));
    assert_eq!(detail[0].variances.unwrap().committed.to_string(), "+87.50%");
}

#[tokio::test]
async fn test_group_detail_without_comparison() {
    let (engine, source) = engine();
    let detail = engine
        .get_group_detail("3", None, 2024, 12, &UnitFilter::Consolidated, false)
        .await
        .unwrap();

    let natures: Vec<&str> = detail.iter().map(|d| d.nature.as_str()).collect();
    assert_eq!(natures, vec!["31901100", "33903900"]);
    assert!(detail.iter().all(|d| d.prior.is_none()));
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn test_unknown_group_rejected_before_fetching() {
    let (engine, source) = engine();
    let err = engine
        .get_group_detail("3", Some("6"), 2024, 12, &UnitFilter::Consolidated, true)
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::UnknownGroup(_)));
    assert_eq!(source.fetch_count(), 0);
}

#[tokio::test]
async fn test_unclassified_detail_follows_config() {
    let (engine, _) = engine();
    assert!(
        engine
            .get_group_detail(UNCLASSIFIED, None, 2024, 12, &UnitFilter::Consolidated, false)
            .await
            .is_err()
    );

    let config = EngineConfig {
        unclassified_detail: true,
        ..EngineConfig::default()
    };
    let (engine, _) = engine_over(ledger(), config);
    let detail = engine
        .get_group_detail(UNCLASSIFIED, None, 2024, 12, &UnitFilter::Consolidated, false)
        .await
        .unwrap();
    assert_eq!(detail.len(), 1);
    assert_eq!(detail[0].nature, "71000000");
    assert_eq!(detail[0].current.committed, dec!(9));
}

// ============================================================================
// Additional credits
// ============================================================================

#[tokio::test]
async fn test_credits_by_category() {
    let source = Arc::new(InMemorySource::new(ledger()).with_credits(credits()));
    let engine = ReportEngine::new(source.clone(), EngineConfig::default());

    let result = engine
        .get_credits(2024, 6, &UnitFilter::Consolidated)
        .await
        .unwrap();

    assert_eq!(result.records_processed, 4);
    assert_eq!(result.unclassified_rows, 1);
    assert_eq!(result.category("3").unwrap().totals.supplementary, dec!(620));
    assert_eq!(result.category("4").unwrap().totals.supplementary, dec!(60));
    assert_eq!(result.grand_total.total_changes, dec!(680));

    let unit_result = engine.get_credits(2024, 6, &unit("10901")).await.unwrap();
    assert_eq!(unit_result.grand_total.supplementary, dec!(500));
    assert!(unit_result.category("4").is_none());
}

#[tokio::test]
async fn test_credits_share_the_period_snapshot() {
    let source = Arc::new(InMemorySource::new(ledger()).with_credits(credits()));
    let engine = ReportEngine::new(source.clone(), EngineConfig::default());

    engine
        .get_demonstrativo(2024, 12, &UnitFilter::Consolidated)
        .await
        .unwrap();
    let result = engine
        .get_credits(2024, 12, &UnitFilter::Consolidated)
        .await
        .unwrap();

    assert_eq!(result.grand_total.supplementary, dec!(1680));
    assert_eq!(source.fetch_count(), 1);
    assert_eq!(source.credit_fetch_count(), 1);
}

#[tokio::test]
async fn test_source_without_credits_yields_empty_rollup() {
    let source = Arc::new(FlakySource {
        inner: InMemorySource::new(ledger()),
        failures: AtomicUsize::new(0),
    });
    let engine = ReportEngine::new(source, EngineConfig::default());

    let result = engine.get_credits(2024, 12, &unit("10901")).await.unwrap();
    assert!(result.is_empty());
    assert_eq!(result.records_processed, 0);
}

// ============================================================================
// Summaries and listings
// ============================================================================

#[tokio::test]
async fn test_summary_covers_both_years() {
    let (engine, _) = engine();
    let summary = engine.get_summary(2024, 12, &unit("20000")).await.unwrap();

    assert_eq!(summary.total_records, 4);
    assert_eq!(summary.exercises, vec![2023, 2024]);
    assert_eq!(summary.by_exercise[0].records, 2);
    assert_eq!(summary.by_exercise[1].totals.committed, dec!(480));
}

#[tokio::test]
async fn test_available_filters() {
    let (engine, _) = engine();
    let filters = engine.get_available_filters(2024, 12).await.unwrap();

    assert_eq!(filters.exercises, vec![2023, 2024]);
    assert_eq!(filters.months, vec![1, 2, 3, 4, 5, 8]);
    let units: Vec<&str> = filters.units.iter().map(|u| u.code.as_str()).collect();
    assert_eq!(units, vec!["10901", "20000"]);
    assert_eq!(filters.units[0].name, "UG 10901");
}

#[tokio::test]
async fn test_available_filters_outlive_snapshots() {
    let clock = Arc::new(ManualClock::new());
    let source = Arc::new(InMemorySource::new(ledger()));
    let engine = ReportEngine::with_clock(source.clone(), EngineConfig::default(), clock.clone());
    let key = key(2024, 12, UnitFilter::Consolidated);

    engine.get_available_filters(2024, 12).await.unwrap();
    assert_eq!(source.fetch_count(), 2);

    clock.advance(TimeDelta::hours(13));
    assert_eq!(engine.cache_status(&key).await.state, CacheState::Stale);
    assert_eq!(engine.filters_cache_status(&key).await.state, CacheState::Fresh);
    engine.get_available_filters(2024, 12).await.unwrap();
    assert_eq!(source.fetch_count(), 2);

    clock.advance(TimeDelta::hours(12));
    assert_eq!(engine.filters_cache_status(&key).await.state, CacheState::Stale);
    let filters = engine.get_available_filters(2024, 12).await.unwrap();
    assert_eq!(source.fetch_count(), 4);
    assert_eq!(filters.exercises, vec![2023, 2024]);
}

#[tokio::test]
async fn test_invalidate_cache_drops_filters_listing() {
    let (engine, source) = engine();
    engine.get_available_filters(2024, 12).await.unwrap();
    engine.invalidate_cache();

    assert_eq!(
        engine
            .filters_cache_status(&key(2024, 12, UnitFilter::Consolidated))
            .await
            .state,
        CacheState::Absent
    );
    engine.get_available_filters(2024, 12).await.unwrap();
    assert_eq!(source.fetch_count(), 4);
}

#[tokio::test]
async fn test_rows_page() {
    let (engine, _) = engine();
    let page = engine
        .get_rows_page(
            2024,
            12,
            &UnitFilter::Consolidated,
            &PageRequest {
                page: 2,
                per_page: 2,
            },
        )
        .await
        .unwrap();

    assert_eq!(page.meta.total, 5);
    assert_eq!(page.meta.total_pages, 3);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].unit.as_str(), "20000");
    assert_eq!(page.data[0].month, 2);
}

// ============================================================================
// Caching
// ============================================================================

#[tokio::test]
async fn test_repeated_reads_fetch_once() {
    let (engine, source) = engine();
    let first = engine.get_demonstrativo(2024, 12, &unit("10901")).await.unwrap();
    let second = engine.get_demonstrativo(2024, 12, &unit("010901")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(source.fetch_count(), 1);

    // Drill-down and paging reuse the cached snapshot.
    engine
        .get_group_detail("3", Some("3"), 2024, 12, &unit("10901"), false)
        .await
        .unwrap();
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn test_concurrent_reads_share_one_retrieval() {
    let source = Arc::new(SlowSource {
        inner: InMemorySource::new(ledger()),
        delay: Duration::from_millis(50),
        calls: AtomicUsize::new(0),
    });
    let engine = Arc::new(ReportEngine::new(source.clone(), EngineConfig::default()));

    let requests = (0..12).map(|_| {
        let engine = Arc::clone(&engine);
        async move {
            engine
                .get_demonstrativo(2024, 12, &UnitFilter::Consolidated)
                .await
                .unwrap()
        }
    });
    let results = futures::future::join_all(requests).await;

    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert!(results.iter().all(|r| r == &results[0]));
}

#[tokio::test]
async fn test_cache_status_lifecycle() {
    let clock = Arc::new(ManualClock::new());
    let source = Arc::new(InMemorySource::new(ledger()));
    let engine = ReportEngine::with_clock(source.clone(), EngineConfig::default(), clock.clone());
    let key = key(2024, 12, UnitFilter::Consolidated);

    assert_eq!(engine.cache_status(&key).await.state, CacheState::Absent);

    engine
        .get_demonstrativo(2024, 12, &UnitFilter::Consolidated)
        .await
        .unwrap();
    assert_eq!(engine.cache_status(&key).await.state, CacheState::Fresh);

    clock.advance(TimeDelta::hours(11) + TimeDelta::minutes(59));
    assert_eq!(engine.cache_status(&key).await.state, CacheState::Fresh);

    clock.advance(TimeDelta::minutes(2));
    let status = engine.cache_status(&key).await;
    assert_eq!(status.state, CacheState::Stale);
    assert_eq!(status.age, Some(TimeDelta::hours(12) + TimeDelta::minutes(1)));

    engine
        .get_demonstrativo(2024, 12, &UnitFilter::Consolidated)
        .await
        .unwrap();
    assert_eq!(source.fetch_count(), 2);
    assert_eq!(engine.cache_status(&key).await.state, CacheState::Fresh);
}

#[tokio::test]
async fn test_invalidate_cache_forces_refetch() {
    let (engine, source) = engine();
    engine
        .get_comparative_demonstrativo(2024, 12, &UnitFilter::Consolidated)
        .await
        .unwrap();
    assert_eq!(source.fetch_count(), 2);
    assert_eq!(engine.cache_stats().entries, 2);

    engine.invalidate_cache();
    assert_eq!(
        engine
            .cache_status(&key(2024, 12, UnitFilter::Consolidated))
            .await
            .state,
        CacheState::Absent
    );

    engine
        .get_comparative_demonstrativo(2024, 12, &UnitFilter::Consolidated)
        .await
        .unwrap();
    assert_eq!(source.fetch_count(), 4);
}

#[tokio::test]
async fn test_invalidate_key_and_purge() {
    let clock = Arc::new(ManualClock::new());
    let source = Arc::new(InMemorySource::new(ledger()));
    let engine = ReportEngine::with_clock(source, EngineConfig::default(), clock.clone());

    engine.get_demonstrativo(2024, 12, &unit("10901")).await.unwrap();
    engine.get_demonstrativo(2024, 12, &unit("20000")).await.unwrap();

    engine.invalidate_key(&key(2024, 12, unit("10901"))).await;
    assert_eq!(
        engine.cache_status(&key(2024, 12, unit("10901"))).await.state,
        CacheState::Absent
    );

    clock.advance(TimeDelta::hours(13));
    assert_eq!(engine.purge_expired().await, 1);
    assert_eq!(
        engine.cache_status(&key(2024, 12, unit("20000"))).await.state,
        CacheState::Absent
    );
}

// ============================================================================
// Retrieval failures
// ============================================================================

#[tokio::test]
async fn test_overflowing_amounts_fail_the_build() {
    let mut rows = ledger();
    rows[0].amounts.committed = Decimal::MAX;
    let (engine, _) = engine_over(rows, EngineConfig::default());

    let err = engine
        .get_demonstrativo(2024, 12, &UnitFilter::Consolidated)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Retrieval(RetrievalError::AmountOverflow { index: 0 })
    );
    assert_eq!(
        engine
            .cache_status(&key(2024, 12, UnitFilter::Consolidated))
            .await
            .state,
        CacheState::Absent
    );
}

#[tokio::test]
async fn test_large_amounts_within_range_aggregate() {
    let large = Decimal::from_i128_with_scale(10_i128.pow(27), 0);
    let mut rows = ledger();
    rows[0].amounts.committed = large;
    let (engine, _) = engine_over(rows, EngineConfig::default());

    let result = engine
        .get_demonstrativo(2024, 12, &unit("10901"))
        .await
        .unwrap();
    assert_eq!(result.group("3", "3").unwrap().totals.committed, large + dec!(50));
}

#[tokio::test]
async fn test_overflowing_credits_fail_the_build() {
    let mut huge = credits();
    huge[1].amounts.supplementary = Decimal::MAX;
    let source = Arc::new(InMemorySource::new(ledger()).with_credits(huge));
    let engine = ReportEngine::new(source, EngineConfig::default());

    let err = engine
        .get_credits(2024, 12, &UnitFilter::Consolidated)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Retrieval(RetrievalError::AmountOverflow { index: 1 })
    );
}

#[tokio::test]
async fn test_retrieval_failure_leaves_key_absent() {
    let source = Arc::new(FlakySource {
        inner: InMemorySource::new(ledger()),
        failures: AtomicUsize::new(1),
    });
    let engine = ReportEngine::new(source, EngineConfig::default());

    let err = engine
        .get_demonstrativo(2024, 12, &UnitFilter::Consolidated)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Retrieval(RetrievalError::Unavailable("connection refused".into()))
    );
    assert_eq!(
        engine
            .cache_status(&key(2024, 12, UnitFilter::Consolidated))
            .await
            .state,
        CacheState::Absent
    );

    let result = engine
        .get_demonstrativo(2024, 12, &UnitFilter::Consolidated)
        .await
        .unwrap();
    assert_eq!(result.grand_total.committed, dec!(630));
}

#[tokio::test]
async fn test_retrieval_timeout() {
    let source = Arc::new(SlowSource {
        inner: InMemorySource::new(ledger()),
        delay: Duration::from_secs(5),
        calls: AtomicUsize::new(0),
    });
    let config = EngineConfig {
        retrieval_timeout: Duration::from_millis(20),
        ..EngineConfig::default()
    };
    let engine = ReportEngine::new(source, config);

    let err = engine
        .get_demonstrativo(2024, 12, &UnitFilter::Consolidated)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::RetrievalTimeout {
            after: Duration::from_millis(20)
        }
    );
    assert_eq!(
        engine
            .cache_status(&key(2024, 12, UnitFilter::Consolidated))
            .await
            .state,
        CacheState::Absent
    );
}
