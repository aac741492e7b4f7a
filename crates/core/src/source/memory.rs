//! A row source over rows held in memory.

use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{RetrievalError, RowSource};
use crate::credits::CreditRow;
use crate::ledger::{LedgerRow, UnitFilter};

/// Serves a fixed row set, counting how often it is asked.
#[derive(Debug, Default)]
pub struct InMemorySource {
    rows: Vec<LedgerRow>,
    credits: Vec<CreditRow>,
    fetches: AtomicUsize,
    credit_fetches: AtomicUsize,
}

impl InMemorySource {
    /// Creates a source over `rows`, with no credits.
    #[must_use]
    pub fn new(rows: Vec<LedgerRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Serves `credits` from `fetch_credits`.
    #[must_use]
    pub fn with_credits(mut self, credits: Vec<CreditRow>) -> Self {
        self.credits = credits;
        self
    }

    /// Number of `fetch_rows` calls served so far.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of `fetch_credits` calls served so far.
    #[must_use]
    pub fn credit_fetch_count(&self) -> usize {
        self.credit_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RowSource for InMemorySource {
    async fn fetch_rows(
        &self,
        years: RangeInclusive<i32>,
        unit: &UnitFilter,
    ) -> Result<Vec<LedgerRow>, RetrievalError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .iter()
            .filter(|row| years.contains(&row.exercise) && unit.admits(&row.unit))
            .cloned()
            .collect())
    }

    async fn fetch_credits(
        &self,
        years: RangeInclusive<i32>,
        unit: &UnitFilter,
    ) -> Result<Vec<CreditRow>, RetrievalError> {
        self.credit_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .credits
            .iter()
            .filter(|row| years.contains(&row.exercise) && unit.admits(&row.unit))
            .cloned()
            .collect())
    }
}
