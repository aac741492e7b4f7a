//! Row source backed by a JSON export of the ledger query.

use std::io::ErrorKind;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use budgetexec_core::credits::{CreditRow, RawCreditRow};
use budgetexec_core::ledger::{LedgerRow, RawLedgerRow, RowValidationError, UnitCode, UnitFilter};
use budgetexec_core::source::{RetrievalError, RowSource};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Reads a JSON array of ledger rows, and optionally one of credit rows, on
/// every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    credits_path: Option<PathBuf>,
}

impl JsonFileSource {
    /// Creates a source over the ledger file at `path`, with no credits.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            credits_path: None,
        }
    }

    /// Serves credits from the file at `path`, when given.
    #[must_use]
    pub fn with_credits(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.credits_path = path.map(Into::into);
        self
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, RetrievalError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound | ErrorKind::PermissionDenied => {
            RetrievalError::Unavailable(format!("{}: {e}", path.display()))
        }
        _ => RetrievalError::Query(format!("{}: {e}", path.display())),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| RetrievalError::Malformed(e.to_string()))
}

/// Validates the raw rows of the requested years and keeps those of `unit`.
///
/// Errors carry the row's index in the file.
fn select<R, T>(
    raw: Vec<R>,
    years: &RangeInclusive<i32>,
    unit: &UnitFilter,
    exercise_of: impl Fn(&R) -> i32,
    unit_of: impl Fn(&T) -> &UnitCode,
) -> Result<Vec<T>, RetrievalError>
where
    T: TryFrom<R, Error = RowValidationError>,
{
    let mut rows = Vec::new();
    for (index, raw) in raw.into_iter().enumerate() {
        if !years.contains(&exercise_of(&raw)) {
            continue;
        }
        let row = T::try_from(raw).map_err(|source| RetrievalError::InvalidRow { index, source })?;
        if unit.admits(unit_of(&row)) {
            rows.push(row);
        }
    }
    Ok(rows)
}

#[async_trait]
impl RowSource for JsonFileSource {
    async fn fetch_rows(
        &self,
        years: RangeInclusive<i32>,
        unit: &UnitFilter,
    ) -> Result<Vec<LedgerRow>, RetrievalError> {
        let raw: Vec<RawLedgerRow> = read_json(&self.path).await?;
        let total = raw.len();
        let rows = select(raw, &years, unit, |raw| raw.exercise, |row: &LedgerRow| &row.unit)?;

        debug!(
            path = %self.path.display(),
            total,
            selected = rows.len(),
            "rows read from file"
        );
        Ok(rows)
    }

    async fn fetch_credits(
        &self,
        years: RangeInclusive<i32>,
        unit: &UnitFilter,
    ) -> Result<Vec<CreditRow>, RetrievalError> {
        let Some(path) = &self.credits_path else {
            return Ok(Vec::new());
        };
        let raw: Vec<RawCreditRow> = read_json(path).await?;
        let total = raw.len();
        let credits = select(raw, &years, unit, |raw| raw.exercise, |row: &CreditRow| &row.unit)?;

        debug!(
            path = %path.display(),
            total,
            selected = credits.len(),
            "credit rows read from file"
        );
        Ok(credits)
    }
}
