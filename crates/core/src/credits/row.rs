//! Additional-credit rows and their validation at the retrieval boundary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::bucket::CreditBucket;
use crate::ledger::row::code;
use crate::ledger::{RowValidationError, UnitCode};

/// One validated additional-credit movement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditRow {
    /// Exercise (fiscal) year.
    pub exercise: i32,
    /// Reference month, 1..=12.
    pub month: u8,
    /// Organizational unit.
    pub unit: UnitCode,
    /// Category code.
    pub category: Option<String>,
    /// Group code within the category.
    pub group: Option<String>,
    /// Credit amounts.
    pub amounts: CreditBucket,
}

/// A credit row as it arrives from the source, before validation.
///
/// Accepts the engine's field names and the column names of the upstream
/// credits view.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCreditRow {
    /// Exercise year.
    #[serde(alias = "EXERCICIO", alias = "COEXERCICIO")]
    pub exercise: i32,
    /// Reference month.
    #[serde(alias = "MES", alias = "INMES")]
    pub month: i64,
    /// Organizational unit code.
    #[serde(alias = "COUG", default, deserialize_with = "code")]
    pub unit: Option<String>,
    /// Category code.
    #[serde(alias = "CATEGORIA", default, deserialize_with = "code")]
    pub category: Option<String>,
    /// Group code.
    #[serde(alias = "GRUPO", default, deserialize_with = "code")]
    pub group: Option<String>,
    /// Supplementary credit.
    #[serde(alias = "CREDITO_SUPLEMENTAR", default)]
    pub supplementary: Option<Decimal>,
    /// Special credit opened.
    #[serde(alias = "CREDITO_ESPECIAL_ABERTO", default)]
    pub special_opened: Option<Decimal>,
    /// Special credit reopened.
    #[serde(alias = "CREDITO_ESPECIAL_REABERTO", default)]
    pub special_reopened: Option<Decimal>,
    /// Extraordinary credit reopened.
    #[serde(
        alias = "CREDITO_EXTRAORD_REABERTO",
        alias = "CREDITO_EXTRAORDINARIO_REABERTO",
        default
    )]
    pub extraordinary_reopened: Option<Decimal>,
    /// Supplementary credit cancellation.
    #[serde(alias = "CANCEL_CREDITO_SUPLEMENTAR", default)]
    pub supplementary_cancellation: Option<Decimal>,
    /// Reallocation by veto.
    #[serde(alias = "REMANEJAMENTO_VETO_LEI", default)]
    pub veto_reallocation: Option<Decimal>,
    /// Special credit cancellation.
    #[serde(alias = "CANCEL_CREDITO_ESPECIAL", default)]
    pub special_cancellation: Option<Decimal>,
    /// Net change.
    #[serde(alias = "TOTAL_ALTERACOES", default)]
    pub total_changes: Option<Decimal>,
}

impl TryFrom<RawCreditRow> for CreditRow {
    type Error = RowValidationError;

    fn try_from(raw: RawCreditRow) -> Result<Self, Self::Error> {
        let month = u8::try_from(raw.month)
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or(RowValidationError::MonthOutOfRange(raw.month))?;

        let unit = raw
            .unit
            .as_deref()
            .and_then(UnitCode::new)
            .ok_or(RowValidationError::MissingUnit)?;

        Ok(Self {
            exercise: raw.exercise,
            month,
            unit,
            category: raw.category,
            group: raw.group,
            amounts: CreditBucket {
                supplementary: raw.supplementary.unwrap_or_default(),
                special_opened: raw.special_opened.unwrap_or_default(),
                special_reopened: raw.special_reopened.unwrap_or_default(),
                extraordinary_reopened: raw.extraordinary_reopened.unwrap_or_default(),
                supplementary_cancellation: raw.supplementary_cancellation.unwrap_or_default(),
                veto_reallocation: raw.veto_reallocation.unwrap_or_default(),
                special_cancellation: raw.special_cancellation.unwrap_or_default(),
                total_changes: raw.total_changes.unwrap_or_default(),
            },
        })
    }
}
