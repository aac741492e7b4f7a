//! Ledger rows and their validation at the retrieval boundary.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::bucket::AggregateBucket;
use super::error::RowValidationError;
use super::unit::UnitCode;

/// One validated accounting entry.
///
/// Rows are immutable once retrieved; the engine only ever reads them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow {
    /// Exercise (fiscal) year.
    pub exercise: i32,
    /// Reference month, 1..=12.
    pub month: u8,
    /// Organizational unit.
    pub unit: UnitCode,
    /// Organizational unit name, when the source provides it.
    pub unit_name: Option<String>,
    /// Category code.
    pub category: Option<String>,
    /// Group code within the category.
    pub group: Option<String>,
    /// Accounting-nature code (finest classification level).
    pub nature: Option<String>,
    /// Monetary fields.
    pub amounts: AggregateBucket,
}

/// A row as it arrives from the source, before validation.
///
/// Accepts both the engine's field names and the ledger column names of the
/// upstream query. Missing monetary fields are zero; codes may be strings or
/// numbers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLedgerRow {
    /// Exercise year.
    #[serde(alias = "COEXERCICIO")]
    pub exercise: i32,
    /// Reference month.
    #[serde(alias = "INMES")]
    pub month: i64,
    /// Organizational unit code.
    #[serde(alias = "COUG", default, deserialize_with = "code")]
    pub unit: Option<String>,
    /// Organizational unit name.
    #[serde(alias = "NOUG", default)]
    pub unit_name: Option<String>,
    /// Category code.
    #[serde(alias = "CATEGORIA", default, deserialize_with = "code")]
    pub category: Option<String>,
    /// Group code.
    #[serde(alias = "GRUPO", default, deserialize_with = "code")]
    pub group: Option<String>,
    /// Accounting-nature code.
    #[serde(alias = "CONATUREZA", default, deserialize_with = "code")]
    pub nature: Option<String>,
    /// Initial allotment.
    #[serde(alias = "DOTACAO_INICIAL", default)]
    pub initial_allotment: Option<Decimal>,
    /// Supplementary allotment.
    #[serde(alias = "DOTACAO_ADICIONAL", default)]
    pub supplementary_allotment: Option<Decimal>,
    /// Allotment cancellation.
    #[serde(alias = "CANCELAMENTO_DOTACAO", default)]
    pub allotment_cancellation: Option<Decimal>,
    /// Allotment cancellation by reallocation.
    #[serde(alias = "CANCEL_REMANEJA_DOTACAO", default)]
    pub cancellation_reallocation: Option<Decimal>,
    /// Committed expense.
    #[serde(alias = "DESPESA_EMPENHADA", default)]
    pub committed: Option<Decimal>,
    /// Settled expense.
    #[serde(alias = "DESPESA_LIQUIDADA", default)]
    pub settled: Option<Decimal>,
    /// Paid expense.
    #[serde(alias = "DESPESA_PAGA", default)]
    pub paid: Option<Decimal>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CodeRepr {
    Text(String),
    Integer(i64),
}

pub(crate) fn code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = Option::<CodeRepr>::deserialize(deserializer)?;
    Ok(repr
        .map(|repr| match repr {
            CodeRepr::Text(text) => text.trim().to_string(),
            CodeRepr::Integer(n) => n.to_string(),
        })
        .filter(|code| !code.is_empty()))
}

/// Splits a nature code into its category and group digits.
///
/// Nature codes are positional: the first digit is the category and the second
/// the group (`"33903900"` is category 3, group 3).
fn digits_of(nature: &str) -> (Option<String>, Option<String>) {
    let mut chars = nature.chars().filter(char::is_ascii_digit);
    let category = chars.next().map(String::from);
    let group = chars.next().map(String::from);
    (category, group)
}

impl TryFrom<RawLedgerRow> for LedgerRow {
    type Error = RowValidationError;

    fn try_from(raw: RawLedgerRow) -> Result<Self, Self::Error> {
        let month = u8::try_from(raw.month)
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or(RowValidationError::MonthOutOfRange(raw.month))?;

        let unit = raw
            .unit
            .as_deref()
            .and_then(UnitCode::new)
            .ok_or(RowValidationError::MissingUnit)?;

        let (derived_category, derived_group) =
            raw.nature.as_deref().map(digits_of).unwrap_or_default();

        // Explicit codes win; the group is only derived alongside its category.
        let (category, group) = match raw.category {
            Some(category) => {
                let group = raw.group.or_else(|| {
                    (derived_category.as_deref() == Some(category.as_str()))
                        .then_some(derived_group)
                        .flatten()
                });
                (Some(category), group)
            }
            None => (derived_category, raw.group.or(derived_group)),
        };

        Ok(Self {
            exercise: raw.exercise,
            month,
            unit,
            unit_name: raw.unit_name.map(|n| n.trim().to_string()),
            category,
            group,
            nature: raw.nature,
            amounts: AggregateBucket {
                initial_allotment: raw.initial_allotment.unwrap_or_default(),
                supplementary_allotment: raw.supplementary_allotment.unwrap_or_default(),
                allotment_cancellation: raw.allotment_cancellation.unwrap_or_default(),
                cancellation_reallocation: raw.cancellation_reallocation.unwrap_or_default(),
                committed: raw.committed.unwrap_or_default(),
                settled: raw.settled.unwrap_or_default(),
                paid: raw.paid.unwrap_or_default(),
            },
        })
    }
}
