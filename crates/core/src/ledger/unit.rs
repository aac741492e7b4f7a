//! Organizational-unit (UG) codes and the unit filter.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Filter value meaning "all units combined".
pub const CONSOLIDATED: &str = "CONSOLIDADO";

/// An organizational-unit code.
///
/// Codes arrive as strings or numbers and sometimes with leading zeros, so
/// `"010901"`, `"10901"` and `10901` all name the same unit. Equality and
/// hashing use the canonical form.
#[derive(Debug, Clone)]
pub struct UnitCode(String);

impl UnitCode {
    /// Creates a unit code from its textual form, trimming whitespace.
    ///
    /// Returns `None` for an empty code.
    #[must_use]
    pub fn new(code: impl AsRef<str>) -> Option<Self> {
        let trimmed = code.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The code as received (trimmed).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the code, when it is all digits.
    #[must_use]
    pub fn numeric(&self) -> Option<u64> {
        if self.0.bytes().all(|b| b.is_ascii_digit()) {
            self.0.parse().ok()
        } else {
            None
        }
    }

    /// Canonical form used for equality: numeric codes without leading zeros.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.numeric()
            .map_or_else(|| self.0.to_ascii_uppercase(), |n| n.to_string())
    }
}

impl PartialEq for UnitCode {
    fn eq(&self, other: &Self) -> bool {
        if self.0.eq_ignore_ascii_case(&other.0) {
            return true;
        }
        matches!((self.numeric(), other.numeric()), (Some(a), Some(b)) if a == b)
    }
}

impl Eq for UnitCode {}

impl Hash for UnitCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl PartialOrd for UnitCode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// Numeric codes first by value, then the rest by canonical text. Agrees with
// `Eq`: equal codes share a canonical form.
impl Ord for UnitCode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let key = |code: &Self| {
            let numeric = code.numeric();
            (numeric.is_none(), numeric, code.canonical())
        };
        key(self).cmp(&key(other))
    }
}

impl fmt::Display for UnitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for UnitCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Which organizational units a report covers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum UnitFilter {
    /// All units combined.
    #[default]
    Consolidated,
    /// A single unit.
    Unit(UnitCode),
}

impl UnitFilter {
    /// Builds a filter from an optional code; empty or `CONSOLIDADO` means all.
    #[must_use]
    pub fn from_optional(code: Option<&str>) -> Self {
        match code {
            None => Self::Consolidated,
            Some(code) if is_consolidated(code) => Self::Consolidated,
            Some(code) => UnitCode::new(code).map_or(Self::Consolidated, Self::Unit),
        }
    }

    /// Returns true if a row from `unit` passes this filter.
    #[must_use]
    pub fn admits(&self, unit: &UnitCode) -> bool {
        match self {
            Self::Consolidated => true,
            Self::Unit(code) => code == unit,
        }
    }
}

fn is_consolidated(code: &str) -> bool {
    let code = code.trim();
    code.is_empty()
        || code.eq_ignore_ascii_case(CONSOLIDATED)
        || code.eq_ignore_ascii_case("consolidated")
}

impl FromStr for UnitFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_optional(Some(s)))
    }
}

impl fmt::Display for UnitFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Consolidated => f.write_str(CONSOLIDATED),
            Self::Unit(code) => write!(f, "{code}"),
        }
    }
}

impl Serialize for UnitFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UnitFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = Option::<String>::deserialize(deserializer)?;
        Ok(Self::from_optional(code.as_deref()))
    }
}
