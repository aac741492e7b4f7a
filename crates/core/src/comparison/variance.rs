//! Percentage variance between a current and a prior value.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// Qualitative direction of a variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Current is above prior.
    Up,
    /// Current is below prior.
    Down,
    /// Current equals prior.
    Flat,
}

/// Signed percentage change from a prior value to a current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variance {
    /// No meaningful variance: both values are zero, or the ratio overflowed.
    Neutral,
    /// A computed change.
    Change {
        /// Percentage, unrounded.
        percent: Decimal,
        /// Sign of the percentage.
        direction: Direction,
    },
}

impl Variance {
    /// Computes `((current / prior) - 1) * 100`.
    ///
    /// A zero prior yields +100% when current is positive, -100% when current
    /// is negative, and `Neutral` when current is also zero.
    #[must_use]
    pub fn between(current: Decimal, prior: Decimal) -> Self {
        if prior.is_zero() {
            return if current > Decimal::ZERO {
                Self::change(Decimal::ONE_HUNDRED)
            } else if current < Decimal::ZERO {
                Self::change(-Decimal::ONE_HUNDRED)
            } else {
                Self::Neutral
            };
        }

        current
            .checked_div(prior)
            .and_then(|ratio| ratio.checked_sub(Decimal::ONE))
            .and_then(|delta| delta.checked_mul(Decimal::ONE_HUNDRED))
            .map_or(Self::Neutral, Self::change)
    }

    fn change(percent: Decimal) -> Self {
        let direction = if percent.is_zero() {
            Direction::Flat
        } else if percent.is_sign_positive() {
            Direction::Up
        } else {
            Direction::Down
        };
        Self::Change { percent, direction }
    }

    /// The percentage, if one was computed.
    #[must_use]
    pub const fn percent(&self) -> Option<Decimal> {
        match self {
            Self::Neutral => None,
            Self::Change { percent, .. } => Some(*percent),
        }
    }

    /// The direction, if a percentage was computed.
    #[must_use]
    pub const fn direction(&self) -> Option<Direction> {
        match self {
            Self::Neutral => None,
            Self::Change { direction, .. } => Some(*direction),
        }
    }
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Neutral => f.write_str("-"),
            Self::Change { percent, direction } => {
                let rounded = percent.round_dp(2);
                match direction {
                    Direction::Up => write!(f, "+{rounded:.2}%"),
                    Direction::Down => write!(f, "{rounded:.2}%"),
                    Direction::Flat => f.write_str("0.00%"),
                }
            }
        }
    }
}

#[derive(Serialize)]
struct VarianceRepr {
    percent: Option<Decimal>,
    direction: Option<Direction>,
    display: String,
}

impl Serialize for Variance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        VarianceRepr {
            percent: self.percent().map(|p| p.round_dp(2)),
            direction: self.direction(),
            display: self.to_string(),
        }
        .serialize(serializer)
    }
}
