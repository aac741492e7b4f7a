//! Additional-credit accumulator.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Additional credits opened, reopened and cancelled against the budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreditBucket {
    /// Supplementary credit (crédito suplementar).
    #[serde(default)]
    pub supplementary: Decimal,
    /// Special credit opened in the exercise.
    #[serde(default)]
    pub special_opened: Decimal,
    /// Special credit reopened from the prior exercise.
    #[serde(default)]
    pub special_reopened: Decimal,
    /// Extraordinary credit reopened from the prior exercise.
    #[serde(default)]
    pub extraordinary_reopened: Decimal,
    /// Cancellation of supplementary credit.
    #[serde(default)]
    pub supplementary_cancellation: Decimal,
    /// Reallocation after a veto of the budget law.
    #[serde(default)]
    pub veto_reallocation: Decimal,
    /// Cancellation of special credit.
    #[serde(default)]
    pub special_cancellation: Decimal,
    /// Net change reported by the source.
    #[serde(default)]
    pub total_changes: Decimal,
}

impl CreditBucket {
    /// A bucket with every field at zero.
    pub const ZERO: Self = Self {
        supplementary: Decimal::ZERO,
        special_opened: Decimal::ZERO,
        special_reopened: Decimal::ZERO,
        extraordinary_reopened: Decimal::ZERO,
        supplementary_cancellation: Decimal::ZERO,
        veto_reallocation: Decimal::ZERO,
        special_cancellation: Decimal::ZERO,
        total_changes: Decimal::ZERO,
    };

    fn fields(&self) -> [Decimal; 8] {
        [
            self.supplementary,
            self.special_opened,
            self.special_reopened,
            self.extraordinary_reopened,
            self.supplementary_cancellation,
            self.veto_reallocation,
            self.special_cancellation,
            self.total_changes,
        ]
    }

    /// Returns true if every field is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.fields().iter().all(Decimal::is_zero)
    }

    /// Sum of the absolute values of every field, or `None` on overflow.
    #[must_use]
    pub fn magnitude(&self) -> Option<Decimal> {
        self.fields()
            .iter()
            .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount.abs()))
    }

    /// Adds every field of `other` into `self`.
    pub fn accumulate(&mut self, other: &Self) {
        self.supplementary += other.supplementary;
        self.special_opened += other.special_opened;
        self.special_reopened += other.special_reopened;
        self.extraordinary_reopened += other.extraordinary_reopened;
        self.supplementary_cancellation += other.supplementary_cancellation;
        self.veto_reallocation += other.veto_reallocation;
        self.special_cancellation += other.special_cancellation;
        self.total_changes += other.total_changes;
    }
}
