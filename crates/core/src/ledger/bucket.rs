//! Monetary accumulator shared by rows and every level of the hierarchy.

use std::ops::{Add, AddAssign};

use rust_decimal::Decimal;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// The seven monetary fields of budget execution.
///
/// A ledger row carries one of these; the aggregator folds them into one per
/// category, group, nature and grand total. Updated allotment and allotment
/// balance are never stored: they are derived on every read, so they cannot
/// drift from their source fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct AggregateBucket {
    /// Initial allotment (dotação inicial).
    #[serde(default)]
    pub initial_allotment: Decimal,
    /// Supplementary allotment (dotação adicional).
    #[serde(default)]
    pub supplementary_allotment: Decimal,
    /// Allotment cancellation; non-positive by convention.
    #[serde(default)]
    pub allotment_cancellation: Decimal,
    /// Allotment cancellation by reallocation; non-positive by convention.
    #[serde(default)]
    pub cancellation_reallocation: Decimal,
    /// Committed expense (empenhada).
    #[serde(default)]
    pub committed: Decimal,
    /// Settled expense (liquidada).
    #[serde(default)]
    pub settled: Decimal,
    /// Paid expense (paga).
    #[serde(default)]
    pub paid: Decimal,
}

impl AggregateBucket {
    /// A bucket with every field at zero.
    pub const ZERO: Self = Self {
        initial_allotment: Decimal::ZERO,
        supplementary_allotment: Decimal::ZERO,
        allotment_cancellation: Decimal::ZERO,
        cancellation_reallocation: Decimal::ZERO,
        committed: Decimal::ZERO,
        settled: Decimal::ZERO,
        paid: Decimal::ZERO,
    };

    /// Initial + supplementary + cancellation + cancellation/reallocation.
    #[must_use]
    pub fn updated_allotment(&self) -> Decimal {
        self.initial_allotment
            + self.supplementary_allotment
            + self.allotment_cancellation
            + self.cancellation_reallocation
    }

    /// Updated allotment minus committed expense.
    ///
    /// Negative means the allotment is over-committed.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.updated_allotment() - self.committed
    }

    /// Returns true if all seven source fields are zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.initial_allotment.is_zero()
            && self.supplementary_allotment.is_zero()
            && self.allotment_cancellation.is_zero()
            && self.cancellation_reallocation.is_zero()
            && self.committed.is_zero()
            && self.settled.is_zero()
            && self.paid.is_zero()
    }

    /// Sum of the absolute values of the seven source fields, or `None` if
    /// that overflows the decimal range.
    #[must_use]
    pub fn magnitude(&self) -> Option<Decimal> {
        [
            self.initial_allotment,
            self.supplementary_allotment,
            self.allotment_cancellation,
            self.cancellation_reallocation,
            self.committed,
            self.settled,
            self.paid,
        ]
        .iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount.abs()))
    }

    /// Adds every field of `other` into `self`.
    ///
    /// Overflows past the decimal range panic; snapshot builds reject row
    /// sets whose magnitudes do not fit before any accumulation.
    pub fn accumulate(&mut self, other: &Self) {
        self.initial_allotment += other.initial_allotment;
        self.supplementary_allotment += other.supplementary_allotment;
        self.allotment_cancellation += other.allotment_cancellation;
        self.cancellation_reallocation += other.cancellation_reallocation;
        self.committed += other.committed;
        self.settled += other.settled;
        self.paid += other.paid;
    }
}

impl AddAssign<&AggregateBucket> for AggregateBucket {
    fn add_assign(&mut self, rhs: &AggregateBucket) {
        self.accumulate(rhs);
    }
}

impl Add for AggregateBucket {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self.accumulate(&rhs);
        self
    }
}

impl<'a> std::iter::Sum<&'a AggregateBucket> for AggregateBucket {
    fn sum<I: Iterator<Item = &'a AggregateBucket>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |mut acc, bucket| {
            acc.accumulate(bucket);
            acc
        })
    }
}

// Derived fields go out on the wire but are never read back in.
impl Serialize for AggregateBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AggregateBucket", 9)?;
        state.serialize_field("initial_allotment", &self.initial_allotment)?;
        state.serialize_field("supplementary_allotment", &self.supplementary_allotment)?;
        state.serialize_field("allotment_cancellation", &self.allotment_cancellation)?;
        state.serialize_field("cancellation_reallocation", &self.cancellation_reallocation)?;
        state.serialize_field("updated_allotment", &self.updated_allotment())?;
        state.serialize_field("committed", &self.committed)?;
        state.serialize_field("settled", &self.settled)?;
        state.serialize_field("paid", &self.paid)?;
        state.serialize_field("balance", &self.balance())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> AggregateBucket {
        AggregateBucket {
            initial_allotment: dec!(1000),
            supplementary_allotment: dec!(250),
            allotment_cancellation: dec!(-100),
            cancellation_reallocation: dec!(-50),
            committed: dec!(700),
            settled: dec!(400),
            paid: dec!(300),
        }
    }

    #[test]
    fn test_updated_allotment() {
        assert_eq!(sample().updated_allotment(), dec!(1100));
    }

    #[test]
    fn test_magnitude() {
        assert_eq!(sample().magnitude(), Some(dec!(2800)));

        let huge = AggregateBucket {
            committed: Decimal::MAX,
            paid: Decimal::MIN,
            ..AggregateBucket::ZERO
        };
        assert_eq!(huge.magnitude(), None);
    }

    #[test]
    fn test_balance() {
        assert_eq!(sample().balance(), dec!(400));
    }

    #[test]
    fn test_over_committed_balance_is_negative() {
        let bucket = AggregateBucket {
            initial_allotment: dec!(100),
            committed: dec!(150),
            ..AggregateBucket::ZERO
        };
        assert_eq!(bucket.balance(), dec!(-50));
    }

    #[test]
    fn test_derived_fields_follow_updates() {
        let mut bucket = sample();
        bucket.accumulate(&AggregateBucket {
            supplementary_allotment: dec!(100),
            committed: dec!(100),
            ..AggregateBucket::ZERO
        });
        assert_eq!(bucket.updated_allotment(), dec!(1200));
        assert_eq!(bucket.balance(), dec!(400));
    }

    #[test]
    fn test_is_zero() {
        assert!(AggregateBucket::ZERO.is_zero());
        assert!(AggregateBucket::default().is_zero());
        assert!(!sample().is_zero());

        let only_cancellation = AggregateBucket {
            allotment_cancellation: dec!(-1),
            ..AggregateBucket::ZERO
        };
        assert!(!only_cancellation.is_zero());
    }

    #[test]
    fn test_sum() {
        let buckets = [sample(), sample(), AggregateBucket::ZERO];
        let total: AggregateBucket = buckets.iter().sum();
        assert_eq!(total.committed, dec!(1400));
        assert_eq!(total.updated_allotment(), dec!(2200));
        assert_eq!(total, sample() + sample());
    }

    #[test]
    fn test_serialize_includes_derived_fields() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["updated_allotment"], "1100");
        assert_eq!(json["balance"], "400");
        assert_eq!(json["committed"], "700");
    }
}
