//! Invariant violations found by a full re-validation.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use crate::types::{PartitionKey, RecordId};

/// A broken invariant in an allocation set.
///
/// Edits refuse to create any of these, so they only appear in sets built
/// from external snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Violation<C> {
    /// Several records share an ID.
    DuplicateId {
        /// The repeated ID.
        id: RecordId,
        /// How many records carry it.
        count: usize,
    },

    /// Several records share a category under a unique-category policy.
    DuplicateCategory {
        /// The repeated category.
        category: C,
        /// Records holding it, in set order.
        ids: Vec<RecordId>,
    },

    /// A single percentage outside `[0, max]`.
    PercentageOutOfRange {
        /// Offending record.
        id: RecordId,
        /// Its percentage.
        value: Decimal,
        /// Policy maximum.
        max: Decimal,
    },

    /// A partition sums to more than the policy maximum.
    PartitionOverAllocated {
        /// The partition.
        partition: PartitionKey,
        /// Its total.
        total: Decimal,
        /// Policy maximum.
        cap: Decimal,
    },

    /// A partition holds more records than its cap.
    PartitionOverCapacity {
        /// The partition.
        partition: PartitionKey,
        /// Its record count.
        count: usize,
        /// Its cap.
        cap: usize,
    },
}

impl<C> Violation<C> {
    /// Returns the rule name, matching the serialized `rule` tag.
    #[must_use]
    pub fn rule(&self) -> &'static str {
        match self {
            Self::DuplicateId { .. } => "duplicate_id",
            Self::DuplicateCategory { .. } => "duplicate_category",
            Self::PercentageOutOfRange { .. } => "percentage_out_of_range",
            Self::PartitionOverAllocated { .. } => "partition_over_allocated",
            Self::PartitionOverCapacity { .. } => "partition_over_capacity",
        }
    }
}

impl<C: fmt::Display> fmt::Display for Violation<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { id, count } => {
                write!(f, "ID '{id}' is used by {count} records")
            }
            Self::DuplicateCategory { category, ids } => {
                let ids: Vec<&str> = ids.iter().map(RecordId::as_str).collect();
                write!(f, "{category} is allocated more than once ({})", ids.join(", "))
            }
            Self::PercentageOutOfRange { id, value, max } => {
                write!(f, "Record '{id}' has {value}%, outside 0-{max}%")
            }
            Self::PartitionOverAllocated {
                partition,
                total,
                cap,
            } => write!(f, "Partition '{partition}' totals {total}%, above {cap}%"),
            Self::PartitionOverCapacity {
                partition,
                count,
                cap,
            } => write!(
                f,
                "Partition '{partition}' holds {count} entries, above the cap of {cap}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sector;
    use rust_decimal_macros::dec;

    #[test]
    fn test_display() {
        let v = Violation::DuplicateCategory {
            category: Sector::Energy,
            ids: vec![RecordId::new("a"), RecordId::new("b")],
        };
        assert_eq!(v.to_string(), "Energy is allocated more than once (a, b)");
        assert_eq!(v.rule(), "duplicate_category");

        let v: Violation<Sector> = Violation::PartitionOverAllocated {
            partition: PartitionKey::All,
            total: dec!(130),
            cap: dec!(100),
        };
        assert_eq!(v.to_string(), "Partition 'all' totals 130%, above 100%");
    }

    #[test]
    fn test_serialize_tag() {
        let v: Violation<Sector> = Violation::PartitionOverCapacity {
            partition: PartitionKey::All,
            count: 3,
            cap: 2,
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["rule"], "partition_over_capacity");
        assert_eq!(json["partition"], "all");
    }
}
