//! Allocation policy: the rules an [`AllocationSet`](crate::AllocationSet) enforces.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{PartitionKey, PartitionRule};

/// Maximum record counts per partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCaps {
    /// Cap applied to partitions without a specific entry.
    #[serde(default)]
    pub default: Option<usize>,

    /// Partition-specific caps.
    #[serde(default)]
    pub per_partition: BTreeMap<PartitionKey, usize>,
}

impl RecordCaps {
    /// No caps at all.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Returns the cap for a partition, or `None` if unbounded.
    #[must_use]
    pub fn cap_for(&self, key: &PartitionKey) -> Option<usize> {
        self.per_partition.get(key).copied().or(self.default)
    }

    /// Returns true if no cap is configured.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.default.is_none() && self.per_partition.is_empty()
    }
}

/// Rules for an allocation table.
///
/// # Examples
///
/// ```
/// use apportion_core::{AllocationPolicy, PartitionKey, PartitionRule, PositionType};
/// use rust_decimal_macros::dec;
///
/// let policy = AllocationPolicy::position_scaling()
///     .with_partition_cap(PartitionKey::Side(PositionType::Long), 2);
///
/// assert!(!policy.require_unique_category);
/// assert_eq!(policy.partition_by, PartitionRule::PositionType);
/// assert_eq!(policy.max_percentage, dec!(100));
/// assert_eq!(policy.record_caps.cap_for(&PartitionKey::Side(PositionType::Long)), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPolicy {
    /// Each category may appear at most once.
    #[serde(default)]
    pub require_unique_category: bool,

    /// How records are grouped for sum capping.
    #[serde(default)]
    pub partition_by: PartitionRule,

    /// Per-partition record count caps.
    #[serde(default)]
    pub record_caps: RecordCaps,

    /// Maximum percentage per record and per partition sum.
    #[serde(default = "default_max_percentage")]
    pub max_percentage: Decimal,
}

fn default_max_percentage() -> Decimal {
    dec!(100)
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            require_unique_category: false,
            partition_by: PartitionRule::All,
            record_caps: RecordCaps::unbounded(),
            max_percentage: default_max_percentage(),
        }
    }
}

impl AllocationPolicy {
    /// Creates a policy with default settings (global 100% cap, no uniqueness).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sector diversification: unique sectors, one global 100% cap.
    #[must_use]
    pub fn sector_diversification() -> Self {
        Self {
            require_unique_category: true,
            ..Self::default()
        }
    }

    /// Position scaling: categories may repeat, 100% per position side.
    #[must_use]
    pub fn position_scaling() -> Self {
        Self {
            partition_by: PartitionRule::PositionType,
            ..Self::default()
        }
    }

    /// Sets category uniqueness.
    #[must_use]
    pub fn with_unique_category(mut self, unique: bool) -> Self {
        self.require_unique_category = unique;
        self
    }

    /// Sets the partition rule.
    #[must_use]
    pub fn with_partition_rule(mut self, rule: PartitionRule) -> Self {
        self.partition_by = rule;
        self
    }

    /// Sets the maximum percentage.
    #[must_use]
    pub fn with_max_percentage(mut self, max: Decimal) -> Self {
        self.max_percentage = max;
        self
    }

    /// Sets the default record cap for every partition.
    #[must_use]
    pub fn with_default_cap(mut self, cap: usize) -> Self {
        self.record_caps.default = Some(cap);
        self
    }

    /// Sets the record cap for one partition.
    #[must_use]
    pub fn with_partition_cap(mut self, key: PartitionKey, cap: usize) -> Self {
        self.record_caps.per_partition.insert(key, cap);
        self
    }
}
