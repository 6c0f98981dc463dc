//! Allocation records and partial edits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::PositionType;

/// Opaque record identifier, unique within an allocation set.
#[derive(Debug, Clone, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a record ID from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random ID (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One row of an allocation table.
///
/// `position_type` and `min_assets` are secondary attributes used by
/// position-scaling tables. `position_type` may drive partitioning (see
/// [`PartitionRule`](super::PartitionRule)); `min_assets` is carried through
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRecord<C> {
    /// Identifier, stable across edits.
    pub id: RecordId,

    /// Category tag.
    pub category: C,

    /// Allocated percentage (0 to the policy maximum).
    pub percentage: Decimal,

    /// Position side, if the table is split by side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_type: Option<PositionType>,

    /// Minimum number of assets to hold in this category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_assets: Option<u32>,
}

impl<C> AllocationRecord<C> {
    /// Creates a record with no secondary attributes.
    pub fn new(id: impl Into<RecordId>, category: C, percentage: Decimal) -> Self {
        Self {
            id: id.into(),
            category,
            percentage,
            position_type: None,
            min_assets: None,
        }
    }

    /// Creates a record with a generated ID.
    pub fn generated(category: C, percentage: Decimal) -> Self {
        Self::new(RecordId::generate(), category, percentage)
    }

    /// Sets the position side.
    #[must_use]
    pub fn with_position_type(mut self, side: PositionType) -> Self {
        self.position_type = Some(side);
        self
    }

    /// Sets the minimum asset count.
    #[must_use]
    pub fn with_min_assets(mut self, min_assets: u32) -> Self {
        self.min_assets = Some(min_assets);
        self
    }
}

/// A partial edit to an existing record.
///
/// Fields left as `None` keep their current value. `position_type` is
/// doubly optional: `Some(None)` clears the side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPatch<C> {
    /// New category.
    pub category: Option<C>,
    /// New percentage.
    pub percentage: Option<Decimal>,
    /// New position side, or `Some(None)` to clear it.
    pub position_type: Option<Option<PositionType>>,
    /// New minimum asset count.
    pub min_assets: Option<u32>,
}

impl<C> Default for AllocationPatch<C> {
    fn default() -> Self {
        Self {
            category: None,
            percentage: None,
            position_type: None,
            min_assets: None,
        }
    }
}

impl<C: Copy> AllocationPatch<C> {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the category.
    #[must_use]
    pub fn category(mut self, category: C) -> Self {
        self.category = Some(category);
        self
    }

    /// Sets the percentage.
    #[must_use]
    pub fn percentage(mut self, percentage: Decimal) -> Self {
        self.percentage = Some(percentage);
        self
    }

    /// Sets the position side.
    #[must_use]
    pub fn position_type(mut self, side: PositionType) -> Self {
        self.position_type = Some(Some(side));
        self
    }

    /// Clears the position side.
    #[must_use]
    pub fn clear_position_type(mut self) -> Self {
        self.position_type = Some(None);
        self
    }

    /// Sets the minimum asset count.
    #[must_use]
    pub fn min_assets(mut self, min_assets: u32) -> Self {
        self.min_assets = Some(min_assets);
        self
    }

    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.percentage.is_none()
            && self.position_type.is_none()
            && self.min_assets.is_none()
    }

    /// Returns a copy of `record` with this patch applied.
    #[must_use]
    pub fn apply_to(&self, record: &AllocationRecord<C>) -> AllocationRecord<C> {
        AllocationRecord {
            id: record.id.clone(),
            category: self.category.unwrap_or(record.category),
            percentage: self.percentage.unwrap_or(record.percentage),
            position_type: self.position_type.unwrap_or(record.position_type),
            min_assets: self.min_assets.or(record.min_assets),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sector;
    use rust_decimal_macros::dec;

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(RecordId::generate(), RecordId::generate());
    }

    #[test]
    fn test_patch_apply() {
        let record = AllocationRecord::new("A", Sector::Energy, dec!(20))
            .with_position_type(PositionType::Long);

        let patched = AllocationPatch::new()
            .percentage(dec!(35))
            .min_assets(3)
            .apply_to(&record);

        assert_eq!(patched.id, record.id);
        assert_eq!(patched.category, Sector::Energy);
        assert_eq!(patched.percentage, dec!(35));
        assert_eq!(patched.position_type, Some(PositionType::Long));
        assert_eq!(patched.min_assets, Some(3));
    }

    #[test]
    fn test_patch_clears_side() {
        let record = AllocationRecord::new("A", Sector::Energy, dec!(20))
            .with_position_type(PositionType::Short);

        let patch = AllocationPatch::new().clear_position_type();
        assert!(!patch.is_empty());
        assert_eq!(patch.apply_to(&record).position_type, None);

        let patch = AllocationPatch::new().position_type(PositionType::Long);
        assert_eq!(patch.apply_to(&record).position_type, Some(PositionType::Long));
    }

    #[test]
    fn test_empty_patch() {
        let patch: AllocationPatch<Sector> = AllocationPatch::new();
        assert!(patch.is_empty());
        assert!(!patch.category(Sector::Materials).is_empty());
    }

    #[test]
    fn test_record_serde_skips_empty_secondary_fields() {
        let record = AllocationRecord::new("A", Sector::Technology, dec!(60));
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("position_type"));
        assert!(!json.contains("min_assets"));
    }
}
