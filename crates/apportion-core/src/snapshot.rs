//! Wire format shared with the allocation backend.
//!
//! The backend exchanges allocations as JSON rows with an integer category
//! code and a numeric percentage:
//!
//! ```json
//! {
//!   "entityId": "strategy-42",
//!   "allocations": [
//!     { "id": "r1", "category": 8, "percentage": 60 },
//!     { "category": 1, "percentage": 25.5, "positionType": "long", "minAssets": 3 }
//!   ]
//! }
//! ```
//!
//! Rows without an `id` get a generated one when loaded.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::policy::AllocationPolicy;
use crate::set::AllocationSet;
use crate::types::{AllocationRecord, Category, PositionType, RecordId};
use crate::violation::Violation;

/// One allocation row as sent by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRecord {
    /// Row ID, if the backend assigned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Category wire code.
    pub category: u16,

    /// Percentage, written with every digit so a round trip is exact.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub percentage: Decimal,

    /// Position side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_type: Option<PositionType>,

    /// Minimum asset count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_assets: Option<u32>,
}

impl WireRecord {
    /// Encodes a record.
    pub fn from_record<C: Category>(record: &AllocationRecord<C>) -> Self {
        Self {
            id: Some(record.id.as_str().to_string()),
            category: record.category.code(),
            percentage: record.percentage,
            position_type: record.position_type,
            min_assets: record.min_assets,
        }
    }

    /// Decodes into a record, generating an ID if missing.
    ///
    /// `index` is the row position, used for error reporting.
    ///
    /// # Errors
    ///
    /// `UnknownCategory` if the code is not in `C`'s catalog.
    pub fn into_record<C: Category>(self, index: usize) -> Result<AllocationRecord<C>, SnapshotError> {
        let category = C::from_code(self.category).ok_or(SnapshotError::UnknownCategory {
            index,
            code: self.category,
        })?;
        let id = self.id.map_or_else(RecordId::generate, RecordId::from);
        Ok(AllocationRecord {
            id,
            category,
            percentage: self.percentage,
            position_type: self.position_type,
            min_assets: self.min_assets,
        })
    }
}

/// All allocations of one entity (a strategy, a portfolio, a user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSnapshot {
    /// Owning entity.
    pub entity_id: String,

    /// Allocation rows in display order.
    #[serde(default)]
    pub allocations: Vec<WireRecord>,
}

impl AllocationSnapshot {
    /// Creates a snapshot.
    pub fn new(entity_id: impl Into<String>, allocations: Vec<WireRecord>) -> Self {
        Self {
            entity_id: entity_id.into(),
            allocations,
        }
    }

    /// Captures the records of a set.
    pub fn from_set<C: Category>(entity_id: impl Into<String>, set: &AllocationSet<C>) -> Self {
        Self::new(entity_id, set.to_wire())
    }

    /// Parses a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Renders the snapshot as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A set freshly built from a snapshot, with the violations it arrived with.
#[derive(Debug, Clone)]
pub struct LoadedSet<C> {
    /// The set.
    pub set: AllocationSet<C>,
    /// Violations present in the snapshot.
    pub violations: Vec<Violation<C>>,
}

impl<C> LoadedSet<C> {
    /// Returns true if the snapshot was valid.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

impl<C: Category> AllocationSet<C> {
    /// Builds a set from backend rows and validates it.
    ///
    /// # Errors
    ///
    /// `UnknownCategory` if any row carries a code outside the catalog.
    pub fn from_wire(
        policy: AllocationPolicy,
        rows: impl IntoIterator<Item = WireRecord>,
    ) -> Result<LoadedSet<C>, SnapshotError> {
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| row.into_record(index))
            .collect::<Result<Vec<_>, _>>()?;
        let set = Self::from_records(policy, records);
        let violations = set.validate();
        Ok(LoadedSet { set, violations })
    }

    /// Encodes the records for a submit call.
    #[must_use]
    pub fn to_wire(&self) -> Vec<WireRecord> {
        self.iter().map(WireRecord::from_record).collect()
    }
}
