//! Error types for allocation editing.
//!
//! - [`Rejection`]: why an `add` or `update` was refused (an expected outcome)
//! - [`SnapshotError`]: a backend snapshot could not be decoded
//! - [`StoreError`]: the fetch/submit collaborator failed

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::{PartitionKey, RecordId};

/// Result type for allocation edits.
pub type EditResult<T, C> = Result<T, Rejection<C>>;

/// Reason an edit was refused.
///
/// A rejected edit never changes the set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection<C> {
    /// Category already claimed by another record.
    #[error("{category} is already allocated")]
    DuplicateCategory {
        /// The contested category.
        category: C,
    },

    /// Every category of the catalog is already in use.
    #[error("All categories are already allocated")]
    NoCategoriesAvailable,

    /// The partition sum would exceed the policy maximum.
    #[error("Maximum allowed percentage for this entry is {max_allowed}%")]
    PercentageCapExceeded {
        /// Partition whose sum would overflow.
        partition: PartitionKey,
        /// Percentage that was asked for.
        requested: Decimal,
        /// Largest percentage the field could take.
        max_allowed: Decimal,
    },

    /// The partition already holds its maximum number of records.
    #[error("Partition '{partition}' already holds the maximum of {cap} entries")]
    RecordCapExceeded {
        /// The full partition.
        partition: PartitionKey,
        /// Its record cap.
        cap: usize,
    },

    /// Negative percentage.
    #[error("Percentage cannot be negative (got {value}%)")]
    InvalidPercentage {
        /// The offending value.
        value: Decimal,
    },

    /// A record with this ID already exists.
    #[error("Record '{id}' already exists")]
    DuplicateId {
        /// The clashing ID.
        id: RecordId,
    },

    /// No record with this ID.
    #[error("Record '{id}' not found")]
    UnknownRecord {
        /// The missing ID.
        id: RecordId,
    },
}

impl<C> Rejection<C> {
    /// Returns the clamp value for a `PercentageCapExceeded` rejection.
    #[must_use]
    pub fn max_allowed(&self) -> Option<Decimal> {
        match self {
            Self::PercentageCapExceeded { max_allowed, .. } => Some(*max_allowed),
            _ => None,
        }
    }

    /// Returns a stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateCategory { .. } => "duplicate_category",
            Self::NoCategoriesAvailable => "no_categories_available",
            Self::PercentageCapExceeded { .. } => "percentage_cap_exceeded",
            Self::RecordCapExceeded { .. } => "record_cap_exceeded",
            Self::InvalidPercentage { .. } => "invalid_percentage",
            Self::DuplicateId { .. } => "duplicate_id",
            Self::UnknownRecord { .. } => "unknown_record",
        }
    }
}

/// Errors decoding a backend snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Malformed JSON.
    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Category code not present in the catalog.
    #[error("Unknown category code {code} in record {index}")]
    UnknownCategory {
        /// Position of the record in the snapshot.
        index: usize,
        /// The unrecognized code.
        code: u16,
    },
}

/// Errors from the fetch/submit collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The entity ID cannot be used by this store.
    #[error("Invalid entity id '{0}'")]
    InvalidEntity(String),

    /// I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
