//! # Apportion Core
//!
//! Allocation constraint engine for percentage-based portfolio editors.
//!
//! An [`AllocationSet`] holds an ordered table of category / percentage
//! rows and enforces its [`AllocationPolicy`] on every edit:
//!
//! - categories unique within the set (optional)
//! - each percentage within `[0, max]`
//! - per-partition sums at most `max` (one global partition, or one per
//!   position side, or one per category)
//! - per-partition record caps (optional)
//!
//! Edits are atomic: they either apply completely or return a [`Rejection`]
//! and leave the set untouched. Percentage rejections carry the largest value
//! that would have fit, so callers can clamp-and-warn instead of blocking.
//!
//! ## Design Philosophy
//!
//! - **Pure state transitions**: no I/O, no logging, no rendering
//! - **Exact arithmetic**: percentages are [`Decimal`](rust_decimal::Decimal)
//!   so boundary sums like `90 - 20 + 30 = 100` are exact
//! - **Trust nothing loaded**: snapshots are re-validated with
//!   [`AllocationSet::validate`] before use
//!
//! ## Quick Start
//!
//! ```rust
//! use apportion_core::prelude::*;
//!
//! let mut set = AllocationSet::new(AllocationPolicy::position_scaling());
//!
//! set.add(AllocationRecord::new("a", AssetClass::Equity, dec!(60))
//!     .with_position_type(PositionType::Long))?;
//!
//! // Long side has 40% left.
//! let err = set
//!     .add(AllocationRecord::new("b", AssetClass::Etf, dec!(50))
//!         .with_position_type(PositionType::Long))
//!     .unwrap_err();
//! assert_eq!(err.max_allowed(), Some(dec!(40)));
//!
//! // Short side is independent.
//! set.add(AllocationRecord::new("c", AssetClass::Equity, dec!(70))
//!     .with_position_type(PositionType::Short))?;
//! # Ok::<(), Rejection<AssetClass>>(())
//! ```
//!
//! ## Module Overview
//!
//! - [`types`] - Categories, records, patches, partitions
//! - [`policy`] - Uniqueness, partitioning and caps
//! - [`set`] - The allocation set and its operations
//! - [`violation`] - Invariant violations from full validation
//! - [`snapshot`] - Backend wire format
//! - [`store`] - Fetch/submit collaborator contract
//! - [`error`] - Rejections and error types

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod policy;
pub mod set;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod violation;

pub use error::{EditResult, Rejection, SnapshotError, StoreError};
pub use policy::{AllocationPolicy, RecordCaps};
pub use set::{AllocationSet, ClampNotice};
pub use snapshot::{AllocationSnapshot, LoadedSet, WireRecord};
pub use store::{AllocationStore, InMemoryStore};
pub use types::{
    AllocationPatch, AllocationRecord, AssetClass, Category, PartitionKey, PartitionRule,
    PositionType, RecordId, Sector,
};
pub use violation::Violation;

/// Prelude module for convenient imports.
///
/// ```rust
/// use apportion_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{EditResult, Rejection};
    pub use crate::policy::{AllocationPolicy, RecordCaps};
    pub use crate::set::{AllocationSet, ClampNotice};
    pub use crate::snapshot::{AllocationSnapshot, WireRecord};
    pub use crate::types::{
        AllocationPatch, AllocationRecord, AssetClass, Category, PartitionKey, PartitionRule,
        PositionType, RecordId, Sector,
    };
    pub use crate::violation::Violation;

    pub use rust_decimal::Decimal;
    pub use rust_decimal_macros::dec;
}
