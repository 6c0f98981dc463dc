//! Domain types for allocation tables.
//!
//! - [`Category`]: Closed catalogs ([`Sector`], [`AssetClass`])
//! - [`PositionType`]: Long / short side
//! - [`AllocationRecord`] and [`AllocationPatch`]: Rows and partial edits
//! - [`PartitionKey`] and [`PartitionRule`]: How sums are grouped

mod category;
mod partition;
mod position;
mod record;

pub use category::{AssetClass, Category, Sector};
pub use partition::{PartitionKey, PartitionRule};
pub use position::PositionType;
pub use record::{AllocationPatch, AllocationRecord, RecordId};
