//! Collaborator contract for fetching and submitting allocations.
//!
//! The allocation set itself never performs I/O. Callers fetch rows through
//! an [`AllocationStore`], build a set with
//! [`AllocationSet::from_wire`](crate::AllocationSet::from_wire), edit it,
//! and submit [`AllocationSet::to_wire`](crate::AllocationSet::to_wire).
//! A failed submit is returned as-is; there is no retry at this level.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::StoreError;
use crate::snapshot::WireRecord;

/// Source and sink of allocation rows, keyed by entity.
#[async_trait]
pub trait AllocationStore: Send + Sync {
    /// Fetches the current rows of an entity. Unknown entities yield an
    /// empty list.
    async fn fetch(&self, entity: &str) -> Result<Vec<WireRecord>, StoreError>;

    /// Replaces the rows of an entity.
    async fn submit(&self, entity: &str, rows: &[WireRecord]) -> Result<(), StoreError>;
}

/// In-memory store, for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entities: DashMap<String, Vec<WireRecord>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an entity's rows.
    pub fn insert(&self, entity: impl Into<String>, rows: Vec<WireRecord>) {
        self.entities.insert(entity.into(), rows);
    }

    /// Returns the number of entities held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if no entity is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[async_trait]
impl AllocationStore for InMemoryStore {
    async fn fetch(&self, entity: &str) -> Result<Vec<WireRecord>, StoreError> {
        Ok(self
            .entities
            .get(entity)
            .map(|rows| rows.value().clone())
            .unwrap_or_default())
    }

    async fn submit(&self, entity: &str, rows: &[WireRecord]) -> Result<(), StoreError> {
        self.entities.insert(entity.to_string(), rows.to_vec());
        Ok(())
    }
}
