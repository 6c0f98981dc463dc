//! # Apportion Ext File
//!
//! File-based persistence for allocation snapshots.
//!
//! This crate provides the default [`AllocationStore`] for local use, tests
//! and batch jobs:
//! - JSON snapshot per entity, in the backend wire format
//! - Atomic replace on submit
//!
//! Services talking to a live allocation backend implement
//! [`AllocationStore`] themselves.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod json_store;

pub use json_store::JsonFileStore;

use std::path::Path;
use std::sync::Arc;

use apportion_core::AllocationStore;

/// Create a JSON file store as a shared trait object.
pub fn create_file_store(root: impl AsRef<Path>) -> Arc<dyn AllocationStore> {
    Arc::new(JsonFileStore::new(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = create_file_store(dir.path());
        assert!(store.fetch("anything").await.unwrap().is_empty());
        store.submit("anything", &[]).await.unwrap();
        assert!(dir.path().join("anything.json").exists());
    }
}
