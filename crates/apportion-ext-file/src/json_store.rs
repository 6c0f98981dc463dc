//! JSON file allocation store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

use apportion_core::{AllocationSnapshot, AllocationStore, StoreError, WireRecord};

// =============================================================================
// JSON FILE STORE
// =============================================================================

/// Stores one [`AllocationSnapshot`] per entity at `<root>/<entity>.json`.
///
/// - Fetching an entity without a file yields an empty list.
/// - Submits write a temporary file and rename it over the target, so a
///   reader never sees a half-written snapshot.
/// - Submits to the same entity are serialized within the process.
pub struct JsonFileStore {
    root: PathBuf,
    write_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl JsonFileStore {
    /// Create a store rooted at `root`. The directory is created on first submit.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            write_locks: DashMap::new(),
        }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for an entity.
    ///
    /// Entity ids are limited to ASCII letters, digits, `.`, `_` and `-`,
    /// must not start with `.`, and may not be empty.
    pub fn path_for(&self, entity: &str) -> Result<PathBuf, StoreError> {
        let valid = !entity.is_empty()
            && !entity.starts_with('.')
            && entity
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(StoreError::InvalidEntity(entity.to_string()));
        }
        Ok(self.root.join(format!("{entity}.json")))
    }

    /// Read the full snapshot of an entity.
    pub async fn load_snapshot(&self, entity: &str) -> Result<AllocationSnapshot, StoreError> {
        let path = self.path_for(entity)?;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(entity, path = %path.display(), "no snapshot on disk");
                return Ok(AllocationSnapshot::new(entity, Vec::new()));
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: AllocationSnapshot = serde_json::from_slice(&bytes)?;
        if snapshot.entity_id != entity {
            tracing::warn!(
                entity,
                stored = %snapshot.entity_id,
                "snapshot entity id does not match file name"
            );
        }
        tracing::debug!(entity, rows = snapshot.allocations.len(), "snapshot loaded");
        Ok(snapshot)
    }

    /// Write the full snapshot of an entity.
    pub async fn save_snapshot(&self, snapshot: &AllocationSnapshot) -> Result<(), StoreError> {
        let entity = snapshot.entity_id.as_str();
        let path = self.path_for(entity)?;
        let bytes = serde_json::to_vec_pretty(snapshot)?;

        let lock = self
            .write_locks
            .entry(entity.to_string())
            .or_default()
            .clone();
        let _guard = lock.lock().await;

        tokio::fs::create_dir_all(&self.root).await?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::info!(
            entity,
            rows = snapshot.allocations.len(),
            path = %path.display(),
            "snapshot written"
        );
        Ok(())
    }
}

impl std::fmt::Debug for JsonFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AllocationStore for JsonFileStore {
    async fn fetch(&self, entity: &str) -> Result<Vec<WireRecord>, StoreError> {
        Ok(self.load_snapshot(entity).await?.allocations)
    }

    async fn submit(&self, entity: &str, rows: &[WireRecord]) -> Result<(), StoreError> {
        self.save_snapshot(&AllocationSnapshot::new(entity, rows.to_vec()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apportion_core::{AllocationPolicy, AllocationRecord, AllocationSet, Sector};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn sample_rows() -> Vec<WireRecord> {
        let mut set = AllocationSet::new(AllocationPolicy::sector_diversification());
        set.add(AllocationRecord::new("a", Sector::Technology, dec!(60)))
            .unwrap();
        set.add(AllocationRecord::new("b", Sector::Energy, dec!(25.5)))
            .unwrap();
        set.to_wire()
    }

    #[test]
    fn test_entity_id_rules() {
        let store = JsonFileStore::new("/data");
        assert_eq!(
            store.path_for("strategy-42").unwrap(),
            PathBuf::from("/data/strategy-42.json")
        );
        assert!(store.path_for("user_7.v2").is_ok());

        for bad in ["", "../etc/passwd", "a/b", ".hidden", "with space", "é"] {
            assert!(
                matches!(store.path_for(bad), Err(StoreError::InvalidEntity(_))),
                "{bad:?} accepted"
            );
        }
    }

    #[tokio::test]
    async fn test_fetch_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.fetch("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_then_fetch() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));

        let rows = sample_rows();
        store.submit("s1", &rows).await.unwrap();

        assert_eq!(store.fetch("s1").await.unwrap(), rows);
        assert!(dir.path().join("nested/s1.json").exists());
        assert!(!dir.path().join("nested/s1.json.tmp").exists());

        let snapshot = store.load_snapshot("s1").await.unwrap();
        assert_eq!(snapshot.entity_id, "s1");
    }

    #[tokio::test]
    async fn test_submit_replaces() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());

        store.submit("s1", &sample_rows()).await.unwrap();
        store.submit("s1", &sample_rows()[..1]).await.unwrap();
        assert_eq!(store.fetch("s1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reads_backend_format() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("legacy.json"),
            r#"{ "entityId": "legacy", "allocations": [ { "category": 3, "percentage": 12.5 } ] }"#,
        )
        .unwrap();

        let store = JsonFileStore::new(dir.path());
        let rows = store.fetch("legacy").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, 3);
        assert_eq!(rows[0].percentage, dec!(12.5));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ nope").unwrap();

        let store = JsonFileStore::new(dir.path());
        assert!(matches!(
            store.fetch("broken").await,
            Err(StoreError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_submits() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path()));
        let rows = sample_rows();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            let rows = rows.clone();
            handles.push(tokio::spawn(async move {
                store.submit("shared", &rows).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.fetch("shared").await.unwrap(), rows);
    }
}
