//! Flat-file JSON store: one `<base_dir>/<collection>/<id>.json` per record.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;

use super::{CheckStore, StoreError};

pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn record_path(&self, collection: &str, id: &str) -> PathBuf {
        self.base_dir.join(collection).join(format!("{id}.json"))
    }

    async fn write_record(path: &Path, record: &Value) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(record)?;
        fs::write(path, body).await?;
        Ok(())
    }
}

#[async_trait]
impl CheckStore for FileStore {
    async fn create(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError> {
        let dir = self.base_dir.join(collection);
        fs::create_dir_all(&dir).await?;
        let path = self.record_path(collection, id);
        if fs::try_exists(&path).await? {
            return Err(StoreError::AlreadyExists(format!("{collection}/{id}")));
        }
        Self::write_record(&path, record).await
    }

    async fn read(&self, collection: &str, id: &str) -> Result<Value, StoreError> {
        let path = self.record_path(collection, id);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(format!("{collection}/{id}")));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn update(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError> {
        let path = self.record_path(collection, id);
        if !fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(format!("{collection}/{id}")));
        }
        Self::write_record(&path, record).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let path = self.record_path(collection, id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(format!("{collection}/{id}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.base_dir.join(collection);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if let Some(id) = name.to_str().and_then(|n| n.strip_suffix(".json")) {
                ids.push(id.to_string());
            }
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn create_read_update_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let record = json!({"id": "a", "url": "example.com"});
        store.create("checks", "a", &record).await.unwrap();
        assert_eq!(store.read("checks", "a").await.unwrap(), record);

        let updated = json!({"id": "a", "url": "example.org"});
        store.update("checks", "a", &updated).await.unwrap();
        assert_eq!(store.read("checks", "a").await.unwrap(), updated);

        store.delete("checks", "a").await.unwrap();
        assert!(matches!(
            store.read("checks", "a").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn create_refuses_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let record = json!({"id": "a"});
        store.create("checks", "a", &record).await.unwrap();
        assert!(matches!(
            store.create("checks", "a", &record).await,
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn update_requires_existing_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(matches!(
            store.update("checks", "missing", &json!({})).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_returns_ids_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.create("checks", "first", &json!({})).await.unwrap();
        store.create("checks", "second", &json!({})).await.unwrap();

        let mut ids = store.list("checks").await.unwrap();
        ids.sort();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn list_of_unknown_collection_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.list("checks").await.unwrap().is_empty());
    }
}
