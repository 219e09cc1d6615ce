//! In-memory store, used by the worker tests and for ephemeral deployments.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;

use super::{CheckStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    // Keyed by (collection, id); per-key atomicity comes from DashMap.
    records: DashMap<(String, String), Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(collection: &str, id: &str) -> (String, String) {
        (collection.to_string(), id.to_string())
    }
}

#[async_trait]
impl CheckStore for MemoryStore {
    async fn create(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError> {
        match self.records.entry(Self::key(collection, id)) {
            Entry::Occupied(_) => {
                Err(StoreError::AlreadyExists(format!("{collection}/{id}")))
            }
            Entry::Vacant(entry) => {
                entry.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn read(&self, collection: &str, id: &str) -> Result<Value, StoreError> {
        self.records
            .get(&Self::key(collection, id))
            .map(|record| record.clone())
            .ok_or_else(|| StoreError::NotFound(format!("{collection}/{id}")))
    }

    async fn update(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError> {
        match self.records.entry(Self::key(collection, id)) {
            Entry::Occupied(mut entry) => {
                entry.insert(record.clone());
                Ok(())
            }
            Entry::Vacant(_) => Err(StoreError::NotFound(format!("{collection}/{id}"))),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.records
            .remove(&Self::key(collection, id))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("{collection}/{id}")))
    }

    async fn list(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|entry| entry.key().0 == collection)
            .map(|entry| entry.key().1.clone())
            .collect())
    }
}
