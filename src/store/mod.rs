//! Key-value persistence for check records.
//!
//! The worker only ever touches the `checks` collection, and only through
//! `list`, `read` and `update`; `create` and `delete` exist for the CRUD
//! layer that owns record lifecycle.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Collection holding all check records.
pub const CHECKS_COLLECTION: &str = "checks";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Record already exists: {0}")]
    AlreadyExists(String),
}

/// Flat persistence contract: per-key atomicity, no cross-key transactions.
#[async_trait]
pub trait CheckStore: Send + Sync {
    async fn create(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError>;
    async fn read(&self, collection: &str, id: &str) -> Result<Value, StoreError>;
    async fn update(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError>;
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
    /// Lists the ids of every record in the collection. A collection that was
    /// never written to is indistinguishable from an empty one.
    async fn list(&self, collection: &str) -> Result<Vec<String>, StoreError>;
}
