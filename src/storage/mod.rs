// Storage module: key-value port, concrete stores and the typed TTL cache.

pub mod cache;
pub mod memory;
pub mod sqlite;

pub use cache::{CacheEntry, OfferCache};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::model::StorageError;

/// Synchronous durable key-value store backing the cache.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
