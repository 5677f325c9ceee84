use crate::model::{MarketSnapshot, StorageError};
use crate::storage::KeyValueStore;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_TTL_HOURS: i64 = 24;
const KEY_PREFIX: &str = "competitor-offers:";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("malformed cache entry: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub product_id: String,
    pub payload: MarketSnapshot,
    pub cached_at: DateTime<Utc>,
}

/// Per-product snapshot cache with a fixed TTL.
///
/// Expired entries are evicted on read. Unreadable or corrupt entries are
/// treated as misses so the caller falls through to a fresh fetch.
#[derive(Clone)]
pub struct OfferCache {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl OfferCache {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn with_default_ttl(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, Duration::hours(DEFAULT_TTL_HOURS))
    }

    fn key(product_id: &str) -> String {
        format!("{}{}", KEY_PREFIX, product_id)
    }

    pub fn get(&self, product_id: &str) -> Option<MarketSnapshot> {
        self.get_at(product_id, Utc::now())
    }

    pub fn get_at(&self, product_id: &str, now: DateTime<Utc>) -> Option<MarketSnapshot> {
        let entry = match self.read(product_id) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!("cache miss for {}", product_id);
                return None;
            }
            Err(CacheError::Malformed(e)) => {
                warn!("🧹 Corrupt cache entry for {}: {}", product_id, e);
                self.evict(product_id);
                return None;
            }
            Err(e) => {
                warn!("❌ Cache read failed for {}: {}", product_id, e);
                return None;
            }
        };

        if entry.product_id != product_id {
            warn!(
                "🧹 Cache entry for {} belongs to {}, discarding",
                product_id, entry.product_id
            );
            self.evict(product_id);
            return None;
        }

        if entry.cached_at > now {
            warn!(
                "🧹 Cache entry for {} is dated in the future ({}), discarding",
                product_id, entry.cached_at
            );
            self.evict(product_id);
            return None;
        }

        if now - entry.cached_at >= self.ttl {
            info!("⌛ Cache entry for {} expired (cached {})", product_id, entry.cached_at);
            self.evict(product_id);
            return None;
        }

        debug!("cache hit for {}", product_id);
        Some(entry.payload)
    }

    fn read(&self, product_id: &str) -> Result<Option<CacheEntry>, CacheError> {
        match self.store.get(&Self::key(product_id))? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set(&self, product_id: &str, payload: &MarketSnapshot) -> Result<(), CacheError> {
        self.set_at(product_id, payload, Utc::now())
    }

    pub fn set_at(
        &self,
        product_id: &str,
        payload: &MarketSnapshot,
        cached_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        let entry = CacheEntry {
            product_id: product_id.to_string(),
            payload: payload.clone(),
            cached_at,
        };
        let raw = serde_json::to_string(&entry)?;
        self.store.set(&Self::key(product_id), &raw)?;
        Ok(())
    }

    pub fn evict(&self, product_id: &str) {
        if let Err(e) = self.store.remove(&Self::key(product_id)) {
            warn!("❌ Cache evict failed for {}: {}", product_id, e);
        }
    }
}
