use serde::{Deserialize, Serialize};

use crate::domain::errors::StorageError;
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::StockCode;
use crate::infrastructure::http::dto::StockDataResponse;
use crate::infrastructure::storage::KeyValueStore;

pub const DAY_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Deserialize)]
struct CacheEntry {
    fetched_at: u64,
    payload: StockDataResponse,
}

#[derive(Serialize)]
struct CacheEntryRef<'a> {
    fetched_at: u64,
    payload: &'a StockDataResponse,
}

/// Raw responses keyed by stock code, valid for `ttl_ms` after the fetch.
pub struct DatasetCache<K> {
    store: K,
    prefix: String,
    ttl_ms: u64,
}

impl<K: KeyValueStore> DatasetCache<K> {
    pub fn new(store: K, prefix: impl Into<String>, ttl_ms: u64) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            ttl_ms,
        }
    }

    pub fn key(&self, code: &StockCode) -> String {
        format!("{}cache:{}", self.prefix, code)
    }

    /// Expired and unreadable entries are evicted and read as a miss.
    pub fn get(&self, code: &StockCode, now: u64) -> Option<StockDataResponse> {
        let key = self.key(code);
        match self.store.get_json::<CacheEntry>(&key) {
            Ok(Some(entry)) if now.saturating_sub(entry.fetched_at) < self.ttl_ms => {
                Some(entry.payload)
            }
            Ok(Some(entry)) => {
                get_logger().debug(
                    LogComponent::Application("DatasetCache"),
                    &format!("{} expired ({} ms old)", key, now - entry.fetched_at),
                );
                self.evict(code);
                None
            }
            Ok(None) => None,
            Err(StorageError::Corrupt(reason)) => {
                get_logger().warn(
                    LogComponent::Application("DatasetCache"),
                    &format!("{} is corrupt: {}", key, reason),
                );
                self.evict(code);
                None
            }
            Err(e) => {
                get_logger().warn(
                    LogComponent::Application("DatasetCache"),
                    &format!("cache read failed: {}", e),
                );
                None
            }
        }
    }

    /// Replaces the entry. On failure the whole store is cleared and the
    /// write retried once.
    pub fn put(
        &self,
        code: &StockCode,
        payload: &StockDataResponse,
        now: u64,
    ) -> Result<(), StorageError> {
        let key = self.key(code);
        let entry = CacheEntryRef {
            fetched_at: now,
            payload,
        };
        if let Err(first) = self.store.set_json(&key, &entry) {
            get_logger().warn(
                LogComponent::Application("DatasetCache"),
                &format!("cache write failed ({}), clearing storage", first),
            );
            self.store.clear()?;
            self.store.set_json(&key, &entry)?;
        }
        Ok(())
    }

    pub fn evict(&self, code: &StockCode) {
        if let Err(e) = self.store.remove(&self.key(code)) {
            get_logger().warn(
                LogComponent::Application("DatasetCache"),
                &format!("cache eviction failed: {}", e),
            );
        }
    }
}
