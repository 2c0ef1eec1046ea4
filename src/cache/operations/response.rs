use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::cache::keys::{cache_key, prefix_pattern};
use crate::store::{CounterStore, StoreError};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store failure: {0}")]
    Store(#[from] StoreError),
    #[error("malformed cache entry {key}: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize cache payload: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Outcome of deleting every entry under one prefix.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InvalidationReport {
    pub matched: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Response cache over the counter store.
///
/// Payloads are stored as JSON text under `cache:{prefix}:{sha256}`. The
/// `try_*` methods report every failure. The plain methods are what
/// handlers use: they log and absorb store trouble, so an unreachable
/// cache costs latency and never availability.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn CounterStore>,
    default_ttl: Duration,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn CounterStore>, default_ttl: Duration) -> Self {
        Self { store, default_ttl }
    }

    pub fn default_ttl_secs(&self) -> u64 {
        self.default_ttl.as_secs()
    }

    /// Reads and decodes an entry. A payload that no longer decodes is
    /// evicted before the error is returned.
    pub async fn try_get<T: DeserializeOwned>(
        &self,
        prefix: &str,
        path: &str,
        query: &str,
    ) -> Result<Option<T>, CacheError> {
        let key = cache_key(prefix, path, query);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(source) => {
                if let Err(e) = self.store.delete(&key).await {
                    tracing::warn!("Failed to evict malformed cache entry {}: {}", key, e);
                }
                Err(CacheError::Malformed { key, source })
            }
        }
    }

    pub async fn try_set<T: Serialize>(
        &self,
        prefix: &str,
        path: &str,
        query: &str,
        payload: &T,
        ttl_secs: u64,
    ) -> Result<(), CacheError> {
        let key = cache_key(prefix, path, query);
        let json = serde_json::to_string(payload).map_err(CacheError::Serialize)?;
        self.store.set_ex(&key, &json, ttl_secs).await?;
        tracing::debug!("Set response cache: {}", key);
        Ok(())
    }

    /// Deletes every key under `prefix`. Individual delete failures are
    /// counted and logged, not retried; their entries age out by TTL.
    ///
    /// This is a linear scan of the prefix's key space.
    pub async fn try_invalidate_prefix(
        &self,
        prefix: &str,
    ) -> Result<InvalidationReport, CacheError> {
        let keys = self.store.scan_match(&prefix_pattern(prefix)).await?;
        let mut report = InvalidationReport {
            matched: keys.len(),
            ..Default::default()
        };

        for key in &keys {
            match self.store.delete(key).await {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!("Failed to delete cache entry {}: {}", key, e);
                }
            }
        }

        tracing::debug!(
            "Invalidated cache prefix {}: {} of {} deleted",
            prefix,
            report.deleted,
            report.matched
        );
        Ok(report)
    }

    /// Cached payload, or `None` on a miss or on any cache failure.
    pub async fn get<T: DeserializeOwned>(&self, prefix: &str, path: &str, query: &str) -> Option<T> {
        match self.try_get(prefix, path, query).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!("Response cache read degraded to miss: {}", e);
                None
            }
        }
    }

    pub async fn set<T: Serialize>(
        &self,
        prefix: &str,
        path: &str,
        query: &str,
        payload: &T,
        ttl_secs: u64,
    ) {
        if let Err(e) = self.try_set(prefix, path, query, payload, ttl_secs).await {
            tracing::warn!("Response cache write skipped: {}", e);
        }
    }

    pub async fn invalidate_prefix(&self, prefix: &str) -> InvalidationReport {
        match self.try_invalidate_prefix(prefix).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("Response cache invalidation of {} skipped: {}", prefix, e);
                InvalidationReport::default()
            }
        }
    }
}
