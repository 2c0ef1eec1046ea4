//! Shared counter store.
//!
//! The limiter and the response cache only ever talk to the store through
//! [`CounterStore`]. Production uses [`RedisStore`]; tests use an
//! in-process store with the same semantics.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

mod redis_store;

#[cfg(test)]
pub mod memory;

pub use redis_store::RedisStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store operation `{op}` timed out after {after:?}")]
    Timeout { op: &'static str, after: Duration },
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One timestamped entry in a per-client ordered set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowEntry {
    pub member: String,
    pub score: i64,
}

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Runs as one atomic batch against the ordered set at `key`: drops every
    /// entry scored at or below `prune_until`, adds `entry`, counts what is
    /// left, and sets the key's expiry to `ttl_secs`. Returns the count.
    async fn record_window_entry(
        &self,
        key: &str,
        prune_until: i64,
        entry: &WindowEntry,
        ttl_secs: u64,
    ) -> StoreResult<u64>;

    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Overwrites any existing value.
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> StoreResult<()>;

    /// Keys matching a glob pattern such as `cache:items_list:*`.
    async fn scan_match(&self, pattern: &str) -> StoreResult<Vec<String>>;

    async fn delete(&self, key: &str) -> StoreResult<()>;

    async fn ping(&self) -> StoreResult<()>;
}
