use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::cache::keys::rate_limit_key;
use crate::cache::models::rate_limit::RateLimitResult;
use crate::store::{CounterStore, StoreError, WindowEntry};

/// Extra lifetime on a window key so abandoned clients expire on their own.
pub const WINDOW_TTL_MARGIN_SECS: u64 = 5;

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("rate limit store failure: {0}")]
    Store(#[from] StoreError),
    #[error("rate limit window of {0}s is out of range")]
    WindowOutOfRange(u64),
}

/// Sliding-window limiter over timestamped entries in the counter store.
///
/// Every call records one entry, whether or not it ends up allowed. The
/// prune, insert, count and expire steps run as a single store batch, so
/// concurrent requests for one key are serialized by the store itself.
#[derive(Clone)]
pub struct SlidingWindowLimiter {
    store: Arc<dyn CounterStore>,
}

impl SlidingWindowLimiter {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    pub async fn check(
        &self,
        key: &str,
        limit: u64,
        window_secs: u64,
    ) -> Result<RateLimitResult, RateLimitError> {
        self.check_at(key, limit, window_secs, Utc::now().timestamp_millis())
            .await
    }

    /// [`check`](Self::check) at an explicit instant, in unix milliseconds.
    pub async fn check_at(
        &self,
        key: &str,
        limit: u64,
        window_secs: u64,
        now_ms: i64,
    ) -> Result<RateLimitResult, RateLimitError> {
        let window_ms = i64::try_from(window_secs)
            .ok()
            .and_then(|secs| secs.checked_mul(1000))
            .ok_or(RateLimitError::WindowOutOfRange(window_secs))?;
        // unique member so same-millisecond requests are all counted
        let entry = WindowEntry {
            member: format!("{}-{}", now_ms, Uuid::new_v4()),
            score: now_ms,
        };

        let count = self
            .store
            .record_window_entry(
                &rate_limit_key(key),
                now_ms.saturating_sub(window_ms),
                &entry,
                window_secs.saturating_add(WINDOW_TTL_MARGIN_SECS),
            )
            .await?;

        let result = RateLimitResult::from_count(count, limit, now_ms.div_euclid(1000), window_secs);
        if !result.allowed {
            tracing::debug!("Rate limit exceeded for {} ({}/{})", key, count, limit);
        }
        Ok(result)
    }
}
