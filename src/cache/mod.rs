// 缓存模块
// Sliding-window rate limiting and the response cache, both kept in the
// shared counter store.

pub mod keys;
pub mod models;
pub mod operations;

pub use models::RateLimitResult;
pub use operations::{
    CacheError, InvalidationReport, RateLimitError, ResponseCache, SlidingWindowLimiter,
    invalidate_after, read_through,
};
