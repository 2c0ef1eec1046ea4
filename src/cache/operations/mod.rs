/// 缓存操作

// 滑动窗口限流
pub mod rate_limit;

// 响应缓存
pub mod response;

pub mod read_through;

pub use rate_limit::{RateLimitError, SlidingWindowLimiter};
pub use read_through::{invalidate_after, read_through};
pub use response::{CacheError, InvalidationReport, ResponseCache};
