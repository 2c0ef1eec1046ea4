/// 缓存键模块
/// Key builders for everything this service keeps in the counter store.

pub mod rate_limit_keys;
pub mod response_keys;

pub use rate_limit_keys::rate_limit_key;
pub use response_keys::{
    ITEMS_LIST_PREFIX, cache_key, normalize_query, prefix_pattern, scoped_cache_key,
};
