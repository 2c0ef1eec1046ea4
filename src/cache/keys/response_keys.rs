use sha2::{Digest, Sha256};

/// Response cache key prefix
const RESPONSE_CACHE_PREFIX: &str = "cache:";

/// Namespace for item list responses
pub const ITEMS_LIST_PREFIX: &str = "items_list";

/// Sorts query pairs so `a=1&b=2` and `b=2&a=1` share one entry.
///
/// Pairs are compared as raw `key=value` text and empty segments are
/// dropped. Repeated keys are kept in their relative sort order, so a
/// query that differs only in a repeated value still gets its own entry.
pub fn normalize_query(query: &str) -> String {
    let mut pairs: Vec<&str> = query
        .trim_start_matches('?')
        .split('&')
        .filter(|p| !p.is_empty())
        .collect();
    pairs.sort_unstable();
    pairs.join("&")
}

/// Cache key for a resource path and query string under `prefix`.
pub fn cache_key(prefix: &str, path: &str, query: &str) -> String {
    scoped_cache_key(prefix, path, query, None)
}

/// Like [`cache_key`] but optionally bound to a caller identity, for
/// responses that differ per user.
///
/// The digest is a plain SHA-256 with no process-local salt so keys are
/// stable across restarts.
pub fn scoped_cache_key(prefix: &str, path: &str, query: &str, identity: Option<&str>) -> String {
    let mut raw = format!("{}?{}", path, normalize_query(query));
    if let Some(identity) = identity {
        raw.push('#');
        raw.push_str(identity);
    }
    let digest = Sha256::digest(raw.as_bytes());
    format!("{}{}:{:x}", RESPONSE_CACHE_PREFIX, prefix, digest)
}

/// Glob matching every key produced under `prefix`
pub fn prefix_pattern(prefix: &str) -> String {
    format!("{}{}:*", RESPONSE_CACHE_PREFIX, prefix)
}
