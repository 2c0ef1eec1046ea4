/// Rate limit window key prefix
const RATE_LIMIT_PREFIX: &str = "rl:";

/// Ordered-set key holding one client's window entries
pub fn rate_limit_key(client_key: &str) -> String {
    format!("{}{}", RATE_LIMIT_PREFIX, client_key)
}
