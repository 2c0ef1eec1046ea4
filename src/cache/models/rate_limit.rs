use serde::Serialize;

/// Outcome of one sliding-window check. Built fresh per request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitResult {
    pub limit: u64,
    pub remaining: u64,
    /// Unix seconds
    pub reset: i64,
    pub allowed: bool,
}

impl RateLimitResult {
    /// `count` is the number of entries in the window including the current
    /// request.
    pub fn from_count(count: u64, limit: u64, now_secs: i64, window_secs: u64) -> Self {
        Self {
            limit,
            remaining: limit.saturating_sub(count),
            reset: now_secs.saturating_add(i64::try_from(window_secs).unwrap_or(i64::MAX)),
            allowed: count <= limit,
        }
    }

    /// Seconds until the window resets, never negative.
    pub fn retry_after(&self, now_secs: i64) -> u64 {
        self.reset.saturating_sub(now_secs).max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_at_limit_is_allowed_with_nothing_left() {
        let r = RateLimitResult::from_count(60, 60, 1_000, 60);
        assert!(r.allowed);
        assert_eq!(r.remaining, 0);
        assert_eq!(r.reset, 1_060);
    }

    #[test]
    fn count_over_limit_is_denied() {
        let r = RateLimitResult::from_count(61, 60, 1_000, 60);
        assert!(!r.allowed);
        assert_eq!(r.remaining, 0);
    }

    #[test]
    fn retry_after_is_floored_at_zero() {
        let r = RateLimitResult::from_count(1, 5, 1_000, 30);
        assert_eq!(r.retry_after(1_000), 30);
        assert_eq!(r.retry_after(2_000), 0);
    }

    #[test]
    fn huge_window_saturates_reset() {
        let r = RateLimitResult::from_count(1, 5, 1_000, u64::MAX);
        assert_eq!(r.reset, i64::MAX);
        assert_eq!(r.retry_after(i64::MIN), u64::try_from(i64::MAX).unwrap());
    }
}
