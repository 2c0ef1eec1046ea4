use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// What the rate limit gate does when the counter store cannot answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Let the request through without rate limit headers.
    Open,
    /// Reject the request with 503.
    Closed,
}

impl FromStr for FailurePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            _ => Err(()),
        }
    }
}

/// How the rate limit gate derives the per-client key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKeyMode {
    Ip,
    /// Authenticated subject when a valid bearer token is present, IP otherwise.
    Identity,
}

impl FromStr for ClientKeyMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ip" => Ok(Self::Ip),
            "identity" => Ok(Self::Identity),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,
    pub rate_limit_failure_policy: FailurePolicy,
    pub rate_limit_key: ClientKeyMode,
    pub rate_limit_exempt: Vec<String>,
    pub trust_proxy_headers: bool,
    pub cache_ttl_secs: u64,
    pub store_connect_timeout_ms: u64,
    pub store_operation_timeout_ms: u64,
    pub quote_api_url: String,
}

const DEFAULT_EXEMPT: &str = "/v1/health,/docs,/openapi.json";

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn optional<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Longest accepted `RATE_LIMIT_WINDOW`, one year.
pub const MAX_RATE_LIMIT_WINDOW_SECS: u64 = 365 * 24 * 3600;

const DEFAULT_JWT_EXPIRATION_HOURS: u64 = 24;

/// `JWT_EXPIRATION` is a whole number of hours, optionally suffixed `h`.
fn parse_jwt_expiration(raw: Option<&str>) -> Result<u64, ConfigError> {
    let invalid = |value: &str| ConfigError::Invalid {
        key: "JWT_EXPIRATION",
        value: value.to_string(),
    };
    let hours = match raw {
        Some(value) => value
            .trim()
            .trim_end_matches('h')
            .parse::<u64>()
            .map_err(|_| invalid(value))?,
        None => DEFAULT_JWT_EXPIRATION_HOURS,
    };
    match hours.checked_mul(3600) {
        Some(secs) if hours > 0 && secs <= i64::MAX as u64 => Ok(secs),
        _ => Err(invalid(raw.unwrap_or_default())),
    }
}

fn check_window(window: u64) -> Result<u64, ConfigError> {
    if window == 0 || window > MAX_RATE_LIMIT_WINDOW_SECS {
        return Err(ConfigError::Invalid {
            key: "RATE_LIMIT_WINDOW",
            value: window.to_string(),
        });
    }
    Ok(window)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let jwt_expiration_secs = parse_jwt_expiration(env::var("JWT_EXPIRATION").ok().as_deref())?;

        let policy_raw = required("RATE_LIMIT_FAILURE_POLICY")?;
        let rate_limit_failure_policy =
            policy_raw
                .parse()
                .map_err(|_| ConfigError::Invalid {
                    key: "RATE_LIMIT_FAILURE_POLICY",
                    value: policy_raw.clone(),
                })?;

        let key_raw = env::var("RATE_LIMIT_KEY").unwrap_or_else(|_| "ip".into());
        let rate_limit_key = key_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "RATE_LIMIT_KEY",
            value: key_raw.clone(),
        })?;

        let requests: u32 = optional("RATE_LIMIT_REQUESTS", 60)?;
        let window = check_window(optional("RATE_LIMIT_WINDOW", 60)?)?;
        if requests == 0 {
            return Err(ConfigError::Invalid {
                key: "RATE_LIMIT_REQUESTS",
                value: requests.to_string(),
            });
        }

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration_secs,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: optional("SERVER_PORT", 3000)?,
            api_base_uri: env::var("API_BASE_URI").unwrap_or_else(|_| "/v1".into()),
            rate_limit_requests: requests,
            rate_limit_window_secs: window,
            rate_limit_failure_policy,
            rate_limit_key,
            rate_limit_exempt: parse_list(
                &env::var("RATE_LIMIT_EXEMPT").unwrap_or_else(|_| DEFAULT_EXEMPT.into()),
            ),
            trust_proxy_headers: optional("TRUST_PROXY_HEADERS", false)?,
            cache_ttl_secs: optional("CACHE_TTL", 20)?,
            store_connect_timeout_ms: optional("STORE_CONNECT_TIMEOUT_MS", 5000)?,
            store_operation_timeout_ms: optional("STORE_OPERATION_TIMEOUT_MS", 5000)?,
            quote_api_url: env::var("QUOTE_API_URL")
                .unwrap_or_else(|_| "https://api.quotable.io/random".into()),
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn store_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.store_connect_timeout_ms)
    }

    pub fn store_operation_timeout(&self) -> Duration {
        Duration::from_millis(self.store_operation_timeout_ms)
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/inventory_test".into(),
            redis_url: "redis://localhost:6379/0".into(),
            jwt_secret: "test-secret".into(),
            jwt_expiration_secs: 3600,
            server_host: "127.0.0.1".into(),
            server_port: 0,
            api_base_uri: "/v1".into(),
            rate_limit_requests: 60,
            rate_limit_window_secs: 60,
            rate_limit_failure_policy: FailurePolicy::Closed,
            rate_limit_key: ClientKeyMode::Ip,
            rate_limit_exempt: parse_list(DEFAULT_EXEMPT),
            trust_proxy_headers: false,
            cache_ttl_secs: 20,
            store_connect_timeout_ms: 500,
            store_operation_timeout_ms: 500,
            quote_api_url: "http://127.0.0.1:9/random".into(),
        }
    }
}
