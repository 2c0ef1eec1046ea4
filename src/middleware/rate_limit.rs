use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, Request, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use chrono::Utc;

use crate::{
    cache::{RateLimitResult, SlidingWindowLimiter},
    config::{ClientKeyMode, Config, FailurePolicy},
    error::AppError,
    utils::decode_claims,
};

pub const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// Derives the rate limit key for a request.
pub trait ClientKeyExtractor: Send + Sync {
    fn client_key(&self, req: &Request<Body>) -> String;
}

/// Keys clients by network address.
///
/// With `trust_proxy_headers` the `X-Real-IP` and first `X-Forwarded-For`
/// entries win over the peer address; only enable it behind a proxy that
/// overwrites them.
pub struct PeerIp {
    pub trust_proxy_headers: bool,
}

impl ClientKeyExtractor for PeerIp {
    fn client_key(&self, req: &Request<Body>) -> String {
        let remote_ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip().to_string());

        let forwarded = if self.trust_proxy_headers {
            req.headers()
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .or_else(|| {
                    req.headers()
                        .get("x-forwarded-for")
                        .and_then(|h| h.to_str().ok())
                        .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
                })
        } else {
            None
        };

        let ip = forwarded
            .or(remote_ip.as_deref())
            .unwrap_or("unknown")
            .trim();
        format!("ip:{}", ip)
    }
}

/// Keys authenticated callers by token subject and everyone else by address.
pub struct BearerIdentity {
    pub fallback: PeerIp,
    pub jwt_secret: String,
}

impl ClientKeyExtractor for BearerIdentity {
    fn client_key(&self, req: &Request<Body>) -> String {
        req.headers()
            .typed_get::<Authorization<Bearer>>()
            .and_then(|bearer| decode_claims(bearer.token(), &self.jwt_secret).ok())
            .map(|claims| format!("user:{}", claims.sub))
            .unwrap_or_else(|| self.fallback.client_key(req))
    }
}

/// Filter in front of every route that is not on the exempt list.
pub struct RateLimitGate {
    limiter: SlidingWindowLimiter,
    limit: u64,
    window_secs: u64,
    exempt: Vec<String>,
    failure_policy: FailurePolicy,
    key_extractor: Box<dyn ClientKeyExtractor>,
}

impl RateLimitGate {
    pub fn new(limiter: SlidingWindowLimiter, config: &Config) -> Self {
        let peer = PeerIp {
            trust_proxy_headers: config.trust_proxy_headers,
        };
        let key_extractor: Box<dyn ClientKeyExtractor> = match config.rate_limit_key {
            ClientKeyMode::Ip => Box::new(peer),
            ClientKeyMode::Identity => Box::new(BearerIdentity {
                fallback: peer,
                jwt_secret: config.jwt_secret.clone(),
            }),
        };

        Self {
            limiter,
            limit: u64::from(config.rate_limit_requests),
            window_secs: config.rate_limit_window_secs,
            exempt: config.rate_limit_exempt.clone(),
            failure_policy: config.rate_limit_failure_policy,
            key_extractor,
        }
    }

    pub fn is_exempt(&self, path: &str) -> bool {
        self.exempt.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    async fn check_rate_limit(&self, req: Request<Body>, next: Next) -> Response {
        if self.is_exempt(req.uri().path()) {
            return next.run(req).await;
        }

        let key = self.key_extractor.client_key(&req);
        let result = match self.limiter.check(&key, self.limit, self.window_secs).await {
            Ok(result) => result,
            Err(e) => match self.failure_policy {
                FailurePolicy::Open => {
                    tracing::warn!("Rate limiter unavailable, failing open for {}: {}", key, e);
                    return next.run(req).await;
                }
                FailurePolicy::Closed => {
                    tracing::warn!("Rate limiter unavailable, failing closed for {}: {}", key, e);
                    return AppError::ServiceUnavailable("Rate limiting is temporarily unavailable".into())
                        .into_response();
                }
            },
        };

        if !result.allowed {
            tracing::info!("Rate limited {} on {}", key, req.uri().path());
            let retry_after = result.retry_after(Utc::now().timestamp());
            let mut response = AppError::RateLimited.into_response();
            stamp_headers(response.headers_mut(), &result);
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after));
            return response;
        }

        let mut response = next.run(req).await;
        stamp_headers(response.headers_mut(), &result);
        response
    }
}

fn stamp_headers(headers: &mut HeaderMap, result: &RateLimitResult) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(result.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(result.remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(result.reset));
}

pub async fn rate_limit(
    State(gate): State<Arc<RateLimitGate>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    gate.check_rate_limit(req, next).await
}
