use std::time::Instant;

use axum::{
    body::{Body, to_bytes},
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::{error, info};

use super::request_id::RequestId;

/// Bytes of a 5xx body that make it into the log.
const LOGGED_BODY_LIMIT: usize = 1024;

/// Logs every request with its outcome, and the body of any 5xx response.
pub async fn log_requests(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let request_id = req.extensions().get::<RequestId>().map(|r| r.0.clone());
    let started = Instant::now();

    let response = next.run(req).await;

    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
    info!(
        method = %method,
        path = %path,
        status_code = response.status().as_u16(),
        duration_ms = (duration_ms * 100.0).round() / 100.0,
        request_id = request_id.as_deref().unwrap_or("-"),
        "request"
    );

    if response.status().is_server_error() {
        let (mut parts, body) = response.into_parts();
        let bytes = match to_bytes(body, usize::MAX).await {
            Ok(b) => b,
            Err(e) => {
                error!("Failed to read error response body: {}", e);
                return Response::from_parts(parts, Body::empty());
            }
        };
        let logged = &bytes[..bytes.len().min(LOGGED_BODY_LIMIT)];
        let ellipsis = if bytes.len() > LOGGED_BODY_LIMIT { "..." } else { "" };

        error!(
            "Server error occurred - Status: {}, Body: {}{}",
            parts.status,
            String::from_utf8_lossy(logged),
            ellipsis
        );

        // body is rebuilt from the buffered bytes
        parts.headers.remove(axum::http::header::CONTENT_LENGTH);
        Response::from_parts(parts, Body::from(bytes))
    } else {
        response
    }
}
