use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
#[cfg(debug_assertions)]
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    error::AppError,
    middleware::{RateLimitGate, auth_middleware, log_requests, rate_limit, request_id},
    routes::{auth, health, item},
};

// 健康检查路由
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/detailed", get(health::health_detailed))
}

// 认证路由
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
}

// 库存条目路由，需要认证
fn item_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/items", get(item::list_items).post(item::create_item))
        .route(
            "/items/{item_id}",
            get(item::get_item)
                .patch(item::update_item)
                .delete(item::delete_item),
        )
        .route("/items/{item_id}/enrich", get(item::enrich_item))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware))
}

/// Full application: request id, then request logging, then the rate
/// limit gate, then the versioned API.
pub fn create_router(state: AppState, gate: Arc<RateLimitGate>) -> Router {
    let api = Router::new()
        .merge(health_routes())
        .merge(auth_routes())
        .merge(item_routes(&state));

    let router = Router::new()
        .nest(&state.config.api_base_uri, api)
        .fallback(|| async { AppError::NotFound("Route not found".into()) })
        .layer(from_fn_with_state(gate, rate_limit))
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id));

    // 开发环境允许所有来源
    #[cfg(debug_assertions)]
    let router = router.layer(CorsLayer::permissive());

    router.with_state(state)
}
