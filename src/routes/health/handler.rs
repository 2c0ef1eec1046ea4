use axum::{extract::State, response::Json};
use futures_util::future::join;
use serde::Serialize;

use crate::AppState;

const OK: &str = "ok";
const DOWN: &str = "down";

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DependencyChecks {
    pub database: &'static str,
    pub redis: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DetailedHealth {
    pub status: &'static str,
    pub checks: DependencyChecks,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus { status: OK })
}

/// Probes Postgres and the counter store concurrently. Always answers 200;
/// a failed probe only turns the status to `degraded`.
pub async fn health_detailed(State(state): State<AppState>) -> Json<DetailedHealth> {
    let (database, store) = join(state.items.ping(), state.store.ping()).await;

    let checks = DependencyChecks {
        database: match database {
            Ok(()) => OK,
            Err(e) => {
                tracing::warn!("Database health check failed: {}", e);
                DOWN
            }
        },
        redis: match store {
            Ok(()) => OK,
            Err(e) => {
                tracing::warn!("Redis health check failed: {}", e);
                DOWN
            }
        },
    };

    let status = if checks.database == OK && checks.redis == OK {
        OK
    } else {
        "degraded"
    };

    Json(DetailedHealth { status, checks })
}
