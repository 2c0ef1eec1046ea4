use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use inventory::{
    AppState,
    cache::{ResponseCache, SlidingWindowLimiter},
    config::Config,
    database::{PgItemRepository, PgUserRepository},
    infrastructure::QuoteClient,
    middleware::RateLimitGate,
    router::create_router,
    store::{CounterStore, RedisStore},
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("Fatal: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BoxError> {
    // 加载配置，缺少必填项时直接退出
    let config = Config::from_env()?;

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(config.store_connect_timeout())
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'inventory';").await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database ready");

    // 设置 Redis 连接
    let store: Arc<dyn CounterStore> = Arc::new(
        RedisStore::connect(
            &config.redis_url,
            config.store_connect_timeout(),
            config.store_operation_timeout(),
        )
        .await?,
    );

    let state = AppState {
        config: config.clone(),
        items: Arc::new(PgItemRepository::new(pool.clone())),
        users: Arc::new(PgUserRepository::new(pool.clone())),
        store: store.clone(),
        cache: ResponseCache::new(store.clone(), config.cache_ttl()),
        quotes: QuoteClient::new(config.quote_api_url.clone())?,
    };

    // 设置限流器
    let gate = Arc::new(RateLimitGate::new(SlidingWindowLimiter::new(store), &config));
    tracing::info!(
        "Rate limit: {} requests per {}s, failure policy {:?}",
        config.rate_limit_requests,
        config.rate_limit_window_secs,
        config.rate_limit_failure_policy
    );

    let app = create_router(state, gate);

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // 关闭连接池
    pool.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves once `listener` observes its signal. A listener that fails to
/// install logs and then never resolves, so it cannot trigger shutdown.
async fn wait_for<F>(name: &str, listener: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = listener.await {
        tracing::error!("Failed to listen for {}: {}", name, e);
        std::future::pending::<()>().await;
    }
}

async fn shutdown_signal() {
    let ctrl_c = wait_for("ctrl-c", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = wait_for("SIGTERM", async {
        let mut signal = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        signal.recv().await;
        Ok::<(), std::io::Error>(())
    });

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received, draining connections");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn failed_listener_never_resolves() {
        let listener = async { Err::<(), _>(std::io::Error::other("no signal support")) };
        let waited = tokio::time::timeout(Duration::from_millis(50), wait_for("test", listener)).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn delivered_signal_resolves() {
        let waited =
            tokio::time::timeout(Duration::from_millis(50), wait_for("test", async { Ok::<(), std::io::Error>(()) })).await;
        assert!(waited.is_ok());
    }
}
