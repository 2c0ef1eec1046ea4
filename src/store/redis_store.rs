use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, RedisResult, aio::MultiplexedConnection};

use super::{CounterStore, StoreError, StoreResult, WindowEntry};

const SCAN_BATCH: usize = 200;

/// Redis-backed store over one multiplexed connection.
///
/// The connection is opened once at startup and cloned per operation, so the
/// handle can be shared freely between request tasks. Every command runs
/// under the configured operation timeout.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
    op_timeout: Duration,
}

impl RedisStore {
    pub async fn connect(
        url: &str,
        connect_timeout: Duration,
        op_timeout: Duration,
    ) -> StoreResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = tokio::time::timeout(connect_timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| StoreError::Timeout {
                op: "connect",
                after: connect_timeout,
            })??;

        tracing::info!("Connected to redis");
        Ok(Self { conn, op_timeout })
    }

    async fn run<T, F>(&self, op: &'static str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StoreError::Timeout {
                op,
                after: self.op_timeout,
            }),
        }
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn record_window_entry(
        &self,
        key: &str,
        prune_until: i64,
        entry: &WindowEntry,
        ttl_secs: u64,
    ) -> StoreResult<u64> {
        let mut conn = self.conn.clone();
        self.run("record_window_entry", async move {
            // MULTI/EXEC so prune, insert, count and expire are one unit
            let (count,): (u64,) = redis::pipe()
                .atomic()
                .zrembyscore(key, "-inf", prune_until)
                .ignore()
                .zadd(key, &entry.member, entry.score)
                .ignore()
                .zcard(key)
                .expire(key, i64::try_from(ttl_secs).unwrap_or(i64::MAX))
                .ignore()
                .query_async(&mut conn)
                .await?;
            Ok::<_, redis::RedisError>(count)
        })
        .await
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        self.run("get", async move {
            let value: Option<String> = conn.get(key).await?;
            Ok::<_, redis::RedisError>(value)
        })
        .await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        self.run("set_ex", async move {
            let _: () = conn.set_ex(key, value, ttl_secs).await?;
            Ok::<_, redis::RedisError>(())
        })
        .await
    }

    async fn scan_match(&self, pattern: &str) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let mut conn = self.conn.clone();
            let (next, batch): (u64, Vec<String>) = self
                .run("scan", async move {
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn)
                        .await
                })
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        // SCAN may return a key more than once
        keys.sort_unstable();
        keys.dedup();
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        self.run("delete", async move {
            let _: () = conn.del(key).await?;
            Ok::<_, redis::RedisError>(())
        })
        .await
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        self.run("ping", async move {
            let _: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<_, redis::RedisError>(())
        })
        .await
    }
}
