use std::future::Future;

use serde::{Serialize, de::DeserializeOwned};

use super::response::ResponseCache;

/// Serves a list query through the response cache.
///
/// On a hit the cached payload is returned without calling `produce`. On a
/// miss (including any cache failure) `produce` runs and its result is
/// stored with the cache's default TTL before being returned. Errors from
/// `produce` are passed through and never cached.
pub async fn read_through<T, E, F, Fut>(
    cache: &ResponseCache,
    prefix: &str,
    path: &str,
    query: &str,
    produce: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if let Some(hit) = cache.get(prefix, path, query).await {
        tracing::debug!("Response cache hit: {}?{}", path, query);
        return Ok(hit);
    }

    let fresh = produce().await?;
    cache
        .set(prefix, path, query, &fresh, cache.default_ttl_secs())
        .await;
    Ok(fresh)
}

/// Runs a mutation and, only once it has succeeded, invalidates `prefix`.
///
/// Invalidation trouble never fails the mutation.
pub async fn invalidate_after<T, E, Fut>(
    cache: &ResponseCache,
    prefix: &str,
    mutation: Fut,
) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    let committed = mutation.await?;
    cache.invalidate_prefix(prefix).await;
    Ok(committed)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::store::memory::MemoryStore;

    fn cache() -> (Arc<MemoryStore>, ResponseCache) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), ResponseCache::new(store, Duration::from_secs(20)))
    }

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let (_, cache) = cache();
        let calls = AtomicUsize::new(0);
        let calls = &calls;
        let produce = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(vec![1, 2, 3])
        };

        let first = read_through(&cache, "p", "/x", "a=1", produce).await.unwrap();
        let second = read_through(&cache, "p", "/x", "a=1", produce).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn producer_errors_are_not_cached() {
        let (_, cache) = cache();
        let failed: Result<Vec<i32>, String> =
            read_through(&cache, "p", "/x", "", || async { Err("db down".to_string()) }).await;
        assert!(failed.is_err());
        assert!(cache.get::<Vec<i32>>("p", "/x", "").await.is_none());
    }

    #[tokio::test]
    async fn cache_outage_falls_back_to_producer() {
        let (store, cache) = cache();
        store.set_down(true);
        let value = read_through(&cache, "p", "/x", "", || async { Ok::<_, String>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn failed_mutation_does_not_invalidate() {
        let (_, cache) = cache();
        cache.set("p", "/x", "", &1, 20).await;
        let result: Result<(), &str> = invalidate_after(&cache, "p", async { Err("rollback") }).await;
        assert!(result.is_err());
        assert_eq!(cache.get::<i32>("p", "/x", "").await, Some(1));
    }

    #[tokio::test]
    async fn successful_mutation_invalidates_even_if_cache_is_down() {
        let (store, cache) = cache();
        cache.set("p", "/x", "", &1, 20).await;
        let ok: Result<u8, ()> = invalidate_after(&cache, "p", async { Ok(5) }).await;
        assert_eq!(ok, Ok(5));
        assert!(cache.get::<i32>("p", "/x", "").await.is_none());

        store.set_down(true);
        let still_ok: Result<u8, ()> = invalidate_after(&cache, "p", async { Ok(6) }).await;
        assert_eq!(still_ok, Ok(6));
    }
}
