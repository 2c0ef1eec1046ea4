//! In-process [`CounterStore`] used by the test suites.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{CounterStore, StoreError, StoreResult, WindowEntry};

#[derive(Default)]
struct Inner {
    sets: HashMap<String, HashMap<String, i64>>,
    set_ttls: HashMap<String, u64>,
    values: HashMap<String, (String, Instant)>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    down: AtomicBool,
    failing_deletes: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail as if the server were unreachable.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Makes `delete` fail for this one key.
    pub fn fail_delete_of(&self, key: &str) {
        self.failing_deletes.lock().unwrap().push(key.to_string());
    }

    pub fn window_len(&self, key: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .sets
            .get(key)
            .map_or(0, HashMap::len)
    }

    pub fn window_ttl(&self, key: &str) -> Option<u64> {
        self.inner.lock().unwrap().set_ttls.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().unwrap().values.contains_key(key)
    }

    fn check_up(&self) -> StoreResult<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

fn glob_matches(pattern: &str, key: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn record_window_entry(
        &self,
        key: &str,
        prune_until: i64,
        entry: &WindowEntry,
        ttl_secs: u64,
    ) -> StoreResult<u64> {
        self.check_up()?;
        let mut inner = self.inner.lock().unwrap();
        let set = inner.sets.entry(key.to_string()).or_default();
        set.retain(|_, score| *score > prune_until);
        set.insert(entry.member.clone(), entry.score);
        let count = set.len() as u64;
        inner.set_ttls.insert(key.to_string(), ttl_secs);
        Ok(count)
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check_up()?;
        let mut inner = self.inner.lock().unwrap();
        match inner.values.get(key) {
            Some((_, expires)) if *expires <= Instant::now() => {
                inner.values.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> StoreResult<()> {
        self.check_up()?;
        let expires = Instant::now() + Duration::from_secs(ttl_secs);
        self.inner
            .lock()
            .unwrap()
            .values
            .insert(key.to_string(), (value.to_string(), expires));
        Ok(())
    }

    async fn scan_match(&self, pattern: &str) -> StoreResult<Vec<String>> {
        self.check_up()?;
        let inner = self.inner.lock().unwrap();
        let mut keys: Vec<String> = inner
            .values
            .keys()
            .chain(inner.sets.keys())
            .filter(|k| glob_matches(pattern, k))
            .cloned()
            .collect();
        keys.sort_unstable();
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.check_up()?;
        if self.failing_deletes.lock().unwrap().iter().any(|k| k == key) {
            return Err(StoreError::Unavailable(format!("delete of {key} failed")));
        }
        let mut inner = self.inner.lock().unwrap();
        inner.values.remove(key);
        inner.sets.remove(key);
        inner.set_ttls.remove(key);
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_up()
    }
}
