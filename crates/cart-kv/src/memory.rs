//! In-memory backend for development and testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{CacheError, KvStore};

/// Process-local key-value store.
///
/// Clones share the same map, so a test can keep one handle to inspect
/// what another component persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
    save_delay_ms: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an entry.
    pub fn with_entry(self, key: impl Into<String>, bytes: Vec<u8>) -> Self {
        // Not yet shared, so the lock is always free here.
        if let Ok(mut entries) = self.inner.entries.try_write() {
            entries.insert(key.into(), bytes);
        }
        self
    }

    /// Delay every save by `delay`, simulating slow I/O.
    pub fn with_save_delay(self, delay: Duration) -> Self {
        let ms = usize::try_from(delay.as_millis()).unwrap_or(usize::MAX);
        self.inner.save_delay_ms.store(ms, Ordering::SeqCst);
        self
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn fail_saves(&self, fail: bool) {
        self.inner.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.inner.saves.load(Ordering::SeqCst)
    }

    /// Raw bytes currently stored under `key`.
    pub async fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.entries.read().await.get(key).cloned()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.inner.entries.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        let delay = self.inner.save_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay as u64)).await;
        }
        if self.inner.fail_saves.load(Ordering::SeqCst) {
            return Err(CacheError::Store(format!("save rejected for {key}")));
        }
        self.inner
            .entries
            .write()
            .await
            .insert(key.to_string(), bytes.to_vec());
        self.inner.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.inner.entries.write().await.remove(key);
        Ok(())
    }
}
