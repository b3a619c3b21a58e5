//! Key-value backend trait and key helpers.

use async_trait::async_trait;

use crate::CacheError;

/// Async key-value backend holding opaque byte documents.
///
/// Everything above this trait treats the stored bytes as a whole document
/// that is overwritten on every write.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Load the document stored under `key`, or `None` if absent.
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Replace the document stored under `key`.
    async fn save(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), CacheError>;

    /// Check if a key exists.
    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.load(key).await?.is_some())
    }
}

#[async_trait]
impl<S: KvStore + ?Sized> KvStore for std::sync::Arc<S> {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        (**self).load(key).await
    }

    async fn save(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        (**self).save(key, bytes).await
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        (**self).remove(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        (**self).exists(key).await
    }
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```
/// let key = cart_kv::cache_key!("cart", "items");
/// assert_eq!(key, "cart:items");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}
