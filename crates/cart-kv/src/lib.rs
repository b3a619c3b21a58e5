//! Async key-value persistence adapters for the cart store.
//!
//! Provides the [`KvStore`] trait the cart persists through, an in-memory
//! backend and a JSON file backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use cart_kv::{cache_key, KvStore, JsonFileStore};
//!
//! let store = JsonFileStore::open(".cart/store.json").await?;
//! let key = cache_key!("cart", "items");
//!
//! store.save(&key, br#"[]"#).await?;
//! let bytes = store.load(&key).await?;
//! store.remove(&key).await?;
//! ```

mod error;
mod file;
mod kv;
mod memory;

pub use error::CacheError;
pub use file::JsonFileStore;
pub use kv::KvStore;
pub use memory::MemoryStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{CacheError, JsonFileStore, KvStore, MemoryStore};
}
