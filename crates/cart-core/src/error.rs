//! Cart error types.

use cart_kv::CacheError;
use thiserror::Error;

use crate::cart::InvalidCart;

/// Errors surfaced by the cart store and its access gate.
#[derive(Error, Debug)]
pub enum CartError {
    /// The cart was requested outside an active [`CartProvider`](crate::CartProvider) scope.
    #[error("use_cart must be called within a CartProvider scope")]
    OutsideProvider,

    /// A persisted cart exists but could not be decoded.
    #[error("Failed to decode cart stored under {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// An item was rejected before it reached the cart.
    #[error("Invalid cart item: {0}")]
    InvalidItem(#[from] InvalidCart),

    /// The persistence backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] CacheError),

    /// Writing the cart snapshot failed.
    #[error("Failed to persist cart revision {revision}: {message}")]
    Persist { revision: u64, message: String },

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The background persister is no longer running.
    #[error("Cart persister stopped")]
    PersisterStopped,
}
