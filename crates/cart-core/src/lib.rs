//! Shopping cart domain types and the persisted cart store.
//!
//! - **Cart**: ordered, id-unique line items with add / increment / decrement
//! - **Store**: a live cart mirrored to a [`cart_kv::KvStore`] on every change
//! - **Provider**: scoped access to one shared store via [`use_cart`]
//!
//! # Example
//!
//! ```rust,ignore
//! use cart_core::prelude::*;
//! use cart_kv::MemoryStore;
//!
//! let store = CartStore::open(MemoryStore::new(), CartConfig::default()).await?;
//!
//! store.add_to_cart(NewLineItem::new("p1", "Razor", "https://img/razor.png", 9.99))?;
//! store.increment(&ProductId::new("p1"));
//! store.decrement(&ProductId::new("p1"));
//!
//! // Wait for the snapshot to reach the backend.
//! store.flush().await?;
//! ```

pub mod cart;
pub mod config;
pub mod error;
pub mod ids;
pub mod provider;
pub mod store;

pub use cart::{Cart, InvalidCart, LineItem, Mutation, NewLineItem};
pub use config::{CartConfig, DecodePolicy};
pub use error::CartError;
pub use ids::ProductId;
pub use provider::{use_cart, CartProvider};
pub use store::{CartStore, PersistStatus};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::{Cart, LineItem, Mutation, NewLineItem};
    pub use crate::config::{CartConfig, DecodePolicy};
    pub use crate::error::CartError;
    pub use crate::ids::ProductId;
    pub use crate::provider::{use_cart, CartProvider};
    pub use crate::store::{CartStore, PersistStatus};
}
