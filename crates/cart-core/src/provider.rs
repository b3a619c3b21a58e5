//! Scoped access to a shared cart.
//!
//! A [`CartProvider`] makes its store available to everything running inside
//! [`CartProvider::scope`] (or [`CartProvider::sync_scope`]). Code in the
//! scope calls [`use_cart`]; code outside it gets
//! [`CartError::OutsideProvider`].
//!
//! Scopes are task-local: a task spawned from inside a scope does not
//! inherit it and must enter its own.

use std::future::Future;

use cart_kv::KvStore;

use crate::config::CartConfig;
use crate::error::CartError;
use crate::store::CartStore;

tokio::task_local! {
    static CURRENT_CART: CartStore;
}

/// Provides one [`CartStore`] to the code running in its scopes.
///
/// # Example
///
/// ```rust,ignore
/// let provider = CartProvider::mount(MemoryStore::new(), CartConfig::default()).await?;
///
/// provider
///     .scope(async {
///         let cart = use_cart()?;
///         cart.add_to_cart(item)?;
///         Ok::<_, CartError>(())
///     })
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct CartProvider {
    store: CartStore,
}

impl CartProvider {
    /// Wrap an already opened store.
    pub fn new(store: CartStore) -> Self {
        Self { store }
    }

    /// Open a store on `backend` and wrap it.
    pub async fn mount<S>(backend: S, config: CartConfig) -> Result<Self, CartError>
    where
        S: KvStore + 'static,
    {
        Ok(Self::new(CartStore::open(backend, config).await?))
    }

    /// The provided store.
    pub fn store(&self) -> &CartStore {
        &self.store
    }

    /// Run `fut` with this provider's cart in scope.
    pub async fn scope<F: Future>(&self, fut: F) -> F::Output {
        CURRENT_CART.scope(self.store.clone(), fut).await
    }

    /// Run `f` with this provider's cart in scope.
    pub fn sync_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        CURRENT_CART.sync_scope(self.store.clone(), f)
    }
}

/// Get the cart of the innermost active provider scope.
pub fn use_cart() -> Result<CartStore, CartError> {
    CURRENT_CART
        .try_with(CartStore::clone)
        .map_err(|_| CartError::OutsideProvider)
}
