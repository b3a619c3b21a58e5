//! The persisted cart store.
//!
//! A [`CartStore`] owns the live cart. Operations mutate it synchronously
//! and signal a background persister; they never wait on I/O. The persister
//! is the only writer to the backend. Each time it wakes it reads the live
//! cart at that moment and saves it whole, so a slow write can never land
//! after a newer one and no write ever carries a pre-mutation copy.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use cart_kv::KvStore;
use tokio::sync::watch;

use crate::cart::{Cart, LineItem, Mutation, NewLineItem};
use crate::config::{CartConfig, DecodePolicy};
use crate::error::CartError;
use crate::ids::ProductId;

/// Outcome of the most recent write attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistStatus {
    /// Store revision the attempt covered. `0` means nothing was written yet.
    pub revision: u64,
    /// Error message if the attempt failed.
    pub error: Option<String>,
}

impl PersistStatus {
    /// Whether the attempt succeeded.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

struct State {
    cart: Cart,
    revision: u64,
}

/// Live cart shared between store handles and the persister.
struct Live {
    state: RwLock<State>,
}

impl Live {
    // Every write section leaves a valid cart behind, so a poisoned lock is safe to reuse.
    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

struct Inner {
    key: String,
    persist_unchanged: bool,
    live: Arc<Live>,
    dirty: watch::Sender<u64>,
    status: watch::Receiver<PersistStatus>,
}

/// Handle to the persisted cart.
///
/// Cloning is cheap and every clone sees the same cart. The background
/// persister exits once the last handle is dropped, after writing any
/// pending change.
///
/// # Example
///
/// ```rust,ignore
/// let store = CartStore::open(MemoryStore::new(), CartConfig::default()).await?;
/// store.add_to_cart(NewLineItem::new("p1", "Razor", "https://img/razor.png", 9.99))?;
/// store.flush().await?;
/// ```
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

impl CartStore {
    /// Load the persisted cart and start the persister.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn open<S>(backend: S, config: CartConfig) -> Result<Self, CartError>
    where
        S: KvStore + 'static,
    {
        config.validate()?;
        let key = config.storage_key;
        let cart = load_cart(&backend, &key, config.on_decode_error).await?;

        tracing::info!(key = %key, items = cart.len(), "cart store ready");

        let live = Arc::new(Live {
            state: RwLock::new(State { cart, revision: 0 }),
        });
        let (dirty_tx, dirty_rx) = watch::channel(0u64);
        let (status_tx, status_rx) = watch::channel(PersistStatus::default());

        tokio::spawn(persist_loop(
            backend,
            key.clone(),
            Arc::clone(&live),
            dirty_rx,
            status_tx,
        ));

        Ok(Self {
            inner: Arc::new(Inner {
                key,
                persist_unchanged: config.persist_unchanged,
                live,
                dirty: dirty_tx,
                status: status_rx,
            }),
        })
    }

    /// Add a product, or bump its quantity if it is already in the cart.
    ///
    /// Returns [`CartError::InvalidItem`] without touching the cart if the
    /// item could not be persisted faithfully.
    pub fn add_to_cart(&self, item: NewLineItem) -> Result<Mutation, CartError> {
        if let Err(e) = item.validate() {
            tracing::warn!(product_id = %item.id, error = %e, "rejected cart item");
            return Err(e.into());
        }
        let id = item.id.clone();
        Ok(self.apply(&id, |cart| cart.merge(item)))
    }

    /// Raise a product's quantity by one. Unknown ids are a no-op.
    pub fn increment(&self, id: &ProductId) -> Mutation {
        self.apply(id, |cart| cart.increment(id))
    }

    /// Lower a product's quantity by one, removing it at zero. Unknown ids are a no-op.
    pub fn decrement(&self, id: &ProductId) -> Mutation {
        self.apply(id, |cart| cart.decrement(id))
    }

    /// Copy of the current items in insertion order.
    pub fn products(&self) -> Vec<LineItem> {
        self.inner.live.read().cart.items().to_vec()
    }

    /// Copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.inner.live.read().cart.clone()
    }

    /// Revision of the live cart; bumped by every operation that schedules a write.
    pub fn revision(&self) -> u64 {
        self.inner.live.read().revision
    }

    /// Outcome of the latest write attempt.
    pub fn last_persist(&self) -> PersistStatus {
        self.inner.status.borrow().clone()
    }

    /// Key the cart is persisted under.
    pub fn storage_key(&self) -> &str {
        &self.inner.key
    }

    /// Wait until every change made so far has been written.
    ///
    /// Returns [`CartError::Persist`] if the write covering the current
    /// revision failed. The in-memory cart is unaffected either way.
    pub async fn flush(&self) -> Result<(), CartError> {
        let target = self.revision();
        let mut status = self.inner.status.clone();
        let outcome = status
            .wait_for(|s| s.revision >= target)
            .await
            .map_err(|_| CartError::PersisterStopped)?
            .clone();

        match outcome.error {
            Some(message) => Err(CartError::Persist {
                revision: outcome.revision,
                message,
            }),
            None => Ok(()),
        }
    }

    fn apply(&self, id: &ProductId, op: impl FnOnce(&mut Cart) -> Mutation) -> Mutation {
        let (mutation, scheduled) = {
            let mut state = self.inner.live.write();
            let mutation = op(&mut state.cart);
            if mutation.changed() || self.inner.persist_unchanged {
                state.revision += 1;
                // Sent under the lock so revisions reach the persister in order.
                self.inner.dirty.send_replace(state.revision);
                (mutation, Some(state.revision))
            } else {
                (mutation, None)
            }
        };

        match scheduled {
            Some(revision) => {
                tracing::debug!(product_id = %id, %mutation, revision, "cart updated");
            }
            None => tracing::debug!(product_id = %id, "no cart item to update"),
        }
        mutation
    }
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.live.read();
        f.debug_struct("CartStore")
            .field("key", &self.inner.key)
            .field("items", &state.cart.len())
            .field("revision", &state.revision)
            .finish()
    }
}

async fn load_cart<S: KvStore>(
    backend: &S,
    key: &str,
    policy: DecodePolicy,
) -> Result<Cart, CartError> {
    let bytes = match backend.load(key).await? {
        Some(bytes) if !bytes.iter().all(u8::is_ascii_whitespace) => bytes,
        _ => return Ok(Cart::new()),
    };

    match Cart::from_slice(&bytes) {
        Ok(cart) => Ok(cart),
        Err(source) => match policy {
            DecodePolicy::Fail => Err(CartError::Decode {
                key: key.to_string(),
                source,
            }),
            DecodePolicy::Empty => {
                tracing::warn!(key, error = %source, "discarding undecodable cart, starting empty");
                Ok(Cart::new())
            }
        },
    }
}

async fn persist_loop<S: KvStore>(
    backend: S,
    key: String,
    live: Arc<Live>,
    mut dirty: watch::Receiver<u64>,
    status: watch::Sender<PersistStatus>,
) {
    let mut written = 0u64;

    while dirty.changed().await.is_ok() {
        let (revision, encoded) = {
            let state = live.read();
            (state.revision, state.cart.to_vec())
        };
        if revision == written {
            continue;
        }

        let result = match encoded {
            Ok(bytes) => backend.save(&key, &bytes).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match result {
            Ok(()) => {
                written = revision;
                tracing::debug!(key = %key, revision, "cart persisted");
                status.send_replace(PersistStatus {
                    revision,
                    error: None,
                });
            }
            Err(message) => {
                tracing::error!(key = %key, revision, error = %message, "failed to persist cart");
                status.send_replace(PersistStatus {
                    revision,
                    error: Some(message),
                });
            }
        }
    }

    tracing::debug!(key = %key, "cart persister stopped");
}
