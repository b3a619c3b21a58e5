//! End-to-end behaviour of the persisted cart store.

use std::time::Duration;

use cart_core::prelude::*;
use cart_kv::{JsonFileStore, KvStore, MemoryStore};

const KEY: &str = "cart:items";

fn razor() -> NewLineItem {
    NewLineItem::new("p1", "Razor", "u", 9.99)
}

fn item(id: &str) -> NewLineItem {
    NewLineItem::new(id, format!("Product {id}"), format!("https://img/{id}.png"), 2.5)
}

async fn open(backend: &MemoryStore) -> CartStore {
    CartStore::open(backend.clone(), CartConfig::default())
        .await
        .unwrap()
}

async fn persisted(backend: &MemoryStore) -> Cart {
    let bytes = backend.raw(KEY).await.expect("cart was persisted");
    Cart::from_slice(&bytes).unwrap()
}

fn quantities(items: &[LineItem]) -> Vec<(String, u32)> {
    items
        .iter()
        .map(|i| (i.id.to_string(), i.quantity))
        .collect()
}

// === Scenarios ===

#[tokio::test]
async fn test_add_to_empty_cart() {
    let backend = MemoryStore::new();
    let store = open(&backend).await;

    assert_eq!(store.add_to_cart(razor()).unwrap(), Mutation::Added);

    let products = store.products();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, ProductId::new("p1"));
    assert_eq!(products[0].title, "Razor");
    assert_eq!(products[0].image_url, "u");
    assert_eq!(products[0].unit_price, 9.99);
    assert_eq!(products[0].quantity, 1);
}

#[tokio::test]
async fn test_duplicate_add_increments() {
    let backend = MemoryStore::new();
    let store = open(&backend).await;

    store.add_to_cart(razor()).unwrap();
    assert_eq!(
        store.add_to_cart(razor()).unwrap(),
        Mutation::Incremented { quantity: 2 }
    );

    assert_eq!(quantities(&store.products()), vec![("p1".to_string(), 2)]);
}

#[tokio::test]
async fn test_decrement_to_removal() {
    let backend = MemoryStore::new();
    let store = open(&backend).await;
    let id = ProductId::new("p1");
    store.add_to_cart(razor()).unwrap();
    store.add_to_cart(razor()).unwrap();

    assert_eq!(store.decrement(&id), Mutation::Decremented { quantity: 1 });
    assert_eq!(quantities(&store.products()), vec![("p1".to_string(), 1)]);

    assert_eq!(store.decrement(&id), Mutation::Removed);
    assert!(store.products().is_empty());

    assert_eq!(store.decrement(&id), Mutation::NotFound);
    assert!(store.products().is_empty());

    store.flush().await.unwrap();
    assert!(persisted(&backend).await.is_empty());
}

#[tokio::test]
async fn test_increment_unknown_id_is_noop() {
    let backend = MemoryStore::new();
    let store = open(&backend).await;
    store.add_to_cart(razor()).unwrap();
    let before = store.snapshot();

    assert_eq!(store.increment(&ProductId::new("p9")), Mutation::NotFound);
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn test_empty_first_load_then_add_persists() {
    let backend = MemoryStore::new().with_entry(KEY, Vec::new());
    let store = open(&backend).await;
    assert!(store.products().is_empty());

    store.add_to_cart(razor()).unwrap();
    store.flush().await.unwrap();

    let bytes = backend.load(KEY).await.unwrap().unwrap();
    let cart = Cart::from_slice(&bytes).unwrap();
    assert_eq!(cart.items(), store.products().as_slice());
    assert_eq!(cart.items()[0].quantity, 1);
}

// === Persistence freshness ===

#[tokio::test]
async fn test_every_flush_matches_snapshot() {
    let backend = MemoryStore::new();
    let store = open(&backend).await;

    store.add_to_cart(item("a")).unwrap();
    store.flush().await.unwrap();
    assert_eq!(persisted(&backend).await, store.snapshot());

    store.add_to_cart(item("b")).unwrap();
    store.increment(&ProductId::new("a"));
    store.flush().await.unwrap();
    assert_eq!(persisted(&backend).await, store.snapshot());

    store.decrement(&ProductId::new("b"));
    store.flush().await.unwrap();
    assert_eq!(persisted(&backend).await, store.snapshot());
}

#[tokio::test]
async fn test_mutations_during_slow_write_are_not_lost() {
    let backend = MemoryStore::new().with_save_delay(Duration::from_millis(30));
    let store = open(&backend).await;

    store.add_to_cart(item("a")).unwrap();
    // Let the persister pick up the first revision and start its slow save.
    tokio::time::sleep(Duration::from_millis(5)).await;

    store.add_to_cart(item("b")).unwrap();
    store.increment(&ProductId::new("a"));
    store.add_to_cart(item("c")).unwrap();
    store.decrement(&ProductId::new("c"));

    store.flush().await.unwrap();

    let saved = persisted(&backend).await;
    assert_eq!(saved, store.snapshot());
    assert_eq!(
        quantities(saved.items()),
        vec![("a".to_string(), 2), ("b".to_string(), 1)]
    );
}

#[tokio::test]
async fn test_burst_of_mutations_coalesces() {
    let backend = MemoryStore::new();
    let store = open(&backend).await;

    for _ in 0..50 {
        store.add_to_cart(item("a")).unwrap();
    }
    store.flush().await.unwrap();

    assert_eq!(persisted(&backend).await.items()[0].quantity, 50);
    assert!(backend.save_count() <= 50);
}

#[tokio::test]
async fn test_concurrent_handles_converge() {
    let backend = MemoryStore::new();
    let store = open(&backend).await;

    let mut tasks = Vec::new();
    for n in 0..8 {
        let handle = store.clone();
        tasks.push(tokio::spawn(async move {
            for _ in 0..10 {
                handle.add_to_cart(item(&format!("p{}", n % 4))).unwrap();
                tokio::task::yield_now().await;
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    store.flush().await.unwrap();
    let saved = persisted(&backend).await;
    assert_eq!(saved, store.snapshot());
    assert_eq!(saved.len(), 4);
    assert_eq!(saved.item_count(), 80);
}

#[tokio::test]
async fn test_noop_does_not_write_by_default() {
    let backend = MemoryStore::new();
    let store = open(&backend).await;

    store.increment(&ProductId::new("ghost"));
    store.decrement(&ProductId::new("ghost"));
    store.flush().await.unwrap();

    assert_eq!(backend.save_count(), 0);
    assert_eq!(backend.raw(KEY).await, None);
}

// === Failures ===

#[tokio::test]
async fn test_save_failure_is_observable_and_keeps_memory() {
    let backend = MemoryStore::new();
    let store = open(&backend).await;
    backend.fail_saves(true);

    store.add_to_cart(razor()).unwrap();
    let err = store.flush().await.unwrap_err();
    assert!(matches!(err, CartError::Persist { revision: 1, .. }));

    let status = store.last_persist();
    assert_eq!(status.revision, 1);
    assert!(!status.is_ok());
    assert_eq!(store.products().len(), 1);
    assert_eq!(backend.raw(KEY).await, None);

    backend.fail_saves(false);
    store.increment(&ProductId::new("p1"));
    store.flush().await.unwrap();

    assert!(store.last_persist().is_ok());
    assert_eq!(persisted(&backend).await, store.snapshot());
}

#[tokio::test]
async fn test_undecodable_cart_fails_open() {
    let backend = MemoryStore::new().with_entry(KEY, b"{not a cart".to_vec());

    let err = CartStore::open(backend, CartConfig::default())
        .await
        .unwrap_err();

    match err {
        CartError::Decode { key, .. } => assert_eq!(key, KEY),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_cart_document_fails_open() {
    let doc = br#"[{"id":"p1","title":"t","image_url":"u","price":1.0,"quantity":0}]"#;
    let backend = MemoryStore::new().with_entry(KEY, doc.to_vec());

    let result = CartStore::open(backend, CartConfig::default()).await;
    assert!(matches!(result, Err(CartError::Decode { .. })));
}

#[tokio::test]
async fn test_undecodable_cart_with_empty_policy() {
    let backend = MemoryStore::new().with_entry(KEY, b"garbage".to_vec());
    let config = CartConfig::default().with_decode_policy(DecodePolicy::Empty);

    let store = CartStore::open(backend.clone(), config).await.unwrap();
    assert!(store.products().is_empty());

    store.add_to_cart(razor()).unwrap();
    store.flush().await.unwrap();
    assert_eq!(persisted(&backend).await, store.snapshot());
}

// === Lifecycle ===

#[tokio::test]
async fn test_restart_hydrates_from_backend() {
    let backend = MemoryStore::new();
    {
        let store = open(&backend).await;
        store.add_to_cart(item("a")).unwrap();
        store.add_to_cart(item("b")).unwrap();
        store.add_to_cart(item("a")).unwrap();
        store.flush().await.unwrap();
    }

    let reopened = open(&backend).await;
    assert_eq!(
        quantities(&reopened.products()),
        vec![("a".to_string(), 2), ("b".to_string(), 1)]
    );
}

#[tokio::test]
async fn test_non_finite_price_never_reaches_backend() {
    let backend = MemoryStore::new();
    {
        let store = open(&backend).await;
        store.add_to_cart(razor()).unwrap();
        let result = store.add_to_cart(NewLineItem::new("p2", "Broken", "u", f64::INFINITY));
        assert!(matches!(result, Err(CartError::InvalidItem(_))));
        store.flush().await.unwrap();
    }

    let reopened = open(&backend).await;
    assert_eq!(quantities(&reopened.products()), vec![("p1".to_string(), 1)]);
}

#[tokio::test]
async fn test_dropping_store_writes_pending_change() {
    let backend = MemoryStore::new();
    let store = open(&backend).await;
    store.add_to_cart(razor()).unwrap();
    drop(store);

    let saved = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let Some(bytes) = backend.raw(KEY).await {
                return Cart::from_slice(&bytes).unwrap();
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("pending change written after drop");

    assert_eq!(saved.len(), 1);
}

#[tokio::test]
async fn test_custom_storage_key() {
    let backend = MemoryStore::new();
    let config = CartConfig::default().with_storage_key("shop:cart");
    let store = CartStore::open(backend.clone(), config).await.unwrap();

    store.add_to_cart(razor()).unwrap();
    store.flush().await.unwrap();

    assert_eq!(store.storage_key(), "shop:cart");
    assert!(backend.raw("shop:cart").await.is_some());
    assert!(backend.raw(KEY).await.is_none());
}

#[tokio::test]
async fn test_file_backend_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    {
        let backend = JsonFileStore::open(&path).await.unwrap();
        let store = CartStore::open(backend, CartConfig::default()).await.unwrap();
        store.add_to_cart(NewLineItem::new("p1", "Razor", "u", 0.1 + 0.2)).unwrap();
        store.add_to_cart(item("b")).unwrap();
        store.flush().await.unwrap();
    }

    let backend = JsonFileStore::open(&path).await.unwrap();
    let store = CartStore::open(backend, CartConfig::default()).await.unwrap();
    let products = store.products();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].unit_price, 0.1 + 0.2);
}

// === Provider ===

#[tokio::test]
async fn test_provider_gate() {
    assert!(matches!(use_cart(), Err(CartError::OutsideProvider)));

    let backend = MemoryStore::new();
    let provider = CartProvider::mount(backend.clone(), CartConfig::default())
        .await
        .unwrap();

    let result: Result<(), CartError> = provider
        .scope(async {
            let cart = use_cart()?;
            cart.add_to_cart(razor()).unwrap();
            cart.flush().await
        })
        .await;
    result.unwrap();

    assert_eq!(persisted(&backend).await, provider.store().snapshot());
}
