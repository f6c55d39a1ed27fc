#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use piecekeeper_lib::migrate::apply_migrations;
use piecekeeper_lib::{Item, ItemCategory, ItemShape, ItemStore, SqliteItemStore, StoreError};

pub async fn temp_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect sqlite::memory:");
    sqlx::query("PRAGMA foreign_keys=ON;")
        .execute(&pool)
        .await
        .unwrap();
    pool
}

pub async fn item_store() -> SqliteItemStore {
    let pool = temp_pool().await;
    apply_migrations(&pool).await.expect("apply migrations");
    SqliteItemStore::new(pool)
}

pub fn piece(name: &str, shape: Option<ItemShape>, color: &str) -> Item {
    Item {
        id: String::new(),
        owner_id: None,
        name: name.to_string(),
        category: ItemCategory::Flap,
        shape,
        colors: vec![color.to_string()],
        price: 49.0,
        purchase_price: None,
        usage_count: 0,
        is_sold: false,
        selling_price: None,
        notes: None,
        photo_url: None,
        created_at: 0,
        updated_at: 0,
    }
}

/// Wraps the real store to observe and sabotage individual operations.
pub struct FlakyStore {
    pub inner: SqliteItemStore,
    pub fail_list: AtomicBool,
    pub fail_bulk_insert: AtomicBool,
    pub serve_stale_list_once: AtomicBool,
    pub bulk_insert_calls: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: SqliteItemStore) -> Arc<Self> {
        Arc::new(FlakyStore {
            inner,
            fail_list: AtomicBool::new(false),
            fail_bulk_insert: AtomicBool::new(false),
            serve_stale_list_once: AtomicBool::new(false),
            bulk_insert_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ItemStore for FlakyStore {
    async fn list(&self, owner_id: &str) -> Result<Vec<Item>, StoreError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected list failure".into()));
        }
        if self.serve_stale_list_once.swap(false, Ordering::SeqCst) {
            // A snapshot from before another writer committed.
            return Ok(Vec::new());
        }
        self.inner.list(owner_id).await
    }

    async fn bulk_insert(&self, owner_id: &str, items: &[Item]) -> Result<(), StoreError> {
        self.bulk_insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_bulk_insert.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected insert failure".into()));
        }
        self.inner.bulk_insert(owner_id, items).await
    }

    async fn upsert(&self, owner_id: &str, item: &Item) -> Result<(), StoreError> {
        self.inner.upsert(owner_id, item).await
    }

    async fn delete(&self, owner_id: &str, item_id: &str) -> Result<(), StoreError> {
        self.inner.delete(owner_id, item_id).await
    }

    async fn delete_all(&self, owner_id: &str) -> Result<(), StoreError> {
        self.inner.delete_all(owner_id).await
    }
}
