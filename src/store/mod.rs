use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::Item;

pub mod remote;
pub mod snapshot;

pub use remote::SqliteItemStore;
pub use snapshot::{SnapshotStore, StoreHandle, SNAPSHOT_KEY};

/// Failure taxonomy at the store seam. Callers never retry automatically;
/// recovery is manual re-invocation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure reaching the store.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// The store rejected a write, e.g. an identity collision.
    #[error("constraint violation: {0}")]
    Constraint(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;
        match &err {
            sqlx::Error::Database(db) => match db.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => StoreError::Constraint(db.message().to_string()),
                _ => StoreError::Unavailable(err.to_string()),
            },
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// The authoritative multi-item store, every operation scoped to one owner.
/// `list` failures are fatal inside the reconciliation engine; UI paths may
/// degrade to empty-with-warning instead.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn list(&self, owner_id: &str) -> StoreResult<Vec<Item>>;
    /// Insert a batch as new records. On failure the entire batch is
    /// considered not committed; callers do not partially retry.
    async fn bulk_insert(&self, owner_id: &str, items: &[Item]) -> StoreResult<()>;
    /// Insert-or-replace a single record by identity.
    async fn upsert(&self, owner_id: &str, item: &Item) -> StoreResult<()>;
    async fn delete(&self, owner_id: &str, item_id: &str) -> StoreResult<()>;
    async fn delete_all(&self, owner_id: &str) -> StoreResult<()>;
}

/// Which store holds the collection this session: the owner-scoped
/// authoritative store once signed in, otherwise the local snapshot.
/// Selected once per session so nothing downstream branches on mode.
#[derive(Clone)]
pub enum CollectionBackend {
    Remote {
        store: Arc<dyn ItemStore>,
        owner_id: String,
    },
    Local {
        snapshot: SnapshotStore,
    },
}

impl CollectionBackend {
    pub fn remote(store: Arc<dyn ItemStore>, owner_id: impl Into<String>) -> Self {
        CollectionBackend::Remote {
            store,
            owner_id: owner_id.into(),
        }
    }

    pub fn local(snapshot: SnapshotStore) -> Self {
        CollectionBackend::Local { snapshot }
    }

    pub fn owner_id(&self) -> Option<&str> {
        match self {
            CollectionBackend::Remote { owner_id, .. } => Some(owner_id),
            CollectionBackend::Local { .. } => None,
        }
    }

    pub async fn list(&self) -> StoreResult<Vec<Item>> {
        match self {
            CollectionBackend::Remote { store, owner_id } => store.list(owner_id).await,
            CollectionBackend::Local { snapshot } => {
                let mut items = snapshot.load();
                items.sort_by(|a, b| a.name.cmp(&b.name));
                Ok(items)
            }
        }
    }

    pub async fn get(&self, item_id: &str) -> StoreResult<Option<Item>> {
        Ok(self.list().await?.into_iter().find(|i| i.id == item_id))
    }

    pub async fn put(&self, item: &Item) -> StoreResult<()> {
        match self {
            CollectionBackend::Remote { store, owner_id } => store.upsert(owner_id, item).await,
            CollectionBackend::Local { snapshot } => {
                let mut items = snapshot.load();
                match items.iter_mut().find(|i| i.id == item.id) {
                    Some(existing) => *existing = item.clone(),
                    None => items.push(item.clone()),
                }
                snapshot.save(&items).map_err(StoreError::from)
            }
        }
    }

    pub async fn remove(&self, item_id: &str) -> StoreResult<()> {
        match self {
            CollectionBackend::Remote { store, owner_id } => store.delete(owner_id, item_id).await,
            CollectionBackend::Local { snapshot } => {
                let mut items = snapshot.load();
                items.retain(|i| i.id != item_id);
                snapshot.save(&items).map_err(StoreError::from)
            }
        }
    }

    pub async fn clear(&self) -> StoreResult<()> {
        match self {
            CollectionBackend::Remote { store, owner_id } => store.delete_all(owner_id).await,
            CollectionBackend::Local { snapshot } => snapshot.clear().map_err(StoreError::from),
        }
    }
}
