use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::warn;

use crate::db::write_atomic;
use crate::model::Item;

/// Fixed key the snapshot lives under; the same scoped store also carries
/// unrelated small state (see `notices`).
pub const SNAPSHOT_KEY: &str = "collectionSnapshot";

trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
    fn remove(&self, key: &str);
    fn save(&self) -> anyhow::Result<()>;
}

struct JsonFileStore {
    path: PathBuf,
    data: Mutex<BTreeMap<String, Value>>,
}

impl JsonFileStore {
    fn open(path: PathBuf) -> Self {
        let data = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<BTreeMap<String, Value>>(&text) {
                Ok(map) => map,
                Err(err) => {
                    warn!(
                        target: "piecekeeper",
                        event = "kv_store_corrupt",
                        path = %path.display(),
                        error = %err
                    );
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        JsonFileStore {
            path,
            data: Mutex::new(data),
        }
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.data
            .lock()
            .map(|guard| guard.get(key).cloned())
            .unwrap_or_default()
    }

    fn set(&self, key: &str, value: Value) {
        if let Ok(mut guard) = self.data.lock() {
            guard.insert(key.to_string(), value);
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut guard) = self.data.lock() {
            guard.remove(key);
        }
    }

    fn save(&self) -> anyhow::Result<()> {
        let payload = {
            let guard = self
                .data
                .lock()
                .map_err(|_| anyhow::anyhow!("kv store poisoned"))?;
            serde_json::to_vec_pretty(&*guard)?
        };
        write_atomic(&self.path, &payload)?;
        Ok(())
    }
}

#[derive(Default)]
struct MemoryStore {
    data: Mutex<BTreeMap<String, Value>>,
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.data
            .lock()
            .map(|guard| guard.get(key).cloned())
            .unwrap_or_default()
    }

    fn set(&self, key: &str, value: Value) {
        if let Ok(mut guard) = self.data.lock() {
            guard.insert(key.to_string(), value);
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut guard) = self.data.lock() {
            guard.remove(key);
        }
    }

    fn save(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Handle onto the scoped key-value store. Cheap to clone; the file-backed
/// variant persists on `persist()`, the in-memory variant backs tests.
#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<dyn KvStore + Send + Sync>,
}

impl StoreHandle {
    pub fn open_file(path: PathBuf) -> Self {
        Self {
            inner: Arc::new(JsonFileStore::open(path)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(MemoryStore::default()),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.get(key)
    }

    pub fn set(&self, key: &str, value: Value) {
        self.inner.set(key, value);
    }

    pub fn remove(&self, key: &str) {
        self.inner.remove(key);
    }

    pub fn persist(&self) -> anyhow::Result<()> {
        self.inner.save()
    }
}

/// Process-local persisted fallback for the whole collection, active only
/// while no owner is signed in. Never a cache in front of the remote store.
#[derive(Clone)]
pub struct SnapshotStore {
    store: StoreHandle,
}

impl SnapshotStore {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    pub fn handle(&self) -> &StoreHandle {
        &self.store
    }

    /// Last saved snapshot, or empty when none exists. Corrupt data is
    /// logged and treated as empty, not surfaced as an error.
    pub fn load(&self) -> Vec<Item> {
        match self.store.get(SNAPSHOT_KEY) {
            Some(value) => match serde_json::from_value::<Vec<Item>>(value) {
                Ok(items) => items,
                Err(err) => {
                    warn!(
                        target: "piecekeeper",
                        event = "snapshot_corrupt",
                        error = %err
                    );
                    Vec::new()
                }
            },
            None => Vec::new(),
        }
    }

    /// Overwrite the snapshot wholesale.
    pub fn save(&self, items: &[Item]) -> anyhow::Result<()> {
        self.store.set(SNAPSHOT_KEY, serde_json::to_value(items)?);
        self.store.persist()
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        self.store.remove(SNAPSHOT_KEY);
        self.store.persist()
    }

    pub fn is_empty(&self) -> bool {
        self.load().is_empty()
    }
}
