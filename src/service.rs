use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;

use crate::blob::BlobStore;
use crate::combine;
use crate::error::{AppError, AppResult};
use crate::export::{export_collection, ExportEntry, ExportOptions};
use crate::id::new_uuid_v7;
use crate::import::parse_candidates;
use crate::model::{Item, ItemDraft};
use crate::reconcile::{reconcile, summary_message, ReconcileOutcome, SnapshotCleanup};
use crate::stats::{collection_stats, CollectionStats};
use crate::store::{CollectionBackend, SnapshotStore, StoreError};
use crate::time::now_ms;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../ui/bindings/")]
pub enum SortKey {
    Name,
    PriceAsc,
    PriceDesc,
    Usage,
}

/// What the UI shows after an import or migration run.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../ui/bindings/")]
pub struct ImportSummary {
    pub outcome: ReconcileOutcome,
    pub message: String,
}

/// The data-operations surface the UI calls. Holds the session's collection
/// backend (picked once, remote when an owner is signed in) and the local
/// snapshot used by the signed-out mode and the migration assistant.
pub struct CollectionService {
    backend: CollectionBackend,
    snapshot: SnapshotStore,
}

fn store_ctx(op: &'static str) -> impl FnOnce(StoreError) -> AppError {
    move |err| AppError::from(err).with_context("operation", op)
}

impl CollectionService {
    pub fn new(backend: CollectionBackend, snapshot: SnapshotStore) -> Self {
        Self { backend, snapshot }
    }

    pub fn local(snapshot: SnapshotStore) -> Self {
        Self {
            backend: CollectionBackend::local(snapshot.clone()),
            snapshot,
        }
    }

    pub fn backend(&self) -> &CollectionBackend {
        &self.backend
    }

    pub async fn list_items(&self, sort: SortKey) -> AppResult<Vec<Item>> {
        let mut items = self.backend.list().await.map_err(store_ctx("list"))?;
        match sort {
            SortKey::Name => items.sort_by(|a, b| a.name.cmp(&b.name)),
            SortKey::PriceAsc => items.sort_by(|a, b| a.price.total_cmp(&b.price)),
            SortKey::PriceDesc => items.sort_by(|a, b| b.price.total_cmp(&a.price)),
            SortKey::Usage => items.sort_by(|a, b| b.usage_count.cmp(&a.usage_count)),
        }
        Ok(items)
    }

    pub async fn get_item(&self, id: &str) -> AppResult<Item> {
        self.backend
            .get(id)
            .await
            .map_err(store_ctx("get"))?
            .ok_or_else(|| {
                AppError::new("ITEM/NOT_FOUND", "Item not found").with_context("id", id.to_string())
            })
    }

    /// Create an item from user-editable fields. Identity, owner and
    /// timestamps are assigned here; callers never supply them.
    pub async fn add_item(&self, draft: ItemDraft) -> AppResult<Item> {
        let mut item = Item::from(draft);
        item.id = new_uuid_v7();
        item.owner_id = self.backend.owner_id().map(str::to_owned);
        let now = now_ms();
        item.created_at = now;
        item.updated_at = now;
        item.validate()
            .map_err(|err| AppError::new("ITEM/INVALID", err.to_string()))?;

        self.backend.put(&item).await.map_err(store_ctx("create"))?;
        Ok(item)
    }

    /// Replace an item's fields; identity, owner and creation time are
    /// carried over from the stored copy.
    pub async fn update_item(&self, mut item: Item) -> AppResult<Item> {
        let existing = self.get_item(&item.id).await?;
        item.owner_id = existing.owner_id;
        item.created_at = existing.created_at;
        item.updated_at = now_ms();
        item.validate()
            .map_err(|err| AppError::new("ITEM/INVALID", err.to_string()))?;

        self.backend.put(&item).await.map_err(store_ctx("update"))?;
        Ok(item)
    }

    pub async fn delete_item(&self, id: &str) -> AppResult<()> {
        self.backend.remove(id).await.map_err(store_ctx("delete"))
    }

    /// The "worn again" action.
    pub async fn record_wear(&self, id: &str) -> AppResult<Item> {
        let mut item = self.get_item(id).await?;
        item.usage_count += 1;
        item.updated_at = now_ms();
        self.backend
            .put(&item)
            .await
            .map_err(store_ctx("record_wear"))?;
        Ok(item)
    }

    pub async fn mark_sold(&self, id: &str, selling_price: f64) -> AppResult<Item> {
        let mut item = self.get_item(id).await?;
        item.is_sold = true;
        item.selling_price = Some(selling_price);
        item.updated_at = now_ms();
        item.validate()
            .map_err(|err| AppError::new("ITEM/INVALID", err.to_string()))?;
        self.backend
            .put(&item)
            .await
            .map_err(store_ctx("mark_sold"))?;
        Ok(item)
    }

    pub async fn attach_photo(
        &self,
        id: &str,
        bytes: &[u8],
        content_type: &str,
        blobs: &dyn BlobStore,
    ) -> AppResult<Item> {
        let mut item = self.get_item(id).await?;
        let url = blobs.upload(bytes, content_type).await?;
        if let Some(old) = item.photo_url.replace(url) {
            // Best-effort cleanup of the replaced photo.
            if let Err(err) = blobs.delete(&old).await {
                err.log_with_event("photo_cleanup_failed");
            }
        }
        item.updated_at = now_ms();
        self.backend
            .put(&item)
            .await
            .map_err(store_ctx("attach_photo"))?;
        Ok(item)
    }

    /// Compose a combination from existing pieces and add it to the
    /// collection.
    pub async fn compose_combination(&self, name: &str, part_ids: &[String]) -> AppResult<Item> {
        let all = self.backend.list().await.map_err(store_ctx("list"))?;
        let parts: Vec<Item> = all
            .into_iter()
            .filter(|item| part_ids.contains(&item.id))
            .collect();
        if parts.len() != part_ids.len() {
            return Err(AppError::new(
                "ITEM/NOT_FOUND",
                "One of the selected pieces no longer exists.",
            ));
        }
        let kombi = combine::compose(name, &parts)
            .map_err(|err| AppError::new("COMBINE/INVALID", err.to_string()))?;

        let mut item = kombi;
        item.id = new_uuid_v7();
        item.owner_id = self.backend.owner_id().map(str::to_owned);
        let now = now_ms();
        item.created_at = now;
        item.updated_at = now;
        self.backend
            .put(&item)
            .await
            .map_err(store_ctx("compose_combination"))?;
        Ok(item)
    }

    /// Import a file's content. Signed in, candidates are merged into the
    /// authoritative store by fingerprint; signed out, the snapshot is
    /// replaced wholesale with freshly-identified items.
    pub async fn import_text(&self, text: &str) -> AppResult<ImportSummary> {
        let candidates = parse_candidates(text).map_err(AppError::from)?;

        match &self.backend {
            CollectionBackend::Remote { store, owner_id } => {
                let outcome = reconcile(store.as_ref(), owner_id, candidates)
                    .await
                    .map_err(store_ctx("import"))?;
                let message = summary_message(&outcome);
                Ok(ImportSummary { outcome, message })
            }
            CollectionBackend::Local { snapshot } => {
                let now = now_ms();
                let items: Vec<Item> = candidates
                    .into_iter()
                    .map(|mut item| {
                        item.id = new_uuid_v7();
                        item.owner_id = None;
                        item.created_at = now;
                        item.updated_at = now;
                        item
                    })
                    .collect();
                snapshot
                    .save(&items)
                    .map_err(|err| AppError::from(StoreError::from(err)))?;
                let outcome = ReconcileOutcome {
                    new_count: items.len(),
                    duplicate_count: 0,
                    items,
                };
                let message = summary_message(&outcome);
                Ok(ImportSummary { outcome, message })
            }
        }
    }

    /// The migration assistant: move the signed-out snapshot into the
    /// owner's authoritative collection. Callers choose whether the local
    /// snapshot is cleared automatically on success or left for an explicit
    /// cleanup step.
    pub async fn migrate_snapshot(&self, cleanup: SnapshotCleanup) -> AppResult<ImportSummary> {
        let CollectionBackend::Remote { store, owner_id } = &self.backend else {
            return Err(AppError::new(
                "MIGRATE/NO_OWNER",
                "Sign in before migrating local data.",
            ));
        };

        let candidates = self.snapshot.load();
        let outcome = reconcile(store.as_ref(), owner_id, candidates)
            .await
            .map_err(store_ctx("migrate"))?;

        if cleanup == SnapshotCleanup::Automatic {
            self.snapshot
                .clear()
                .map_err(|err| AppError::from(StoreError::from(err)))?;
        }
        info!(
            target: "piecekeeper",
            event = "snapshot_migrated",
            new_count = outcome.new_count,
            duplicate_count = outcome.duplicate_count,
            cleanup = ?cleanup
        );

        let message = summary_message(&outcome);
        Ok(ImportSummary { outcome, message })
    }

    /// Explicit cleanup after a `Manual` migration, or user dismissal.
    pub fn discard_snapshot(&self) -> AppResult<()> {
        self.snapshot
            .clear()
            .map_err(|err| AppError::from(StoreError::from(err)))
    }

    pub async fn export_to(&self, out_parent: std::path::PathBuf) -> AppResult<ExportEntry> {
        let items = self.list_items(SortKey::Name).await?;
        export_collection(&items, &ExportOptions { out_parent })
    }

    pub async fn stats(&self) -> AppResult<CollectionStats> {
        let items = self.backend.list().await.map_err(store_ctx("stats"))?;
        Ok(collection_stats(&items))
    }
}
