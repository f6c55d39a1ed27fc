use std::sync::Arc;

use anyhow::Result;
use piecekeeper_lib::auth::{AuthProvider, MemoryAuth};
use piecekeeper_lib::{
    CollectionBackend, CollectionService, ItemDraft, ItemStore, SnapshotCleanup, SnapshotStore,
    StoreHandle,
};

#[path = "util.rs"]
mod util;

use util::item_store;

fn draft(name: &str) -> ItemDraft {
    serde_json::from_value(serde_json::json!({
        "name": name,
        "category": "Flap",
        "shape": "Square",
        "colors": ["Pink"],
        "price": 49.0
    }))
    .unwrap()
}

// The flow the app walks through: collect items while signed out, sign in,
// then let the migration assistant move the snapshot into the owner's
// authoritative collection.
#[tokio::test]
async fn signing_in_switches_the_backend_and_migrates_local_data() -> Result<()> {
    let kv = StoreHandle::in_memory();
    let snapshot = SnapshotStore::new(kv.clone());
    let remote = item_store().await;

    // Signed out: the session backend is the local snapshot.
    let service = CollectionService::local(snapshot.clone());
    service.add_item(draft("Rosa Klappe")).await.unwrap();
    service.add_item(draft("Blaue Klappe")).await.unwrap();
    assert_eq!(snapshot.load().len(), 2);

    // Sign in; the session change carries the resolved owner id.
    let auth = MemoryAuth::new();
    let sessions = auth.subscribe();
    auth.sign_up("zoe@example.com", "pw").await.unwrap();
    let session = sessions.borrow().clone().expect("signed in");

    // A new service for the session, now backed by the authoritative store.
    let service = CollectionService::new(
        CollectionBackend::remote(Arc::new(remote.clone()), session.owner_id.clone()),
        snapshot.clone(),
    );

    let summary = service
        .migrate_snapshot(SnapshotCleanup::Automatic)
        .await
        .unwrap();
    assert_eq!(summary.outcome.new_count, 2);
    assert!(snapshot.load().is_empty());

    let cloud = remote.list(&session.owner_id).await?;
    assert_eq!(cloud.len(), 2);
    assert!(cloud
        .iter()
        .all(|i| i.owner_id.as_deref() == Some(session.owner_id.as_str())));
    Ok(())
}
