use std::collections::HashSet;

use serde::Serialize;
use tracing::info;
use ts_rs::TS;

use crate::id::new_uuid_v7;
use crate::model::Item;
use crate::store::{ItemStore, StoreResult};
use crate::time::now_ms;

/// Result of merging a candidate set into the authoritative store:
/// counts plus the refreshed authoritative list the UI redraws from.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../ui/bindings/")]
pub struct ReconcileOutcome {
    pub new_count: usize,
    pub duplicate_count: usize,
    pub items: Vec<Item>,
}

/// What to do with the local snapshot after a successful migration:
/// the import call site clears it automatically, the migration assistant
/// leaves it for an explicit cleanup step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../ui/bindings/")]
pub enum SnapshotCleanup {
    Automatic,
    Manual,
}

/// Split candidates into the subset to admit and the count of duplicates
/// already present in the store. Only candidate-vs-store duplicates are
/// filtered; two candidates that duplicate each other are both admitted.
pub(crate) fn partition_candidates(
    existing: &HashSet<String>,
    candidates: Vec<Item>,
) -> (Vec<Item>, usize) {
    let mut fresh = Vec::new();
    let mut duplicates = 0_usize;
    for candidate in candidates {
        if existing.contains(&candidate.fingerprint()) {
            duplicates += 1;
        } else {
            fresh.push(candidate);
        }
    }
    (fresh, duplicates)
}

/// Merge `candidates` into the owner's authoritative collection.
///
/// Steps run strictly in order (list, partition, one batch insert,
/// refresh) because the fingerprint set must reflect store state prior to
/// the write. Identities carried by candidates are discarded; every
/// admitted item gets a fresh one. A duplicate candidate is dropped, never
/// used to overwrite the authoritative copy. Any store failure aborts the
/// whole operation with no outcome; concurrent runs for the same owner are
/// not coordinated here.
pub async fn reconcile(
    store: &dyn ItemStore,
    owner_id: &str,
    candidates: Vec<Item>,
) -> StoreResult<ReconcileOutcome> {
    let current = store.list(owner_id).await?;
    let existing: HashSet<String> = current.iter().map(Item::fingerprint).collect();

    let candidate_count = candidates.len();
    let (fresh, duplicate_count) = partition_candidates(&existing, candidates);
    info!(
        target: "piecekeeper",
        event = "reconcile_partitioned",
        candidates = candidate_count,
        fresh = fresh.len(),
        duplicates = duplicate_count
    );

    if fresh.is_empty() {
        // Nothing written; the list fetched above is still authoritative.
        return Ok(ReconcileOutcome {
            new_count: 0,
            duplicate_count,
            items: current,
        });
    }

    let now = now_ms();
    let admitted: Vec<Item> = fresh
        .into_iter()
        .map(|mut item| {
            item.id = new_uuid_v7();
            item.owner_id = Some(owner_id.to_string());
            item.created_at = now;
            item.updated_at = now;
            item
        })
        .collect();

    store.bulk_insert(owner_id, &admitted).await?;
    let items = store.list(owner_id).await?;
    info!(
        target: "piecekeeper",
        event = "reconcile_committed",
        admitted = admitted.len(),
        total = items.len()
    );

    Ok(ReconcileOutcome {
        new_count: admitted.len(),
        duplicate_count,
        items,
    })
}

/// The user-facing summary, one of exactly three variants.
pub fn summary_message(outcome: &ReconcileOutcome) -> String {
    match (outcome.new_count, outcome.duplicate_count) {
        (0, _) => "All items in the file are already in your collection.".to_string(),
        (n, 0) => format!("Import complete: {n} items added."),
        (n, d) => format!("Import complete: {n} items added, {d} duplicates skipped."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{sample_items, ItemCategory};
    use proptest::prelude::*;

    fn named(name: &str) -> Item {
        let mut item = sample_items().remove(0);
        item.name = name.to_string();
        item
    }

    #[test]
    fn partition_keeps_inter_candidate_duplicates() {
        let existing = HashSet::new();
        let twin_a = named("Zwilling");
        let twin_b = named("Zwilling");
        let (fresh, duplicates) = partition_candidates(&existing, vec![twin_a, twin_b]);
        assert_eq!(fresh.len(), 2);
        assert_eq!(duplicates, 0);
    }

    #[test]
    fn partition_filters_store_duplicates_only() {
        let held = named("Bestand");
        let existing: HashSet<String> = [held.fingerprint()].into_iter().collect();
        let (fresh, duplicates) =
            partition_candidates(&existing, vec![named("Bestand"), named("Neu")]);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].name, "Neu");
        assert_eq!(duplicates, 1);
    }

    #[test]
    fn summary_has_exactly_three_variants() {
        let outcome = |new_count, duplicate_count| ReconcileOutcome {
            new_count,
            duplicate_count,
            items: Vec::new(),
        };
        assert_eq!(
            summary_message(&outcome(2, 3)),
            "Import complete: 2 items added, 3 duplicates skipped."
        );
        assert_eq!(summary_message(&outcome(2, 0)), "Import complete: 2 items added.");
        assert_eq!(
            summary_message(&outcome(0, 5)),
            "All items in the file are already in your collection."
        );
        assert_eq!(
            summary_message(&outcome(0, 0)),
            "All items in the file are already in your collection."
        );
    }

    proptest! {
        // newCount + duplicateCount == candidates.len(), for any overlap.
        #[test]
        fn partition_is_complete(
            store_names in proptest::collection::vec("[a-d]{1,3}", 0..8),
            candidate_names in proptest::collection::vec("[a-d]{1,3}", 0..12),
        ) {
            let existing: HashSet<String> = store_names
                .iter()
                .map(|n| named(n).fingerprint())
                .collect();
            let candidates: Vec<Item> = candidate_names.iter().map(|n| named(n)).collect();
            let total = candidates.len();
            let (fresh, duplicates) = partition_candidates(&existing, candidates);
            prop_assert_eq!(fresh.len() + duplicates, total);
            for item in &fresh {
                prop_assert!(!existing.contains(&item.fingerprint()));
                prop_assert_eq!(item.category, ItemCategory::Flap);
            }
        }
    }
}
