use serde::Serialize;
use serde_json::Value;
use ts_rs::TS;

use crate::store::StoreHandle;

pub const LAST_DISMISSED_KEY: &str = "lastDismissedNoticeId";

/// An in-app update notice shown once after release.
#[derive(Debug, Clone, Copy, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../ui/bindings/")]
pub struct UpdateNotice {
    pub id: &'static str,
    pub title: &'static str,
    pub message: &'static str,
    pub date: &'static str,
}

/// Newest last; `latest_unseen` relies on that.
pub static NOTICES: &[UpdateNotice] = &[
    UpdateNotice {
        id: "2026-05-12-combination-builder",
        title: "Combinations are here",
        message: "Compose virtual bundles from the pieces you already own.",
        date: "2026-05-12",
    },
    UpdateNotice {
        id: "2026-06-20-import-merge",
        title: "Smarter imports",
        message: "Importing a file now merges with your collection and skips duplicates.",
        date: "2026-06-20",
    },
];

/// The newest notice the user has not dismissed yet.
pub fn latest_unseen(store: &StoreHandle) -> Option<&'static UpdateNotice> {
    let latest = NOTICES.last()?;
    let dismissed = store
        .get(LAST_DISMISSED_KEY)
        .and_then(|v| v.as_str().map(str::to_owned));
    if dismissed.as_deref() == Some(latest.id) {
        None
    } else {
        Some(latest)
    }
}

pub fn dismiss(store: &StoreHandle, notice_id: &str) -> anyhow::Result<()> {
    store.set(LAST_DISMISSED_KEY, Value::String(notice_id.to_string()));
    store.persist()
}
