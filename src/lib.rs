pub mod auth;
pub mod blob;
pub mod combine;
pub mod db;
pub mod error;
pub mod export;
pub mod fingerprint;
mod id;
pub mod import;
pub mod logging;
pub mod migrate;
pub mod model;
pub mod notices;
pub mod paths;
pub mod reconcile;
pub mod report;
pub mod service;
pub mod stats;
pub mod store;
mod time;

pub use error::{AppError, AppResult};
pub use fingerprint::fingerprint;
pub use logging::init_logging;
pub use model::{Item, ItemCategory, ItemDraft, ItemShape};
pub use paths::Paths;
pub use reconcile::{reconcile, summary_message, ReconcileOutcome, SnapshotCleanup};
pub use service::{CollectionService, ImportSummary, SortKey};
pub use store::{
    CollectionBackend, ItemStore, SnapshotStore, SqliteItemStore, StoreError, StoreHandle,
};
