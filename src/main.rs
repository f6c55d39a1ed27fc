use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use piecekeeper_lib::auth::active_owner_id;
use piecekeeper_lib::db::open_sqlite_pool;
use piecekeeper_lib::migrate::apply_migrations;
use piecekeeper_lib::report::write_import_report;
use piecekeeper_lib::{
    CollectionBackend, CollectionService, Paths, SnapshotCleanup, SnapshotStore, SortKey,
    SqliteItemStore, StoreHandle,
};

#[derive(Debug, Parser)]
#[command(name = "piecekeeper", about = "Personal accessory-collection manager", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show where data lives and how much of it there is.
    Status {
        /// Emit a machine-readable JSON object instead of the table view.
        #[arg(long)]
        json: bool,
    },
    /// Merge a JSON item file into the collection.
    Import {
        file: PathBuf,
        /// Replace the signed-out local snapshot instead of merging into
        /// the owner's collection.
        #[arg(long)]
        local: bool,
    },
    /// Write the collection to a date-named JSON file.
    Export {
        /// Target directory; defaults to the app's exports directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Migrate the signed-out local snapshot into the owner's collection.
    Sync {
        /// Leave the local snapshot in place for a later explicit cleanup.
        #[arg(long)]
        keep_local: bool,
    },
}

struct Runtime {
    paths: Paths,
    store: StoreHandle,
    snapshot: SnapshotStore,
    owner_id: String,
    items: SqliteItemStore,
}

impl Runtime {
    async fn open() -> Result<Self> {
        let paths = Paths::resolve()?;
        paths.ensure_dirs()?;

        let store = StoreHandle::open_file(paths.store_path.clone());
        let snapshot = SnapshotStore::new(store.clone());
        let owner_id = active_owner_id(&store)?;

        let pool = open_sqlite_pool(&paths.db_path).await?;
        apply_migrations(&pool).await.context("apply migrations")?;
        let items = SqliteItemStore::new(pool);

        Ok(Runtime {
            paths,
            store,
            snapshot,
            owner_id,
            items,
        })
    }

    fn remote_service(&self) -> CollectionService {
        CollectionService::new(
            CollectionBackend::remote(Arc::new(self.items.clone()), self.owner_id.clone()),
            self.snapshot.clone(),
        )
    }
}

#[tokio::main]
async fn main() {
    let paths_for_logs = Paths::resolve().ok();
    let _log_guard = paths_for_logs
        .as_ref()
        .and_then(|p| piecekeeper_lib::logging::init_logging_with_file(&p.logs_dir).ok())
        .flatten();

    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(1);
        }
    }
}

async fn run(command: Commands) -> Result<i32> {
    match command {
        Commands::Status { json } => {
            let rt = Runtime::open().await?;
            let service = rt.remote_service();
            let items = service.list_items(SortKey::Name).await?;
            let snapshot_count = rt.snapshot.load().len();
            let notice = piecekeeper_lib::notices::latest_unseen(&rt.store);

            if json {
                let payload = serde_json::json!({
                    "dbPath": rt.paths.db_path.display().to_string(),
                    "ownerId": rt.owner_id,
                    "itemCount": items.len(),
                    "snapshotCount": snapshot_count,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Database     : {}", rt.paths.db_path.display());
                println!("Owner        : {}", rt.owner_id);
                println!("Items        : {}", items.len());
                println!("Local items  : {snapshot_count}");
                if let Some(notice) = notice {
                    println!("\n{}: {}", notice.title, notice.message);
                }
            }
            Ok(0)
        }
        Commands::Import { file, local } => {
            let rt = Runtime::open().await?;
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("read import file {}", file.display()))?;

            let service = if local {
                CollectionService::local(rt.snapshot.clone())
            } else {
                rt.remote_service()
            };
            let summary = service.import_text(&text).await?;
            if !local {
                let report = write_import_report(
                    &rt.paths.reports_dir,
                    &file.display().to_string(),
                    &summary.outcome,
                )?;
                println!("Report: {}", report.display());
            }
            println!("{}", summary.message);
            Ok(0)
        }
        Commands::Export { out } => {
            let rt = Runtime::open().await?;
            let service = rt.remote_service();
            let out_parent = out.unwrap_or_else(|| rt.paths.exports_dir.clone());
            let entry = service.export_to(out_parent).await?;
            println!(
                "Exported {} items to {}",
                entry.count,
                entry.file_path.display()
            );
            Ok(0)
        }
        Commands::Sync { keep_local } => {
            let rt = Runtime::open().await?;
            if rt.snapshot.is_empty() {
                println!("No local data to migrate.");
                return Ok(0);
            }
            let service = rt.remote_service();
            let cleanup = if keep_local {
                SnapshotCleanup::Manual
            } else {
                SnapshotCleanup::Automatic
            };
            let summary = service.migrate_snapshot(cleanup).await?;
            write_import_report(&rt.paths.reports_dir, "local-snapshot", &summary.outcome)?;
            println!("{}", summary.message);
            Ok(0)
        }
    }
}
