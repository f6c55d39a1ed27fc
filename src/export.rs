use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::available_space;
use serde::Serialize;
use sha2::{Digest, Sha256};
use ts_rs::TS;

use crate::db::write_atomic;
use crate::error::{AppError, AppResult};
use crate::model::Item;

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub out_parent: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ExportEntry {
    pub file_path: PathBuf,
    pub manifest_path: PathBuf,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../ui/bindings/")]
pub struct ExportEntryDto {
    pub file_path: String,
    pub manifest_path: String,
    #[ts(type = "number")]
    pub count: u64,
}

impl From<ExportEntry> for ExportEntryDto {
    fn from(e: ExportEntry) -> Self {
        ExportEntryDto {
            file_path: e.file_path.to_string_lossy().into_owned(),
            manifest_path: e.manifest_path.to_string_lossy().into_owned(),
            count: e.count,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportManifest {
    app_version: String,
    generated_at: String,
    count: u64,
    sha256: String,
}

/// Write the full item sequence to `<out_parent>/collection-YYYYMMDD[-NN].json`
/// together with a manifest carrying the count and payload hash.
pub fn export_collection(items: &[Item], opts: &ExportOptions) -> AppResult<ExportEntry> {
    std::fs::create_dir_all(&opts.out_parent).map_err(|err| {
        AppError::from(err)
            .with_context("operation", "create_out_parent")
            .with_context("path", opts.out_parent.display().to_string())
    })?;

    let payload = serde_json::to_vec_pretty(items)
        .map_err(|err| AppError::from(err).with_context("operation", "serialize_collection"))?;

    let avail = free_disk_space(&opts.out_parent)
        .map_err(|err| AppError::from(err).with_context("operation", "available_space"))?;
    let required = payload.len() as u64 + 16_384;
    if avail < required {
        return Err(AppError::new(
            "EXPORT/LOW_DISK",
            "Not enough disk space for the export.",
        )
        .with_context("available_bytes", avail.to_string())
        .with_context("required_bytes", required.to_string()));
    }

    let file_path = unique_export_file(&opts.out_parent, &Utc::now())
        .map_err(|err| err.with_context("operation", "alloc_export_file"))?;
    write_atomic(&file_path, &payload)
        .map_err(|err| AppError::from(err).with_context("operation", "write_export"))?;

    let manifest = ExportManifest {
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        generated_at: Utc::now().to_rfc3339(),
        count: items.len() as u64,
        sha256: format!("{:x}", Sha256::digest(&payload)),
    };
    let manifest_path = file_path.with_extension("manifest.json");
    let manifest_payload = serde_json::to_vec_pretty(&manifest)
        .map_err(|err| AppError::from(err).with_context("operation", "serialize_manifest"))?;
    write_atomic(&manifest_path, &manifest_payload)
        .map_err(|err| AppError::from(err).with_context("operation", "write_manifest"))?;

    Ok(ExportEntry {
        file_path,
        manifest_path,
        count: items.len() as u64,
    })
}

fn unique_export_file(root: &Path, timestamp: &DateTime<Utc>) -> AppResult<PathBuf> {
    let base = timestamp.format("collection-%Y%m%d").to_string();
    for suffix in 0..100 {
        let candidate = if suffix == 0 {
            root.join(format!("{base}.json"))
        } else {
            root.join(format!("{base}-{suffix:02}.json"))
        };
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(AppError::new(
        "EXPORT/NAME_COLLISION",
        "Unable to allocate an export file name",
    ))
}

fn free_disk_space(path: &Path) -> anyhow::Result<u64> {
    let target = if path.exists() {
        path.to_path_buf()
    } else if let Some(parent) = path.parent() {
        parent.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"))
    };
    available_space(&target).map_err(|e| anyhow::anyhow!(e))
}
