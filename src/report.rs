use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::reconcile::ReconcileOutcome;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportReportFile {
    generated_at: String,
    source: String,
    new_count: usize,
    duplicate_count: usize,
    total_items: usize,
}

/// Persist a small JSON record of an import/migration run so the user can
/// check later what a given merge actually did.
pub fn write_import_report(
    reports_dir: &Path,
    source: &str,
    outcome: &ReconcileOutcome,
) -> Result<PathBuf> {
    fs::create_dir_all(reports_dir)
        .with_context(|| format!("create reports directory {}", reports_dir.display()))?;

    let timestamp = Utc::now().format("import-%Y%m%d-%H%M%S.json");
    let path = reports_dir.join(timestamp.to_string());
    let payload = ImportReportFile {
        generated_at: Utc::now().to_rfc3339(),
        source: source.to_string(),
        new_count: outcome.new_count,
        duplicate_count: outcome.duplicate_count,
        total_items: outcome.items.len(),
    };
    let json = serde_json::to_string_pretty(&payload).context("serialize import report")?;
    fs::write(&path, json).with_context(|| format!("write import report {}", path.display()))?;
    Ok(path)
}
