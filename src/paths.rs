use std::path::PathBuf;

use anyhow::Context;

const APP_DIR_NAME: &str = "piecekeeper";

/// Filesystem locations the app reads and writes, resolved once at startup
/// and threaded into constructors. Nothing below this layer consults the
/// environment.
#[derive(Debug, Clone)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub store_path: PathBuf,
    pub reports_dir: PathBuf,
    pub exports_dir: PathBuf,
    pub blobs_dir: PathBuf,
    pub logs_dir: PathBuf,
}

impl Paths {
    /// Resolve under the platform data directory. `PIECEKEEPER_FAKE_APPDATA`
    /// overrides the base in tests and scripts.
    pub fn resolve() -> anyhow::Result<Self> {
        let data_dir = if let Ok(fake) = std::env::var("PIECEKEEPER_FAKE_APPDATA") {
            PathBuf::from(fake)
        } else {
            dirs::data_dir()
                .or_else(|| std::env::current_dir().ok())
                .context("failed to resolve application data directory")?
                .join(APP_DIR_NAME)
        };
        Ok(Self::under(data_dir))
    }

    /// Lay out the standard structure under an explicit base directory.
    pub fn under(data_dir: PathBuf) -> Self {
        Paths {
            db_path: data_dir.join("piecekeeper.sqlite3"),
            store_path: data_dir.join("store.json"),
            reports_dir: data_dir.join("reports"),
            exports_dir: data_dir.join("exports"),
            blobs_dir: data_dir.join("blobs"),
            logs_dir: data_dir.join("logs"),
            data_dir,
        }
    }

    pub fn ensure_dirs(&self) -> anyhow::Result<()> {
        for dir in [&self.data_dir, &self.reports_dir, &self.exports_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create directory {}", dir.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_rooted_under_base() {
        let paths = Paths::under(PathBuf::from("/tmp/pk-test"));
        assert_eq!(paths.db_path, PathBuf::from("/tmp/pk-test/piecekeeper.sqlite3"));
        assert_eq!(paths.store_path, PathBuf::from("/tmp/pk-test/store.json"));
        assert!(paths.reports_dir.starts_with(&paths.data_dir));
    }
}
