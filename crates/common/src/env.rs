//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{info, warn};

/// File path behind a `sqlite:` URL, if it names a file on disk.
pub fn sqlite_file_path(database_url: &str) -> Option<&str> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.contains(":memory:") {
        return None;
    }
    Some(path)
}

/// Ensure the parent directory of a file-backed SQLite database exists.
/// Other backends need nothing on disk and are left alone.
pub async fn ensure_env(database_url: &str) -> anyhow::Result<()> {
    let Some(file) = sqlite_file_path(database_url) else { return Ok(()); };
    let Some(dir) = Path::new(file).parent().filter(|d| !d.as_os_str().is_empty()) else {
        return Ok(());
    };
    if tokio::fs::metadata(dir).await.is_err() {
        warn!(dir = %dir.display(), "sqlite data directory not found; creating it");
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;
    info!(file, "using sqlite database file");
    Ok(())
}
