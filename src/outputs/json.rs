//! JSON snapshot writer.
//!
//! The snapshot is pretty-printed with two-space indentation and keeps
//! non-ASCII text as UTF-8. It is written to a sibling temp file and renamed
//! into place, so a reader polling the file never sees a partial document.

use crate::models::Snapshot;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `snapshot` to `path`, creating the parent directory if needed.
///
/// # Returns
///
/// `Ok(())` on success, or an error if directory creation, serialization or
/// file writing fails. On failure the previous file, if any, is untouched.
#[instrument(level = "info", skip_all, fields(path = %path.display(), items = snapshot.items.len()))]
pub async fn write_snapshot(snapshot: &Snapshot, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(snapshot)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }

    let tmp = temp_path(path);
    let written = match fs::write(&tmp, json).await {
        Ok(()) => fs::rename(&tmp, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp).await;
        error!(tmp = %tmp.display(), error = %e, "Failed to write snapshot file");
        return Err(e.into());
    }
    info!("Wrote JSON snapshot");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
