//! Client-side export surface: printable HTML reports and the multi-up
//! PDF invoice generator. Everything here renders data the screens already
//! hold; nothing talks to the backend.

pub mod invoices;
pub mod reports;

use std::path::{Path, PathBuf};

use crate::error::{AdminError, Result};

/// Write an export artifact into the export directory, creating it on first
/// use. Returns the full path for the operator.
pub async fn write_artifact(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AdminError::Export(format!("failed to create {}: {}", dir.display(), e)))?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| AdminError::Export(format!("failed to write {}: {}", path.display(), e)))?;
    Ok(path)
}
