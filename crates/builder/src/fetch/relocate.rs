//! Moving an extracted component into its place in the source tree

use crate::utils::fileops::{copy_directory_recursive, ensure_dir};
use llvmpkg_errors::{BuildError, Error};
use std::path::Path;
use tokio::fs;

/// Move `extracted` to `destination`
///
/// The destination must not exist; its parent is created. A rename is tried
/// first, and a rename across file systems falls back to copy then remove.
///
/// # Errors
///
/// Returns `BuildError::RelocationFailed` if `extracted` is not a directory,
/// `destination` already exists, or the move fails.
pub async fn relocate(component: &str, extracted: &Path, destination: &Path) -> Result<(), Error> {
    let failed = |message: String| -> Error {
        BuildError::RelocationFailed {
            component: component.to_string(),
            message,
        }
        .into()
    };

    if !extracted.is_dir() {
        return Err(failed(format!(
            "expected extracted directory {} is missing",
            extracted.display()
        )));
    }
    if fs::symlink_metadata(destination).await.is_ok() {
        return Err(failed(format!(
            "destination {} already exists",
            destination.display()
        )));
    }
    if let Some(parent) = destination.parent() {
        ensure_dir(parent).await?;
    }

    match fs::rename(extracted, destination).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => {
            tracing::debug!(
                from = %extracted.display(),
                to = %destination.display(),
                "rename crosses devices, copying"
            );
            copy_directory_recursive(extracted, destination)
                .await
                .map_err(|e| failed(e.to_string()))?;
            fs::remove_dir_all(extracted)
                .await
                .map_err(|e| failed(format!("failed to remove {}: {e}", extracted.display())))
        }
        Err(e) => Err(failed(format!(
            "failed to move {} to {}: {e}",
            extracted.display(),
            destination.display()
        ))),
    }
}
