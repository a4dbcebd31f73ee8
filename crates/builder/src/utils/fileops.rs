//! File system operations shared by the pipeline stages

use llvmpkg_errors::Error;
use std::path::Path;
use tokio::fs;

/// Create `path` and its parents; an existing directory is not an error
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub async fn ensure_dir(path: &Path) -> Result<(), Error> {
    match fs::create_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(Error::io_with_path(&e, path)),
    }
}

/// Remove a directory tree if present; returns whether anything was removed
///
/// # Errors
///
/// Returns an I/O error if the tree exists but cannot be removed.
pub async fn remove_dir_if_exists(path: &Path) -> Result<bool, Error> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io_with_path(&e, path)),
    }
}

/// Recursively copy directory contents
///
/// Symlinks are recreated on Unix and followed elsewhere.
pub fn copy_directory_recursive<'a>(
    src: &'a Path,
    dst: &'a Path,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), Error>> + Send + 'a>> {
    Box::pin(async move {
        fs::create_dir_all(dst).await?;

        let mut entries = fs::read_dir(src).await?;
        while let Some(entry) = entries.next_entry().await? {
            let entry_path = entry.path();
            let dst_path = dst.join(entry.file_name());
            let file_type = entry.file_type().await?;

            if file_type.is_dir() {
                copy_directory_recursive(&entry_path, &dst_path).await?;
            } else if file_type.is_symlink() {
                copy_symlink(&entry_path, &dst_path).await?;
            } else {
                fs::copy(&entry_path, &dst_path).await?;
            }
        }

        Ok(())
    })
}

#[cfg(unix)]
async fn copy_symlink(src: &Path, dst: &Path) -> Result<(), Error> {
    let target = fs::read_link(src).await?;
    fs::symlink(target, dst).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn copy_symlink(src: &Path, dst: &Path) -> Result<(), Error> {
    fs::copy(src, dst).await?;
    Ok(())
}
