//! Archive extraction
//!
//! Compressed tarballs are first decompressed with `async-compression` into
//! a temporary plain tar, which is then unpacked on the blocking pool.

use llvmpkg_errors::{BuildError, Error};
use std::path::{Path, PathBuf};

/// Archive formats accepted for component sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
    TarBz2,
    TarXz,
}

impl ArchiveFormat {
    /// Detect the format from a file name or URL
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
            Some(Self::TarBz2)
        } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
            Some(Self::TarXz)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }

    /// Detect the format of an archive on disk
    ///
    /// # Errors
    ///
    /// Returns `BuildError::UnsupportedArchiveFormat` for unknown extensions.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(Self::from_name)
            .ok_or_else(|| {
                BuildError::UnsupportedArchiveFormat {
                    path: path.display().to_string(),
                }
                .into()
            })
    }
}

/// Extract `archive` into `dest_dir`, keeping the archive's own top-level layout
///
/// # Errors
///
/// Returns `BuildError::UnsupportedArchiveFormat` for unknown formats and
/// `BuildError::ExtractionFailed` for malformed archives or entries that
/// would land outside `dest_dir`.
pub async fn extract_archive(archive: &Path, dest_dir: &Path) -> Result<(), Error> {
    let format = ArchiveFormat::from_path(archive)?;
    tracing::debug!(archive = %archive.display(), ?format, "extracting");
    match format {
        ArchiveFormat::Zip => extract_zip(archive, dest_dir).await,
        ArchiveFormat::Tar => extract_tar(archive.to_path_buf(), dest_dir.to_path_buf()).await,
        ArchiveFormat::TarGz | ArchiveFormat::TarBz2 | ArchiveFormat::TarXz => {
            extract_compressed_tar(archive, format, dest_dir).await
        }
    }
}

fn extraction_failed(message: String) -> Error {
    BuildError::ExtractionFailed { message }.into()
}

async fn extract_zip(archive: &Path, dest_dir: &Path) -> Result<(), Error> {
    let archive = archive.to_path_buf();
    let base_dir = dest_dir.to_path_buf();
    tokio::task::spawn_blocking(move || {
        use std::fs::File;
        use zip::ZipArchive;

        let file = File::open(&archive)
            .map_err(|e| extraction_failed(format!("failed to open zip archive: {e}")))?;
        let mut zip = ZipArchive::new(file)
            .map_err(|e| extraction_failed(format!("failed to read zip archive: {e}")))?;

        for i in 0..zip.len() {
            let mut entry = zip
                .by_index(i)
                .map_err(|e| extraction_failed(format!("failed to read zip entry: {e}")))?;

            let Some(relative) = entry.enclosed_name() else {
                return Err(extraction_failed(format!(
                    "zip entry `{}` escapes the extraction directory",
                    entry.name()
                )));
            };
            let outpath = base_dir.join(relative);

            if entry.is_dir() {
                std::fs::create_dir_all(&outpath)
                    .map_err(|e| extraction_failed(format!("failed to create directory: {e}")))?;
                continue;
            }

            if let Some(parent) = outpath.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    extraction_failed(format!("failed to create parent directory: {e}"))
                })?;
            }
            let mut outfile = File::create(&outpath)
                .map_err(|e| extraction_failed(format!("failed to create file: {e}")))?;
            std::io::copy(&mut entry, &mut outfile)
                .map_err(|e| extraction_failed(format!("failed to extract file: {e}")))?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))
                        .ok();
                }
            }
        }

        Ok::<(), Error>(())
    })
    .await
    .map_err(|e| extraction_failed(format!("task join error: {e}")))?
}

async fn extract_compressed_tar(
    archive: &Path,
    format: ArchiveFormat,
    dest_dir: &Path,
) -> Result<(), Error> {
    use async_compression::tokio::bufread::{BzDecoder, GzipDecoder, XzDecoder};
    use tokio::fs::File;
    use tokio::io::{AsyncWriteExt, BufReader};

    let temp_dir = tempfile::tempdir()
        .map_err(|e| extraction_failed(format!("failed to create temp directory: {e}")))?;
    let temp_path = temp_dir.path().join("archive.tar");

    {
        let input = File::open(archive)
            .await
            .map_err(|e| extraction_failed(format!("failed to open archive: {e}")))?;
        let mut output = File::create(&temp_path)
            .await
            .map_err(|e| extraction_failed(format!("failed to create temp file: {e}")))?;
        let reader = BufReader::new(input);

        let copied = match format {
            ArchiveFormat::TarGz => {
                tokio::io::copy(&mut GzipDecoder::new(reader), &mut output).await
            }
            ArchiveFormat::TarBz2 => tokio::io::copy(&mut BzDecoder::new(reader), &mut output).await,
            ArchiveFormat::TarXz => tokio::io::copy(&mut XzDecoder::new(reader), &mut output).await,
            ArchiveFormat::Zip | ArchiveFormat::Tar => {
                return Err(extraction_failed(format!(
                    "{format:?} is not a compressed tarball"
                )))
            }
        };
        copied.map_err(|e| extraction_failed(format!("failed to decompress archive: {e}")))?;

        output
            .flush()
            .await
            .map_err(|e| extraction_failed(format!("failed to flush temp file: {e}")))?;
    }

    // temp_dir must outlive the unpack
    let result = extract_tar(temp_path, dest_dir.to_path_buf()).await;
    drop(temp_dir);
    result
}

async fn extract_tar(tar_path: PathBuf, dest_dir: PathBuf) -> Result<(), Error> {
    tokio::task::spawn_blocking(move || {
        use std::fs::File;
        use tar::Archive;

        let file = File::open(&tar_path)
            .map_err(|e| extraction_failed(format!("failed to open tar archive: {e}")))?;
        std::fs::create_dir_all(&dest_dir)
            .map_err(|e| extraction_failed(format!("failed to create directory: {e}")))?;
        let mut archive = Archive::new(file);

        let entries = archive
            .entries()
            .map_err(|e| extraction_failed(format!("failed to read tar archive: {e}")))?;
        for entry in entries {
            let mut entry =
                entry.map_err(|e| extraction_failed(format!("failed to read tar entry: {e}")))?;
            let unpacked = entry
                .unpack_in(&dest_dir)
                .map_err(|e| extraction_failed(format!("failed to extract entry: {e}")))?;
            if !unpacked {
                let name = entry
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                return Err(extraction_failed(format!(
                    "tar entry `{name}` escapes the extraction directory"
                )));
            }
        }

        Ok::<(), Error>(())
    })
    .await
    .map_err(|e| extraction_failed(format!("task join error: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_by_suffix() {
        assert_eq!(ArchiveFormat::from_name("llvm-3.8.0.src.zip"), Some(ArchiveFormat::Zip));
        assert_eq!(
            ArchiveFormat::from_name("llvm-3.8.0.src.tar.xz"),
            Some(ArchiveFormat::TarXz)
        );
        assert_eq!(ArchiveFormat::from_name("w.TGZ"), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::from_name("w.tar.bz2"), Some(ArchiveFormat::TarBz2));
        assert_eq!(ArchiveFormat::from_name("w.tar"), Some(ArchiveFormat::Tar));
        assert_eq!(ArchiveFormat::from_name("w.7z"), None);
    }

    #[tokio::test]
    async fn unknown_format_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("w.rar");
        std::fs::write(&archive, b"junk").unwrap();
        let err = extract_archive(&archive, temp.path()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Build(BuildError::UnsupportedArchiveFormat { .. })
        ));
    }

    #[tokio::test]
    async fn malformed_zip_fails() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("w.zip");
        std::fs::write(&archive, b"definitely not a zip").unwrap();
        let err = extract_archive(&archive, temp.path()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Build(BuildError::ExtractionFailed { .. })
        ));
    }
}
