//! Fetcher: download, extract and relocate component sources
//!
//! Each component is downloaded into the work directory, unpacked there to
//! `<name>-<version>.src`, and moved into the source tree at its destination.

mod archive;
mod component;
mod relocate;
mod template;

pub use archive::{extract_archive, ArchiveFormat};
pub use component::{ComponentSpec, SourceManifest, SOURCE_MANIFEST_FILE};
pub use relocate::relocate;
pub use template::UrlTemplate;

use crate::utils::fileops::{ensure_dir, remove_dir_if_exists};
use llvmpkg_errors::{BuildError, Error};
use llvmpkg_events::{AppEvent, BuildEvent, EventEmitter, EventSender};
use llvmpkg_net::{Download, NetClient};
use llvmpkg_types::FetchReport;
use std::path::{Path, PathBuf};

/// Populates a source tree from archives on an HTTP host
pub struct Fetcher {
    client: NetClient,
    template: UrlTemplate,
    work_dir: PathBuf,
    source_dir: PathBuf,
    tx: EventSender,
}

impl EventEmitter for Fetcher {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

impl Fetcher {
    #[must_use]
    pub fn new(
        client: NetClient,
        template: UrlTemplate,
        work_dir: PathBuf,
        source_dir: PathBuf,
        tx: EventSender,
    ) -> Self {
        Self {
            client,
            template,
            work_dir,
            source_dir,
            tx,
        }
    }

    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Fetch one component into its destination, returning the archive size
    ///
    /// The archive is removed only after a successful extraction.
    ///
    /// # Errors
    ///
    /// Returns a network error if the download fails, `BuildError` variants
    /// for unsupported or malformed archives and relocation failures.
    pub async fn fetch_component(&self, spec: &ComponentSpec) -> Result<u64, Error> {
        let url = self.template.render(&spec.name, &spec.version);
        let parsed = llvmpkg_net::parse_url(&url)?;
        let file_name = llvmpkg_net::file_name(&parsed)?;
        if ArchiveFormat::from_name(&file_name).is_none() {
            return Err(BuildError::UnsupportedArchiveFormat { path: url }.into());
        }

        ensure_dir(&self.work_dir).await?;
        let archive_path = self.work_dir.join(&file_name);
        self.emit_debug(format!("download {url}"));
        let download = Download::new(&url)?
            .for_component(&spec.name)
            .execute(&self.client, &archive_path, &self.tx)
            .await?;

        let extracted = self.work_dir.join(spec.extracted_dir_name());
        if remove_dir_if_exists(&extracted).await? {
            self.emit_warning(format!(
                "removed leftover {} from an earlier run",
                extracted.display()
            ));
        }

        extract_archive(&archive_path, &self.work_dir).await?;
        tokio::fs::remove_file(&archive_path)
            .await
            .map_err(|e| Error::io_with_path(&e, &archive_path))?;

        let destination = spec.destination_in(&self.source_dir);
        relocate(&spec.name, &extracted, &destination).await?;

        self.emit(AppEvent::Build(BuildEvent::ComponentStaged {
            component: spec.name.clone(),
            version: spec.version.clone(),
            destination,
        }));
        Ok(download.size)
    }

    /// Replace the source tree with the given components, in order
    ///
    /// Any previous source tree is discarded first. On success a
    /// [`SourceManifest`] listing the components is written at its root.
    ///
    /// # Errors
    ///
    /// Returns the first component failure; later components are not fetched.
    pub async fn fetch_all(&self, specs: &[ComponentSpec]) -> Result<FetchReport, Error> {
        if remove_dir_if_exists(&self.source_dir).await? {
            self.emit_debug(format!(
                "discarded previous source tree {}",
                self.source_dir.display()
            ));
        }

        let mut bytes_downloaded = 0;
        for spec in specs {
            bytes_downloaded += self.fetch_component(spec).await?;
        }

        ensure_dir(&self.source_dir).await?;
        let manifest = SourceManifest {
            components: specs.to_vec(),
        };
        manifest.write(&self.source_dir).await?;

        Ok(FetchReport {
            source_dir: self.source_dir.clone(),
            components: specs.iter().map(ComponentSpec::label).collect(),
            bytes_downloaded,
        })
    }
}
