//! Streaming download of a single archive

use crate::client::{classify, NetClient};
use futures::StreamExt;
use llvmpkg_errors::{Error, NetworkError};
use llvmpkg_events::{DownloadEvent, EventEmitter, EventSender, FailureContext};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Result of a completed download
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub path: PathBuf,
    pub size: u64,
    pub duration: Duration,
}

/// One download request
#[derive(Debug, Clone)]
pub struct Download {
    url: url::Url,
    component: Option<String>,
}

impl Download {
    /// Create a download for `url`
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::InvalidUrl` if the URL cannot be parsed.
    pub fn new(url: &str) -> Result<Self, Error> {
        Ok(Self {
            url: crate::parse_url(url)?,
            component: None,
        })
    }

    /// Tag emitted events with the component being fetched
    #[must_use]
    pub fn for_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Stream the body to `dest`, creating or truncating it
    ///
    /// A non-success status is an error and leaves no file behind. A body
    /// that fails mid-transfer leaves the partial file in place.
    ///
    /// # Errors
    ///
    /// Returns a `NetworkError` for transport failures or non-success statuses
    /// and an I/O error if the destination cannot be written.
    pub async fn execute(
        &self,
        client: &NetClient,
        dest: &Path,
        tx: &EventSender,
    ) -> Result<DownloadResult, Error> {
        let result = self.stream_to(client, dest, tx).await;
        if let Err(err) = &result {
            tx.emit(llvmpkg_events::AppEvent::Download(DownloadEvent::Failed {
                url: self.url.to_string(),
                component: self.component.clone(),
                failure: FailureContext::from_error(err),
            }));
        }
        result
    }

    async fn stream_to(
        &self,
        client: &NetClient,
        dest: &Path,
        tx: &EventSender,
    ) -> Result<DownloadResult, Error> {
        let url = self.url.as_str();
        let start = Instant::now();

        let response = client.get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::HttpError {
                url: url.to_string(),
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            }
            .into());
        }

        tx.emit_download_started(url, self.component.clone(), response.content_length());

        let mut file = File::create(dest)
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;
        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| classify(url, &e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::io_with_path(&e, dest))?;
            downloaded += chunk.len() as u64;
        }
        file.flush().await?;

        let duration = start.elapsed();
        tracing::debug!(url, bytes = downloaded, ?duration, "download finished");
        tx.emit_download_completed(url, self.component.clone(), downloaded, duration);

        Ok(DownloadResult {
            path: dest.to_path_buf(),
            size: downloaded,
            duration,
        })
    }
}
