//! Component descriptors and the manifest of a fetched source tree

use llvmpkg_errors::{BuildError, Error};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// File written at the root of a populated source tree
pub const SOURCE_MANIFEST_FILE: &str = ".llvmpkg-sources.json";

/// One source archive to fetch and where it lands in the source tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub name: String,
    pub version: String,
    /// Relative to the source root; `.` is the root itself
    pub destination: PathBuf,
}

impl ComponentSpec {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            destination: destination.into(),
        }
    }

    /// Directory name the archive unpacks to
    #[must_use]
    pub fn extracted_dir_name(&self) -> String {
        format!("{}-{}.src", self.name, self.version)
    }

    /// Absolute destination below `source_root`
    #[must_use]
    pub fn destination_in(&self, source_root: &Path) -> PathBuf {
        self.destination
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .fold(source_root.to_path_buf(), |acc, c| acc.join(c))
    }

    #[must_use]
    pub fn label(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

/// Record of the components present in a source tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceManifest {
    pub components: Vec<ComponentSpec>,
}

impl SourceManifest {
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.components.iter().any(|c| c.name == name)
    }

    #[must_use]
    pub fn path_in(source_root: &Path) -> PathBuf {
        source_root.join(SOURCE_MANIFEST_FILE)
    }

    /// Write the manifest into `source_root`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn write(&self, source_root: &Path) -> Result<(), Error> {
        let path = Self::path_in(source_root);
        let json = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| Error::io_with_path(&e, &path))
    }

    /// Read the manifest of a previously fetched source tree
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidSourceManifest` if the file is missing or
    /// malformed.
    pub async fn load(source_root: &Path) -> Result<Self, Error> {
        let path = Self::path_in(source_root);
        let invalid = |message: String| BuildError::InvalidSourceManifest {
            path: path.display().to_string(),
            message,
        };
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            invalid(if e.kind() == std::io::ErrorKind::NotFound {
                "not found; run the fetch stage first".to_string()
            } else {
                e.to_string()
            })
        })?;
        serde_json::from_slice(&bytes).map_err(|e| invalid(e.to_string()).into())
    }
}
