//! Reports returned by the pipeline stages

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Result of fetching a source set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchReport {
    pub source_dir: PathBuf,
    /// Fetched components as `name-version`
    pub components: Vec<String>,
    pub bytes_downloaded: u64,
}

/// Result of a configure/compile/install run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub build_dir: PathBuf,
    pub install_dir: PathBuf,
    pub duration_ms: u64,
}

/// Result of copying the install tree into the package layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageReport {
    pub package_dir: PathBuf,
    /// Number of files copied per destination category
    pub files: BTreeMap<String, usize>,
}

impl PackageReport {
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.files.values().sum()
    }
}

/// Combined result of a full fetch, build and package run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub package: String,
    pub fetch: FetchReport,
    pub build: BuildReport,
    pub packaging: PackageReport,
}
