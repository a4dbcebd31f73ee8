use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Packaging events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PackageEvent {
    /// One copy rule finished
    RuleApplied {
        pattern: String,
        source: String,
        destination: String,
        files_copied: usize,
    },

    Completed {
        package_dir: PathBuf,
        files_copied: usize,
    },
}
