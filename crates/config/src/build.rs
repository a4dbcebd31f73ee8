//! `[build]` section: how the external build tool is driven

use crate::constants::{DEFAULT_BUILD_JOBS, DEFAULT_BUILD_PROGRAM, DEFAULT_TARGETS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Build tool executable
    #[serde(default = "default_program")]
    pub program: String,
    /// CMake generator; platform default when unset
    #[serde(default)]
    pub generator: Option<String>,
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    #[serde(default = "default_shared")]
    pub shared: bool,
    /// Value of `LLVM_TARGETS_TO_BUILD`
    #[serde(default = "default_targets")]
    pub targets: String,
    /// Per-toggle overrides applied on top of the recipe's table
    #[serde(default)]
    pub toggles: BTreeMap<String, bool>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            generator: None,
            jobs: default_jobs(),
            shared: default_shared(),
            targets: default_targets(),
            toggles: BTreeMap::new(),
        }
    }
}

fn default_program() -> String {
    DEFAULT_BUILD_PROGRAM.to_string()
}

fn default_jobs() -> usize {
    DEFAULT_BUILD_JOBS
}

fn default_shared() -> bool {
    true
}

fn default_targets() -> String {
    DEFAULT_TARGETS.to_string()
}
