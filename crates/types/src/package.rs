//! Package metadata surfaced to the dependency manager

use serde::{Deserialize, Serialize};

/// Release packaged when no override is given
pub const DEFAULT_VERSION: &str = "3.8.0";

/// Environment variable that replaces [`DEFAULT_VERSION`]
pub const VERSION_OVERRIDE_ENV: &str = "LLVMPKG_VERSION_OVERRIDE";

/// Binary options of the package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageOptions {
    #[serde(default = "default_shared")]
    pub shared: bool,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self {
            shared: default_shared(),
        }
    }
}

fn default_shared() -> bool {
    true
}

/// Descriptive metadata for the produced package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    pub license: String,
    pub url: String,
    /// Settings axes the package binary varies over
    pub settings: Vec<String>,
    /// Declared defaults of the binary options
    pub default_options: PackageOptions,
}

impl PackageMetadata {
    /// Metadata for the LLVM package at the given release
    #[must_use]
    pub fn llvm(version: impl Into<String>) -> Self {
        Self {
            name: "llvm".to_string(),
            version: version.into(),
            license: "BSD".to_string(),
            url: "http://github.com/smspillaz/llvm-conan".to_string(),
            settings: ["os", "compiler", "compiler.version", "build_type", "arch"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            default_options: PackageOptions::default(),
        }
    }

    /// Package reference in `name/version` form
    #[must_use]
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

impl Default for PackageMetadata {
    fn default() -> Self {
        Self::llvm(DEFAULT_VERSION)
    }
}
