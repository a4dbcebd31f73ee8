//! Where component archives come from and which ones are fetched

use crate::constants::{MIRROR_BASE_URL, UPSTREAM_BASE_URL};
use llvmpkg_errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// URL template family for component archives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// `{base}/{component}-{version}.src.zip`
    #[default]
    Mirror,
    /// `{base}/{version}/{component}-{version}.src.tar.xz`
    Upstream,
    /// `custom_template` with `{component}` and `{version}` placeholders
    Custom,
}

impl TemplateKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mirror => "mirror",
            Self::Upstream => "upstream",
            Self::Custom => "custom",
        }
    }

    /// Base URL used when none is configured
    #[must_use]
    pub fn default_base(self) -> Option<&'static str> {
        match self {
            Self::Mirror => Some(MIRROR_BASE_URL),
            Self::Upstream => Some(UPSTREAM_BASE_URL),
            Self::Custom => None,
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mirror" => Ok(Self::Mirror),
            "upstream" => Ok(Self::Upstream),
            "custom" => Ok(Self::Custom),
            _ => Err(ConfigError::InvalidValue {
                field: "source.template".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Which set of LLVM components is fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceVariant {
    /// LLVM plus clang, runtimes and extra tools
    #[default]
    Full,
    /// LLVM core only
    Minimal,
}

impl SourceVariant {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Minimal => "minimal",
        }
    }
}

impl fmt::Display for SourceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `[source]` section
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceConfig {
    #[serde(default)]
    pub template: TemplateKind,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub custom_template: Option<String>,
    #[serde(default)]
    pub variant: SourceVariant,
    /// Release to package; falls back to the built-in default
    #[serde(default)]
    pub version: Option<String>,
}

impl SourceConfig {
    /// Base URL for the configured template family
    #[must_use]
    pub fn effective_base_url(&self) -> Option<String> {
        self.base_url
            .clone()
            .or_else(|| self.template.default_base().map(str::to_string))
    }
}
