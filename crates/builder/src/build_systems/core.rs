//! Core types shared by build tool implementations

use crate::fetch::SourceManifest;
use llvmpkg_errors::{BuildError, Error};
use llvmpkg_events::EventSender;
use llvmpkg_types::Settings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Staging directories of one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLayout {
    pub source_dir: PathBuf,
    /// Ephemeral; recreated on every build
    pub build_dir: PathBuf,
    pub install_dir: PathBuf,
}

impl BuildLayout {
    #[must_use]
    pub fn new(source_dir: PathBuf, build_dir: PathBuf, install_dir: PathBuf) -> Self {
        Self {
            source_dir,
            build_dir,
            install_dir,
        }
    }

    /// Same layout with every path made absolute against the working directory
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the working directory cannot be determined.
    pub fn absolute(&self) -> Result<Self, Error> {
        Ok(Self {
            source_dir: std::path::absolute(&self.source_dir)?,
            build_dir: std::path::absolute(&self.build_dir)?,
            install_dir: std::path::absolute(&self.install_dir)?,
        })
    }
}

/// A named ON/OFF cache variable passed at configure time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureToggle {
    pub name: String,
    pub enabled: bool,
    /// Component that must be in the source tree when enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<String>,
}

impl FeatureToggle {
    pub fn on(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            requires: None,
        }
    }

    pub fn off(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: false,
            requires: None,
        }
    }

    #[must_use]
    pub fn requires(mut self, component: impl Into<String>) -> Self {
        self.requires = Some(component.into());
        self
    }

    /// `-D<name>=ON|OFF`
    #[must_use]
    pub fn define(&self) -> String {
        format!("-D{}={}", self.name, on_off(self.enabled))
    }
}

pub(crate) fn on_off(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}

/// Everything the build tool needs besides the directories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfiguration {
    pub settings: Settings,
    pub shared: bool,
    /// Parallel job hint for the compile step
    pub jobs: usize,
    /// `LLVM_TARGETS_TO_BUILD`
    pub targets: String,
    /// Overrides the platform generator
    pub generator: Option<String>,
    pub toggles: Vec<FeatureToggle>,
}

impl BuildConfiguration {
    /// Generator for the target OS unless one was configured
    #[must_use]
    pub fn generator(&self) -> &str {
        match &self.generator {
            Some(generator) => generator,
            None if self.settings.os.is_windows() => "NMake Makefiles",
            None => "Unix Makefiles",
        }
    }

    /// Apply per-toggle overrides; unknown names are appended
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, bool>) {
        for (name, enabled) in overrides {
            match self.toggles.iter_mut().find(|t| &t.name == name) {
                Some(toggle) => toggle.enabled = *enabled,
                None => self.toggles.push(FeatureToggle {
                    name: name.clone(),
                    enabled: *enabled,
                    requires: None,
                }),
            }
        }
    }

    /// Check every enabled toggle's component against the fetched sources
    ///
    /// # Errors
    ///
    /// Returns `BuildError::MissingComponent` for the first enabled toggle
    /// whose component is absent.
    pub fn check_components(&self, manifest: &SourceManifest) -> Result<(), Error> {
        for toggle in self.toggles.iter().filter(|t| t.enabled) {
            if let Some(component) = &toggle.requires {
                if !manifest.contains(component) {
                    return Err(BuildError::MissingComponent {
                        feature: toggle.name.clone(),
                        component: component.clone(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}

/// Inputs handed to each build tool step
#[derive(Debug, Clone, Copy)]
pub struct BuildToolContext<'a> {
    /// Absolute paths
    pub layout: &'a BuildLayout,
    pub config: &'a BuildConfiguration,
    pub tx: &'a EventSender,
}
