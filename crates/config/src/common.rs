//! Configuration sections shared by every command

use crate::constants::{BUILD_DIR, INSTALL_DIR, PACKAGE_DIR, SOURCE_DIR};
use llvmpkg_types::{ColorChoice, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            color: default_color_choice(),
        }
    }
}

/// Staging layout
///
/// `root` defaults to the working directory; the four stage directories are
/// resolved relative to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,
    #[serde(default = "default_install_dir")]
    pub install_dir: PathBuf,
    #[serde(default = "default_package_dir")]
    pub package_dir: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            root: None,
            source_dir: default_source_dir(),
            build_dir: default_build_dir(),
            install_dir: default_install_dir(),
            package_dir: default_package_dir(),
        }
    }
}

impl PathConfig {
    /// Stage directories keyed by their config field name
    #[must_use]
    pub fn stage_dirs(&self) -> [(&'static str, &Path); 4] {
        [
            ("source_dir", self.source_dir.as_path()),
            ("build_dir", self.build_dir.as_path()),
            ("install_dir", self.install_dir.as_path()),
            ("package_dir", self.package_dir.as_path()),
        ]
    }
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: None,
        }
    }
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Tty
}

fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_source_dir() -> PathBuf {
    PathBuf::from(SOURCE_DIR)
}

fn default_build_dir() -> PathBuf {
    PathBuf::from(BUILD_DIR)
}

fn default_install_dir() -> PathBuf {
    PathBuf::from(INSTALL_DIR)
}

fn default_package_dir() -> PathBuf {
    PathBuf::from(PACKAGE_DIR)
}

fn default_timeout() -> u64 {
    600 // release tarballs are large
}

fn default_connect_timeout() -> u64 {
    30
}
