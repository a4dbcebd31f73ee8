#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for llvmpkg
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/llvmpkg/config.toml)
//! - Environment variables (`LLVMPKG_*`)
//! - CLI flags (applied by the binary on top of the result)

pub mod build;
pub mod constants;
pub mod common;
pub mod source;

pub use build::BuildConfig;
pub use common::{GeneralConfig, NetworkConfig, PathConfig};
pub use source::{SourceConfig, SourceVariant, TemplateKind};

use llvmpkg_errors::{ConfigError, Error};
use llvmpkg_types::{ColorChoice, OutputFormat, DEFAULT_VERSION, VERSION_OVERRIDE_ENV};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir
            .join(constants::CONFIG_DIR_NAME)
            .join(constants::CONFIG_FILE_NAME))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// An explicitly given path must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Merge overrides read through `lookup`
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds a value that cannot be parsed.
    pub fn merge_env_from<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        // LLVMPKG_OUTPUT
        if let Some(output) = lookup("LLVMPKG_OUTPUT") {
            self.general.default_output = match output.as_str() {
                "plain" => OutputFormat::Plain,
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => return Err(invalid("LLVMPKG_OUTPUT", output)),
            };
        }

        // LLVMPKG_COLOR
        if let Some(color) = lookup("LLVMPKG_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => return Err(invalid("LLVMPKG_COLOR", color)),
            };
        }

        // LLVMPKG_BUILD_JOBS
        if let Some(jobs) = lookup("LLVMPKG_BUILD_JOBS") {
            self.build.jobs = match jobs.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(invalid("LLVMPKG_BUILD_JOBS", jobs)),
            };
        }

        if let Some(program) = lookup("LLVMPKG_CMAKE") {
            self.build.program = program;
        }

        if let Some(root) = lookup("LLVMPKG_ROOT") {
            self.paths.root = Some(PathBuf::from(root));
        }

        if let Some(template) = lookup("LLVMPKG_SOURCE_TEMPLATE") {
            self.source.template = template
                .parse()
                .map_err(|_| invalid("LLVMPKG_SOURCE_TEMPLATE", template))?;
        }

        if let Some(base) = lookup("LLVMPKG_SOURCE_BASE_URL") {
            self.source.base_url = Some(base);
        }

        if let Some(version) = lookup(VERSION_OVERRIDE_ENV) {
            if version.trim().is_empty() {
                return Err(invalid(VERSION_OVERRIDE_ENV, version));
            }
            self.source.version = Some(version);
        }

        Ok(())
    }

    /// Check cross-field constraints a TOML schema cannot express
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for a custom template without a usable
    /// pattern, a zero job count, or a stage directory that is not a distinct
    /// subdirectory of the staging root.
    pub fn validate(&self) -> Result<(), Error> {
        if self.source.template == TemplateKind::Custom {
            let Some(pattern) = &self.source.custom_template else {
                return Err(ConfigError::Invalid {
                    message: "source.template = \"custom\" requires source.custom_template"
                        .to_string(),
                }
                .into());
            };
            if !pattern.contains("{component}") || !pattern.contains("{version}") {
                return Err(ConfigError::Invalid {
                    message: format!(
                        "custom template `{pattern}` must contain {{component}} and {{version}}"
                    ),
                }
                .into());
            }
        }
        if self.build.jobs == 0 {
            return Err(invalid("build.jobs", "0".to_string()));
        }
        self.validate_paths()
    }

    /// Stage directories are distinct, non-nested subdirectories of the root
    fn validate_paths(&self) -> Result<(), Error> {
        let stages = self.paths.stage_dirs();
        for (field, dir) in &stages {
            let below_root = dir.components().next().is_some()
                && dir
                    .components()
                    .all(|component| matches!(component, Component::Normal(_)));
            if !below_root {
                return Err(ConfigError::Invalid {
                    message: format!(
                        "paths.{field} `{}` must be a relative path below the staging root",
                        dir.display()
                    ),
                }
                .into());
            }
        }

        for (i, (field, dir)) in stages.iter().enumerate() {
            for (other_field, other) in &stages[i + 1..] {
                if dir.starts_with(other) || other.starts_with(dir) {
                    return Err(ConfigError::Invalid {
                        message: format!(
                            "paths.{field} `{}` overlaps paths.{other_field} `{}`",
                            dir.display(),
                            other.display()
                        ),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Release being packaged
    #[must_use]
    pub fn package_version(&self) -> &str {
        self.source.version.as_deref().unwrap_or(DEFAULT_VERSION)
    }

    /// Staging root (with default)
    #[must_use]
    pub fn staging_root(&self) -> PathBuf {
        self.paths
            .root
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    #[must_use]
    pub fn source_path(&self) -> PathBuf {
        self.staging_root().join(&self.paths.source_dir)
    }

    #[must_use]
    pub fn build_path(&self) -> PathBuf {
        self.staging_root().join(&self.paths.build_dir)
    }

    #[must_use]
    pub fn install_path(&self) -> PathBuf {
        self.staging_root().join(&self.paths.install_dir)
    }

    #[must_use]
    pub fn package_path(&self) -> PathBuf {
        self.staging_root().join(&self.paths.package_dir)
    }
}

fn invalid(field: &str, value: String) -> Error {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value,
    }
    .into()
}
