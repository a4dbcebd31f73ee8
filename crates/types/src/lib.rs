#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for llvmpkg
//!
//! This crate provides the settings axes a build configuration is made of,
//! the package metadata surfaced to the dependency manager, and the reports
//! produced by each pipeline stage.

pub mod package;
pub mod reports;
pub mod settings;

pub use package::{PackageMetadata, PackageOptions, DEFAULT_VERSION, VERSION_OVERRIDE_ENV};
pub use reports::{BuildReport, FetchReport, PackageReport, PipelineReport};
pub use settings::{Arch, BuildType, Compiler, CompilerKind, Os, Settings};

use serde::{Deserialize, Serialize};

/// Output format for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    Tty,
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Tty
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    Auto,
    Never,
}

impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}

impl Default for ColorChoice {
    fn default() -> Self {
        Self::Auto
    }
}
