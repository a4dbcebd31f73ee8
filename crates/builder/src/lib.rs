#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]
//! Fetch, build and package pipeline for llvmpkg
//!
//! This crate stages LLVM component sources from an HTTP host, drives
//! CMake against the staged tree and copies the install tree into the
//! package layout.

mod build_systems;
mod builder;
mod fetch;
mod packaging;
mod pipeline;
mod recipe;
mod utils;

pub use build_systems::{
    BuildConfiguration, BuildLayout, BuildTool, BuildToolContext, CMakeBuildTool, FeatureToggle,
};
pub use builder::Builder;
pub use fetch::{
    extract_archive, relocate, ArchiveFormat, ComponentSpec, Fetcher, SourceManifest, UrlTemplate,
    SOURCE_MANIFEST_FILE,
};
pub use packaging::{default_rules, CopyRule, Packager, LIBRARY_PATTERNS};
pub use pipeline::Pipeline;
pub use recipe::{LlvmRecipe, LIBUNWIND_RELEASE};
pub use utils::fileops::{ensure_dir, remove_dir_if_exists};
