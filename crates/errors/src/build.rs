//! Build pipeline error types (fetch, extract, relocate, build tool)

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum BuildError {
    #[error("extraction failed: {message}")]
    ExtractionFailed { message: String },

    #[error("unsupported archive format: {path}")]
    UnsupportedArchiveFormat { path: String },

    #[error("relocation of {component} failed: {message}")]
    RelocationFailed { component: String, message: String },

    #[error("{step} step failed: `{program}` exited with {}", exit_status(.code))]
    BuildToolFailed {
        step: String,
        program: String,
        code: Option<i32>,
    },

    #[error("could not start build tool `{program}`: {message}")]
    BuildToolUnavailable { program: String, message: String },

    #[error("feature {feature} requires component {component}, which was not fetched")]
    MissingComponent { feature: String, component: String },

    #[error("invalid source manifest at {path}: {message}")]
    InvalidSourceManifest { path: String, message: String },
}

#[allow(clippy::ref_option)]
fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ExtractionFailed { .. } => {
                Some("The downloaded archive is corrupt; it was left in place for inspection.")
            }
            Self::UnsupportedArchiveFormat { .. } => {
                Some("Use a zip, tar, tar.gz, tar.bz2 or tar.xz source URL.")
            }
            Self::RelocationFailed { .. } => Some(
                "The archive layout did not match `<component>-<version>.src`, or the destination already exists.",
            ),
            Self::BuildToolFailed { .. } => {
                Some("See the build tool output above; the build tree was left for inspection.")
            }
            Self::BuildToolUnavailable { .. } => {
                Some("Install CMake or point `build.program` at the cmake executable.")
            }
            Self::MissingComponent { .. } => {
                Some("Fetch the full source set or disable the feature in the configuration.")
            }
            Self::InvalidSourceManifest { .. } => {
                Some("Run `llvmpkg fetch` again to recreate the source tree.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ExtractionFailed { .. } => "build.extraction_failed",
            Self::UnsupportedArchiveFormat { .. } => "build.unsupported_archive_format",
            Self::RelocationFailed { .. } => "build.relocation_failed",
            Self::BuildToolFailed { .. } => "build.build_tool_failed",
            Self::BuildToolUnavailable { .. } => "build.build_tool_unavailable",
            Self::MissingComponent { .. } => "build.missing_component",
            Self::InvalidSourceManifest { .. } => "build.invalid_source_manifest",
        };
        Some(code)
    }
}
