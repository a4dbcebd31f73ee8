//! Packaging error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum PackagingError {
    #[error("failed to copy {path}: {message}")]
    CopyFailed { path: String, message: String },

    #[error("invalid copy pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("install tree not found: {path}")]
    InstallTreeMissing { path: String },
}

impl UserFacingError for PackagingError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::CopyFailed { .. } => {
                Some("Check permissions and free space in the package directory.")
            }
            Self::InstallTreeMissing { .. } => Some("Run `llvmpkg build` before packaging."),
            Self::InvalidPattern { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::CopyFailed { .. } => "packaging.copy_failed",
            Self::InvalidPattern { .. } => "packaging.invalid_pattern",
            Self::InstallTreeMissing { .. } => "packaging.install_tree_missing",
        };
        Some(code)
    }
}
