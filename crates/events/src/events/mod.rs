use serde::{Deserialize, Serialize};

use llvmpkg_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub retryable: bool,
}

impl FailureContext {
    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self {
            code: error.user_code().map(Into::into),
            message: error.user_message().into_owned(),
            hint: error.user_hint().map(Into::into),
            retryable: error.is_retryable(),
        }
    }
}

pub mod build;
pub mod download;
pub mod general;
pub mod package;

pub use build::*;
pub use download::*;
pub use general::*;
pub use package::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Warnings, debug output and operation lifecycle
    General(GeneralEvent),

    /// Archive downloads
    Download(DownloadEvent),

    /// Fetch and build stages
    Build(BuildEvent),

    /// Packaging of the install tree
    Package(PackageEvent),
}

impl AppEvent {
    /// Severity used when the event is forwarded to tracing
    #[must_use]
    pub fn level(&self) -> tracing::Level {
        match self {
            AppEvent::General(GeneralEvent::DebugLog { .. })
            | AppEvent::Build(BuildEvent::ToolInvoked { .. })
            | AppEvent::Package(PackageEvent::RuleApplied { .. }) => tracing::Level::DEBUG,
            AppEvent::General(GeneralEvent::Warning { .. }) => tracing::Level::WARN,
            AppEvent::General(GeneralEvent::OperationFailed { .. })
            | AppEvent::Download(DownloadEvent::Failed { .. })
            | AppEvent::Build(BuildEvent::StageFailed { .. }) => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }
}
