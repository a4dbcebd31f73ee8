#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in llvmpkg
//!
//! Library crates never log or print directly. They emit [`AppEvent`]s over
//! an unbounded channel and the CLI decides how to render them.

pub mod events;
pub use events::{
    AppEvent, BuildEvent, DownloadEvent, FailureContext, GeneralEvent, PackageEvent, Stage,
    ToolStep,
};

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Type alias for event sender using the `AppEvent` system
pub type EventSender = UnboundedSender<AppEvent>;

/// Type alias for event receiver using the `AppEvent` system
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events
///
/// Implemented for the raw `EventSender` and for any struct that optionally
/// carries one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Receiver may be gone; events are best-effort.
            let _ = sender.send(event);
        }
    }

    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    fn emit_operation_started(&self, operation: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationStarted {
            operation: operation.into(),
        }));
    }

    fn emit_operation_completed(&self, operation: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationCompleted {
            operation: operation.into(),
        }));
    }

    fn emit_operation_failed(&self, operation: impl Into<String>, error: &llvmpkg_errors::Error) {
        self.emit(AppEvent::General(GeneralEvent::OperationFailed {
            operation: operation.into(),
            failure: FailureContext::from_error(error),
        }));
    }

    fn emit_stage_started(&self, stage: Stage, package: impl Into<String>) {
        self.emit(AppEvent::Build(BuildEvent::StageStarted {
            stage,
            package: package.into(),
        }));
    }

    fn emit_stage_completed(&self, stage: Stage, package: impl Into<String>, duration: Duration) {
        self.emit(AppEvent::Build(BuildEvent::StageCompleted {
            stage,
            package: package.into(),
            duration,
        }));
    }

    fn emit_stage_failed(
        &self,
        stage: Stage,
        package: impl Into<String>,
        error: &llvmpkg_errors::Error,
    ) {
        self.emit(AppEvent::Build(BuildEvent::StageFailed {
            stage,
            package: package.into(),
            failure: FailureContext::from_error(error),
        }));
    }

    fn emit_download_started(
        &self,
        url: impl Into<String>,
        component: Option<String>,
        total_bytes: Option<u64>,
    ) {
        self.emit(AppEvent::Download(DownloadEvent::Started {
            url: url.into(),
            component,
            total_bytes,
        }));
    }

    fn emit_download_completed(
        &self,
        url: impl Into<String>,
        component: Option<String>,
        bytes_downloaded: u64,
        duration: Duration,
    ) {
        self.emit(AppEvent::Download(DownloadEvent::Completed {
            url: url.into(),
            component,
            bytes_downloaded,
            duration,
        }));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}
