//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields so
//! that `--debug` and `RUST_LOG` runs carry the same information the console
//! shows.

use llvmpkg_events::{AppEvent, BuildEvent, DownloadEvent, GeneralEvent, PackageEvent};
use tracing::{debug, error, info, warn};

/// Log an `AppEvent` at its severity with structured fields
pub fn log_event_with_tracing(event: &AppEvent) {
    match event {
        AppEvent::Download(download_event) => match download_event {
            DownloadEvent::Started {
                url,
                component,
                total_bytes,
            } => {
                info!(url = %url, component = ?component, total_bytes = ?total_bytes, "Download started");
            }
            DownloadEvent::Completed {
                url,
                component,
                bytes_downloaded,
                duration,
            } => {
                info!(
                    url = %url,
                    component = ?component,
                    bytes_downloaded = bytes_downloaded,
                    duration_ms = duration.as_millis(),
                    "Download completed"
                );
            }
            DownloadEvent::Failed {
                url,
                component,
                failure,
            } => {
                error!(
                    url = %url,
                    component = ?component,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Download failed"
                );
            }
        },

        AppEvent::Build(build_event) => match build_event {
            BuildEvent::StageStarted { stage, package } => {
                info!(stage = %stage, package = %package, "Stage started");
            }
            BuildEvent::StageCompleted {
                stage,
                package,
                duration,
            } => {
                info!(
                    stage = %stage,
                    package = %package,
                    duration_ms = duration.as_millis(),
                    "Stage completed"
                );
            }
            BuildEvent::StageFailed {
                stage,
                package,
                failure,
            } => {
                error!(
                    stage = %stage,
                    package = %package,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Stage failed"
                );
            }
            BuildEvent::ComponentStaged {
                component,
                version,
                destination,
            } => {
                info!(
                    component = %component,
                    version = %version,
                    destination = %destination.display(),
                    "Component staged"
                );
            }
            BuildEvent::BuildDirReset { path } => {
                info!(path = %path.display(), "Build directory reset");
            }
            BuildEvent::ToolInvoked {
                step,
                program,
                args,
            } => {
                debug!(step = %step, program = %program, args = ?args, "Build tool invoked");
            }
            BuildEvent::ToolCompleted { step, duration } => {
                info!(step = %step, duration_ms = duration.as_millis(), "Build step completed");
            }
        },

        AppEvent::Package(package_event) => match package_event {
            PackageEvent::RuleApplied {
                pattern,
                source,
                destination,
                files_copied,
            } => {
                debug!(
                    pattern = %pattern,
                    source = %source,
                    destination = %destination,
                    files_copied = files_copied,
                    "Copy rule applied"
                );
            }
            PackageEvent::Completed {
                package_dir,
                files_copied,
            } => {
                info!(
                    package_dir = %package_dir.display(),
                    files_copied = files_copied,
                    "Packaging completed"
                );
            }
        },

        AppEvent::General(general_event) => match general_event {
            GeneralEvent::Warning { message } => {
                warn!(message = %message, "Warning");
            }
            GeneralEvent::DebugLog { message } => {
                debug!(message = %message, "Debug log");
            }
            GeneralEvent::OperationStarted { operation } => {
                info!(operation = %operation, "Operation started");
            }
            GeneralEvent::OperationCompleted { operation } => {
                info!(operation = %operation, "Operation completed");
            }
            GeneralEvent::OperationFailed { operation, failure } => {
                error!(
                    operation = %operation,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Operation failed"
                );
            }
        },
    }
}
