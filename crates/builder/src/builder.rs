//! Builder: configure, compile and install a fetched source tree

use crate::build_systems::{
    BuildConfiguration, BuildLayout, BuildTool, BuildToolContext, CMakeBuildTool,
};
use crate::fetch::SourceManifest;
use crate::utils::fileops::{ensure_dir, remove_dir_if_exists};
use llvmpkg_errors::Error;
use llvmpkg_events::{AppEvent, BuildEvent, EventEmitter, EventSender};
use llvmpkg_types::BuildReport;
use std::time::Instant;

/// Runs a [`BuildTool`] against a staging layout
pub struct Builder {
    tool: Box<dyn BuildTool>,
    tx: EventSender,
}

impl EventEmitter for Builder {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

impl Builder {
    #[must_use]
    pub fn new(tool: Box<dyn BuildTool>, tx: EventSender) -> Self {
        Self { tool, tx }
    }

    /// Builder driving the given `cmake` executable
    #[must_use]
    pub fn cmake(program: impl Into<String>, tx: EventSender) -> Self {
        Self::new(Box::new(CMakeBuildTool::new(program)), tx)
    }

    /// Produce a populated install tree
    ///
    /// Toggles are checked against `manifest` before anything touches the
    /// disk. The build directory is then recreated, and the install
    /// directory is only created once compilation has succeeded.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::MissingComponent` for an enabled toggle whose
    /// component was not fetched, `BuildError::BuildToolFailed` or
    /// `BuildError::BuildToolUnavailable` for a failing step, and I/O errors
    /// from preparing the directories.
    pub async fn build(
        &self,
        layout: &BuildLayout,
        config: &BuildConfiguration,
        manifest: &SourceManifest,
    ) -> Result<BuildReport, Error> {
        config.check_components(manifest)?;

        let start = Instant::now();
        let layout = layout.absolute()?;

        if remove_dir_if_exists(&layout.build_dir).await? {
            self.emit(AppEvent::Build(BuildEvent::BuildDirReset {
                path: layout.build_dir.clone(),
            }));
        }
        ensure_dir(&layout.build_dir).await?;

        let ctx = BuildToolContext {
            layout: &layout,
            config,
            tx: &self.tx,
        };
        self.emit_debug(format!(
            "building {} with {} ({})",
            layout.source_dir.display(),
            self.tool.program(),
            config.settings
        ));

        self.tool.configure(&ctx).await?;
        self.tool.build(&ctx).await?;
        ensure_dir(&layout.install_dir).await?;
        self.tool.install(&ctx).await?;

        Ok(BuildReport {
            build_dir: layout.build_dir.clone(),
            install_dir: layout.install_dir.clone(),
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        })
    }
}
