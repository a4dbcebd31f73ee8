//! CMake build tool implementation

use super::core::on_off;
use super::{BuildTool, BuildToolContext};
use async_trait::async_trait;
use llvmpkg_errors::{BuildError, Error};
use llvmpkg_events::{AppEvent, BuildEvent, EventEmitter, ToolStep};
use llvmpkg_types::{Arch, CompilerKind};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

/// Drives `cmake` (or a stand-in with the same command line)
#[derive(Debug, Clone)]
pub struct CMakeBuildTool {
    program: String,
}

impl CMakeBuildTool {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments of the configure step
    #[must_use]
    pub fn configure_args(ctx: &BuildToolContext<'_>) -> Vec<String> {
        let config = ctx.config;
        let settings = &config.settings;
        let mut args = vec![
            ctx.layout.source_dir.display().to_string(),
            "-G".to_string(),
            config.generator().to_string(),
            format!("-DCMAKE_BUILD_TYPE={}", settings.build_type),
        ];

        if settings.arch == Arch::X86 && !settings.os.is_windows() {
            args.push("-DCMAKE_C_FLAGS=-m32".to_string());
            args.push("-DCMAKE_CXX_FLAGS=-m32".to_string());
        }
        if settings.compiler.kind == CompilerKind::Clang {
            args.push("-DCMAKE_C_COMPILER=clang".to_string());
            args.push("-DCMAKE_CXX_COMPILER=clang++".to_string());
        }

        args.push(format!(
            "-DCMAKE_INSTALL_PREFIX={}",
            ctx.layout.install_dir.display()
        ));
        args.push(format!("-DBUILD_SHARED_LIBS={}", on_off(config.shared)));
        args.push("-DCMAKE_VERBOSE_MAKEFILE=1".to_string());
        args.push(format!("-DLLVM_TARGETS_TO_BUILD={}", config.targets));
        args.extend(config.toggles.iter().map(super::FeatureToggle::define));
        args
    }

    /// Arguments of the compile step
    #[must_use]
    pub fn build_args(ctx: &BuildToolContext<'_>) -> Vec<String> {
        let mut args = vec![
            "--build".to_string(),
            ".".to_string(),
            "--config".to_string(),
            ctx.config.settings.build_type.to_string(),
        ];
        // The Windows generators take no job hint
        if !ctx.config.settings.os.is_windows() {
            args.push("--parallel".to_string());
            args.push(ctx.config.jobs.to_string());
        }
        args
    }

    /// Arguments of the install step
    #[must_use]
    pub fn install_args(ctx: &BuildToolContext<'_>) -> Vec<String> {
        vec![
            "--build".to_string(),
            ".".to_string(),
            "--target".to_string(),
            "install".to_string(),
            "--config".to_string(),
            ctx.config.settings.build_type.to_string(),
        ]
    }

    /// Run one step in the build directory with output streamed through
    async fn run(
        &self,
        ctx: &BuildToolContext<'_>,
        step: ToolStep,
        args: Vec<String>,
    ) -> Result<(), Error> {
        let tx = ctx.tx;
        tx.emit(AppEvent::Build(BuildEvent::ToolInvoked {
            step,
            program: self.program.clone(),
            args: args.clone(),
        }));
        let start = Instant::now();

        let status = Command::new(&self.program)
            .args(&args)
            .current_dir(&ctx.layout.build_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| BuildError::BuildToolUnavailable {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        if !status.success() {
            return Err(BuildError::BuildToolFailed {
                step: step.to_string(),
                program: self.program.clone(),
                code: status.code(),
            }
            .into());
        }

        tx.emit(AppEvent::Build(BuildEvent::ToolCompleted {
            step,
            duration: start.elapsed(),
        }));
        Ok(())
    }
}

impl Default for CMakeBuildTool {
    fn default() -> Self {
        Self::new("cmake")
    }
}

#[async_trait]
impl BuildTool for CMakeBuildTool {
    async fn configure(&self, ctx: &BuildToolContext<'_>) -> Result<(), Error> {
        self.run(ctx, ToolStep::Configure, Self::configure_args(ctx))
            .await
    }

    async fn build(&self, ctx: &BuildToolContext<'_>) -> Result<(), Error> {
        self.run(ctx, ToolStep::Compile, Self::build_args(ctx)).await
    }

    async fn install(&self, ctx: &BuildToolContext<'_>) -> Result<(), Error> {
        self.run(ctx, ToolStep::Install, Self::install_args(ctx)).await
    }

    fn program(&self) -> &str {
        &self.program
    }
}
