//! Build tool abstraction
//!
//! A build tool runs three steps inside the build directory: configure,
//! build and install. Any failed step aborts the build.

use async_trait::async_trait;
use llvmpkg_errors::Error;

mod cmake;
mod core;

pub use self::core::{BuildConfiguration, BuildLayout, BuildToolContext, FeatureToggle};
pub use cmake::CMakeBuildTool;

/// Trait for build tool implementations
#[async_trait]
pub trait BuildTool: Send + Sync {
    /// Configure phase
    async fn configure(&self, ctx: &BuildToolContext<'_>) -> Result<(), Error>;

    /// Build phase
    async fn build(&self, ctx: &BuildToolContext<'_>) -> Result<(), Error>;

    /// Install phase
    async fn install(&self, ctx: &BuildToolContext<'_>) -> Result<(), Error>;

    /// Executable invoked for each step
    fn program(&self) -> &str;
}
