use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::FailureContext;

/// Pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fetch,
    Build,
    Package,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Build => "build",
            Self::Package => "package",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build tool invocation steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStep {
    Configure,
    Compile,
    Install,
}

impl ToolStep {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configure => "configure",
            Self::Compile => "compile",
            Self::Install => "install",
        }
    }
}

impl std::fmt::Display for ToolStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fetch and build events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BuildEvent {
    StageStarted {
        stage: Stage,
        package: String,
    },

    StageCompleted {
        stage: Stage,
        package: String,
        duration: Duration,
    },

    StageFailed {
        stage: Stage,
        package: String,
        failure: FailureContext,
    },

    /// Archive unpacked and moved into the source tree
    ComponentStaged {
        component: String,
        version: String,
        destination: PathBuf,
    },

    /// Stale build directory removed before configuring
    BuildDirReset {
        path: PathBuf,
    },

    ToolInvoked {
        step: ToolStep,
        program: String,
        args: Vec<String>,
    },

    ToolCompleted {
        step: ToolStep,
        duration: Duration,
    },
}
