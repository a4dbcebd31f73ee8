use serde::{Deserialize, Serialize};

use super::FailureContext;

/// General utility events for warnings, debug output and whole operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    Warning {
        message: String,
    },

    DebugLog {
        message: String,
    },

    /// A multi-stage operation such as `run` began
    OperationStarted {
        operation: String,
    },

    OperationCompleted {
        operation: String,
    },

    OperationFailed {
        operation: String,
        failure: FailureContext,
    },
}

impl GeneralEvent {
    /// Create a warning event
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
        }
    }

    /// Create a debug log event
    pub fn debug(message: impl Into<String>) -> Self {
        Self::DebugLog {
            message: message.into(),
        }
    }
}
