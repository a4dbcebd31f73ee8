use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::FailureContext;

/// Download-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DownloadEvent {
    /// Response headers received, body transfer starting
    Started {
        url: String,
        component: Option<String>,
        total_bytes: Option<u64>,
    },

    Completed {
        url: String,
        component: Option<String>,
        bytes_downloaded: u64,
        duration: Duration,
    },

    Failed {
        url: String,
        component: Option<String>,
        failure: FailureContext,
    },
}
