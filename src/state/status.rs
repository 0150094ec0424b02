//! Host status structure and management

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::EventId;

/// A countdown that expired but could not be written back to storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionFailure {
    pub event_id: EventId,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Summary of the timer host, served on `/status`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppStatus {
    pub active_timers: usize,
    pub ticking: bool,
    pub open_windows: usize,
    /// Completions so far; the daily planner reloads when this changes
    pub completions: u64,
    pub uptime: String,
    /// Unresolved completion failures for client visibility
    pub errors: Vec<CompletionFailure>,
}

/// Format a duration in whole seconds as `1h 2m 3s`, `2m 3s` or `3s`
pub fn format_uptime(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
