//! Timer task structure and management

use serde::{Deserialize, Serialize};

use crate::storage::EventId;

/// Identifier of an open timer window
pub type WindowId = u64;

/// Counting direction of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    /// Count up from zero
    Stopwatch,
    /// Count down to zero, then complete the event
    Countdown,
}

impl Default for TimerMode {
    fn default() -> Self {
        Self::Stopwatch
    }
}

/// Runtime timer state bound to one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerTask {
    pub event_id: EventId,
    pub mode: TimerMode,
    /// Elapsed seconds for a stopwatch, remaining seconds for a countdown
    pub seconds: u64,
    pub running: bool,
    /// Window currently showing this task, if any
    pub bound_window: Option<WindowId>,
}

impl TimerTask {
    /// Create a paused task
    pub fn new(event_id: EventId, mode: TimerMode, initial_seconds: u64) -> Self {
        Self {
            event_id,
            mode,
            seconds: initial_seconds,
            running: false,
            bound_window: None,
        }
    }

    /// Switch mode, discarding any in-progress timing
    pub fn reset_to(&mut self, mode: TimerMode) {
        self.mode = mode;
        self.seconds = 0;
        self.running = false;
    }

    /// Advance by one tick period and report whether a countdown expired
    pub fn advance(&mut self) -> bool {
        if !self.running {
            return false;
        }

        match self.mode {
            TimerMode::Stopwatch => {
                self.seconds = self.seconds.saturating_add(1);
                false
            }
            TimerMode::Countdown => {
                self.seconds = self.seconds.saturating_sub(1);
                self.seconds == 0
            }
        }
    }

    /// Time value as `HH:MM:SS`
    pub fn display(&self) -> String {
        format_hms(self.seconds)
    }

    /// Status label shown in the timer list
    pub fn status_label(&self) -> &'static str {
        if self.running { "running" } else { "paused" }
    }
}

/// Format a second count as `HH:MM:SS`; hours are not wrapped
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
