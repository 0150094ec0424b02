//! Per-task timer window controller

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    error::{Result, TimerError},
    storage::EventId,
    timer::{format_hms, TimerManager, TimerMode, WindowId},
};

/// Countdown duration entered in the window's spinners
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownInput {
    #[serde(default)]
    pub hours: u32,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub seconds: u32,
}

impl CountdownInput {
    /// Build an input clamped to the spinner ranges
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            hours: hours.min(23),
            minutes: minutes.min(59),
            seconds: seconds.min(59),
        }
    }

    /// Split a remaining time back into spinner values
    pub fn from_seconds(total: u64) -> Self {
        let hours = u32::try_from(total / 3600).unwrap_or(u32::MAX);
        Self::new(hours, ((total % 3600) / 60) as u32, (total % 60) as u32)
    }

    pub fn total_seconds(&self) -> u64 {
        u64::from(self.hours) * 3600 + u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }
}

/// Result of asking for a timer window
#[derive(Debug)]
pub enum WindowOpen {
    /// A new window was bound to the event's task
    Created(TimerWindow),
    /// The event already has a window; bring that one forward instead
    Refocused(WindowId),
}

/// Render model of a timer window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowView {
    pub window_id: WindowId,
    pub event_id: EventId,
    pub title: String,
    pub mode: TimerMode,
    /// `HH:MM:SS`
    pub display: String,
    pub running: bool,
    /// Label of the start/pause button
    pub action: String,
    pub countdown: CountdownInput,
}

/// Controller for a single event's timer
#[derive(Debug, Clone)]
pub struct TimerWindow {
    id: WindowId,
    event_id: EventId,
    title: String,
    input: CountdownInput,
}

impl TimerWindow {
    /// Open (or refocus) the timer window for an event
    pub fn open(manager: &mut TimerManager, event_id: EventId, window_id: WindowId) -> Result<WindowOpen> {
        let event = manager
            .storage()
            .get_event(event_id)?
            .ok_or(TimerError::EventNotFound(event_id))?;
        if event.completed {
            warn!("Refusing to open a timer for completed event {}", event_id);
            return Err(TimerError::InvalidState(format!(
                "event {} is already completed, its timer cannot be started",
                event_id
            )));
        }

        if let Some(existing) = manager.get_task(event_id).and_then(|task| task.bound_window) {
            debug!("Event {} already shown in window {}, refocusing", event_id, existing);
            return Ok(WindowOpen::Refocused(existing));
        }

        let task = manager.get_or_create_task(event_id, TimerMode::Stopwatch, 0)?;
        let input = if task.mode == TimerMode::Countdown && task.seconds > 0 {
            CountdownInput::from_seconds(task.seconds)
        } else {
            CountdownInput::default()
        };
        manager.bind_window(event_id, window_id)?;

        info!("Opened timer window {} for event {}", window_id, event_id);
        Ok(WindowOpen::Created(Self {
            id: window_id,
            event_id,
            title: event.title,
            input,
        }))
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_countdown_input(&mut self, input: CountdownInput) {
        self.input = CountdownInput::new(input.hours, input.minutes, input.seconds);
    }

    /// Start, resume or pause the task
    ///
    /// An idle countdown at zero is loaded from the countdown input first.
    pub fn toggle_start_pause(&mut self, manager: &mut TimerManager) -> Result<()> {
        let Some(task) = manager.get_task(self.event_id) else {
            return Ok(());
        };
        let (running, mode, seconds) = (task.running, task.mode, task.seconds);

        if running {
            manager.set_running(self.event_id, false);
        } else if mode == TimerMode::Countdown && seconds == 0 {
            let total = self.input.total_seconds();
            if total == 0 {
                return Err(TimerError::InvalidArgument(
                    "set a countdown duration before starting".to_string(),
                ));
            }
            manager.start_countdown(self.event_id, total)?;
        } else {
            manager.set_running(self.event_id, true);
        }
        Ok(())
    }

    pub fn change_mode(&mut self, manager: &mut TimerManager, mode: TimerMode) {
        manager.change_mode(self.event_id, mode);
    }

    /// Complete the event manually; the caller closes the window on success
    pub fn complete(&self, manager: &mut TimerManager) -> Result<bool> {
        manager.complete(self.event_id, false)
    }

    /// Close the window; the task keeps timing in the background
    pub fn close(self, manager: &mut TimerManager) {
        if manager.unbind_window(self.event_id, self.id) {
            debug!("Window {} closed, event {} keeps timing", self.id, self.event_id);
        }
    }

    /// Current render model, or `None` once the task is gone
    pub fn view(&self, manager: &TimerManager) -> Option<WindowView> {
        let task = manager.get_task(self.event_id)?;
        Some(WindowView {
            window_id: self.id,
            event_id: self.event_id,
            title: self.title.clone(),
            mode: task.mode,
            display: format_hms(task.seconds),
            running: task.running,
            action: if task.running { "pause" } else { "start" }.to_string(),
            countdown: self.input,
        })
    }
}
