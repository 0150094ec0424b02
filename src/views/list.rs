//! Aggregate list of running and paused timers

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::Result,
    storage::EventId,
    timer::{format_hms, TimerManager, TimerMode},
};

/// Number of rows visible at once
pub const DEFAULT_VIEWPORT_ROWS: usize = 10;

/// One rendered row of the timer list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerRow {
    pub event_id: EventId,
    pub title: String,
    pub mode: TimerMode,
    /// `HH:MM:SS`
    pub time: String,
    /// `running` or `paused`
    pub status: String,
}

/// Everything a front-end needs to draw the list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerListSnapshot {
    pub rows: Vec<TimerRow>,
    pub selected: Option<EventId>,
    /// Index of the first visible row
    pub scroll: usize,
}

#[derive(Debug, Clone)]
pub struct TimerListView {
    rows: Vec<TimerRow>,
    selected: Option<EventId>,
    scroll: usize,
    viewport: usize,
}

impl Default for TimerListView {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_ROWS)
    }
}

impl TimerListView {
    pub fn new(viewport: usize) -> Self {
        Self {
            rows: Vec::new(),
            selected: None,
            scroll: 0,
            viewport: viewport.max(1),
        }
    }

    pub fn rows(&self) -> &[TimerRow] {
        &self.rows
    }

    pub fn selected(&self) -> Option<EventId> {
        self.selected
    }

    pub fn snapshot(&self) -> TimerListSnapshot {
        TimerListSnapshot {
            rows: self.rows.clone(),
            selected: self.selected,
            scroll: self.scroll,
        }
    }

    /// Rebuild the rows from the registry, keeping the selection if it survived
    pub fn refresh(&mut self, manager: &TimerManager) {
        let mut rows = Vec::with_capacity(manager.len());
        for task in manager.tasks() {
            let event = match manager.storage().get_event(task.event_id) {
                Ok(Some(event)) => event,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Failed to load event {} for timer list: {}", task.event_id, e);
                    continue;
                }
            };
            rows.push(TimerRow {
                event_id: task.event_id,
                title: event.title,
                mode: task.mode,
                time: format_hms(task.seconds),
                status: task.status_label().to_string(),
            });
        }
        rows.sort_by_key(|row| row.event_id);
        self.rows = rows;

        if let Some(id) = self.selected {
            if self.position(id).is_none() {
                debug!("Selected event {} left the timer list", id);
                self.selected = None;
            }
        }
        self.restore_viewport();
    }

    /// Select a row; selecting an absent event clears the selection
    pub fn select(&mut self, event_id: EventId) -> bool {
        self.selected = self.position(event_id).map(|_| event_id);
        self.restore_viewport();
        self.selected.is_some()
    }

    /// Pause or resume the selected task
    pub fn toggle_selected(&mut self, manager: &mut TimerManager) {
        let Some(id) = self.selected else {
            return;
        };
        manager.toggle_running(id);
        self.refresh(manager);
    }

    /// Complete the selected task
    pub fn complete_selected(&mut self, manager: &mut TimerManager) -> Result<bool> {
        let Some(id) = self.selected else {
            return Ok(false);
        };
        let completed = manager.complete(id, false)?;
        self.refresh(manager);
        Ok(completed)
    }

    /// Hand the selected event to the window opener
    pub fn open_selected<R>(&self, open: impl FnOnce(EventId) -> R) -> Option<R> {
        self.selected.map(open)
    }

    fn position(&self, event_id: EventId) -> Option<usize> {
        self.rows.iter().position(|row| row.event_id == event_id)
    }

    fn restore_viewport(&mut self) {
        let max_scroll = self.rows.len().saturating_sub(self.viewport);
        if let Some(index) = self.selected.and_then(|id| self.position(id)) {
            if index < self.scroll {
                self.scroll = index;
            } else if index >= self.scroll + self.viewport {
                self.scroll = index + 1 - self.viewport;
            }
        }
        self.scroll = self.scroll.min(max_scroll);
    }
}
