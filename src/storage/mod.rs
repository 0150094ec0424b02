//! Event storage collaborator
//!
//! The timer core only needs to read an event and mark it completed. The
//! full event/progress store lives elsewhere; this module defines the
//! contract plus two small backends.

pub mod memory;
pub mod sqlite;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

/// Identifier of an event record
pub type EventId = i64;

/// A planner event as stored by the host application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `YYYY-MM-DD`
    pub start_date: String,
    /// Unset for single-day events
    #[serde(default)]
    pub end_date: Option<String>,
    /// `HH:MM`
    #[serde(default)]
    pub start_time: Option<String>,
    /// `HH:MM`
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl EventRecord {
    /// Create an open single-day event with no times set
    pub fn new(id: EventId, title: impl Into<String>, start_date: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            start_date: start_date.into(),
            end_date: None,
            start_time: None,
            end_time: None,
            completed: false,
        }
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, update: &EventUpdate) {
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        if let Some(end_time) = &update.end_time {
            self.end_time = Some(end_time.clone());
        }
    }
}

/// Partial update of an event; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventUpdate {
    pub completed: Option<bool>,
    pub end_time: Option<String>,
}

impl EventUpdate {
    /// Update that marks an event completed
    pub fn completed() -> Self {
        Self {
            completed: Some(true),
            end_time: None,
        }
    }

    /// Also set the end time
    pub fn with_end_time(mut self, end_time: impl Into<String>) -> Self {
        self.end_time = Some(end_time.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_none() && self.end_time.is_none()
    }
}

/// Durable event records consumed by the timer core
pub trait Storage: Send {
    /// Look up a single event
    fn get_event(&self, event_id: EventId) -> Result<Option<EventRecord>, StorageError>;

    /// Apply a partial update and return the number of affected records
    fn update_event(&mut self, event_id: EventId, update: &EventUpdate) -> Result<usize, StorageError>;
}
