//! In-process event store

use std::collections::HashMap;

use tracing::debug;

use super::{EventId, EventRecord, EventUpdate, Storage};
use crate::error::StorageError;

/// Event store backed by a plain map
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    events: HashMap<EventId, EventRecord>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with the given events
    pub fn with_events(events: impl IntoIterator<Item = EventRecord>) -> Self {
        let mut storage = Self::new();
        for event in events {
            storage.insert(event);
        }
        storage
    }

    /// Insert or replace an event
    pub fn insert(&mut self, event: EventRecord) {
        self.events.insert(event.id, event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All events ordered by start date then id
    pub fn events(&self) -> Vec<EventRecord> {
        let mut events: Vec<EventRecord> = self.events.values().cloned().collect();
        events.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
        events
    }
}

impl Storage for MemoryStorage {
    fn get_event(&self, event_id: EventId) -> Result<Option<EventRecord>, StorageError> {
        Ok(self.events.get(&event_id).cloned())
    }

    fn update_event(&mut self, event_id: EventId, update: &EventUpdate) -> Result<usize, StorageError> {
        if update.is_empty() {
            return Ok(0);
        }

        match self.events.get_mut(&event_id) {
            Some(event) => {
                event.apply(update);
                debug!("Updated event {}: {:?}", event_id, update);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_reports_affected_count() {
        let mut storage = MemoryStorage::with_events([EventRecord::new(1, "Report", "2026-02-18")]);

        assert_eq!(storage.update_event(1, &EventUpdate::completed()).unwrap(), 1);
        assert_eq!(storage.update_event(2, &EventUpdate::completed()).unwrap(), 0);
        assert_eq!(storage.update_event(1, &EventUpdate::default()).unwrap(), 0);
        assert!(storage.get_event(1).unwrap().unwrap().completed);
    }

    #[test]
    fn events_are_ordered_by_start_date() {
        let storage = MemoryStorage::with_events([
            EventRecord::new(3, "Later", "2026-03-01"),
            EventRecord::new(1, "Earlier", "2026-02-18"),
            EventRecord::new(2, "Same day", "2026-02-18"),
        ]);

        let ids: Vec<EventId> = storage.events().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(storage.len(), 3);
    }
}
