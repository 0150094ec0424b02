//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use timekeeper::{
    storage::{EventId, EventRecord, EventUpdate, MemoryStorage, Storage},
    StorageError,
};

pub fn event(id: EventId) -> EventRecord {
    EventRecord::new(id, format!("Event {}", id), "2026-02-18")
}

pub fn completed_event(id: EventId) -> EventRecord {
    let mut event = event(id);
    event.completed = true;
    event
}

/// Event store whose contents and write behaviour stay reachable from the test
pub struct SharedStorage {
    inner: Arc<Mutex<MemoryStorage>>,
    writes: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

#[derive(Clone)]
pub struct StorageSpy {
    inner: Arc<Mutex<MemoryStorage>>,
    writes: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

impl StorageSpy {
    /// Successful writes so far
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn event(&self, id: EventId) -> Option<EventRecord> {
        self.inner.lock().unwrap().get_event(id).unwrap()
    }

    /// Change an event behind the timer core's back
    pub fn insert(&self, event: EventRecord) {
        self.inner.lock().unwrap().insert(event);
    }
}

pub fn storage(events: impl IntoIterator<Item = EventRecord>) -> (SharedStorage, StorageSpy) {
    let inner = Arc::new(Mutex::new(MemoryStorage::with_events(events)));
    let writes = Arc::new(AtomicUsize::new(0));
    let fail_writes = Arc::new(AtomicBool::new(false));

    let spy = StorageSpy {
        inner: Arc::clone(&inner),
        writes: Arc::clone(&writes),
        fail_writes: Arc::clone(&fail_writes),
    };
    (
        SharedStorage {
            inner,
            writes,
            fail_writes,
        },
        spy,
    )
}

impl Storage for SharedStorage {
    fn get_event(&self, event_id: EventId) -> Result<Option<EventRecord>, StorageError> {
        self.inner.lock().unwrap().get_event(event_id)
    }

    fn update_event(&mut self, event_id: EventId, update: &EventUpdate) -> Result<usize, StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("database is locked".to_string()));
        }
        let affected = self.inner.lock().unwrap().update_event(event_id, update)?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(affected)
    }
}
