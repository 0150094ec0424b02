mod common;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use common::{completed_event, event, storage};
use timekeeper::{
    storage::{EventRecord, SqliteStorage, Storage},
    TimerError, TimerManager, TimerMode,
};

fn tick_n(manager: &mut TimerManager, n: usize) {
    for _ in 0..n {
        manager.tick();
    }
}

#[test]
fn stopwatch_only_advances_while_running() {
    let (storage, spy) = storage([event(1)]);
    let mut manager = TimerManager::new(storage);
    manager.get_or_create_task(1, TimerMode::Stopwatch, 0).unwrap();

    manager.set_running(1, true);
    tick_n(&mut manager, 5);
    assert_eq!(manager.get_task(1).unwrap().seconds, 5);

    manager.set_running(1, false);
    tick_n(&mut manager, 3);
    assert_eq!(manager.get_task(1).unwrap().seconds, 5);

    manager.set_running(1, true);
    tick_n(&mut manager, 2);
    assert_eq!(manager.get_task(1).unwrap().seconds, 7);

    assert_eq!(spy.writes(), 0);
    assert!(!spy.event(1).unwrap().completed);
}

#[test]
fn countdown_reaches_zero_and_completes_event() {
    let (storage, spy) = storage([event(2)]);
    let mut manager = TimerManager::new(storage);
    manager.get_or_create_task(2, TimerMode::Countdown, 0).unwrap();
    manager.start_countdown(2, 3).unwrap();

    tick_n(&mut manager, 2);
    assert_eq!(manager.get_task(2).unwrap().seconds, 1);

    manager.tick();

    assert!(manager.get_task(2).is_none());
    let stored = spy.event(2).unwrap();
    assert!(stored.completed);
    assert!(stored.end_time.is_some());
    assert!(!manager.is_ticking());
}

#[test]
fn completion_keeps_existing_end_time() {
    let mut planned = event(4);
    planned.end_time = Some("15:00".to_string());
    let (storage, spy) = storage([planned]);
    let mut manager = TimerManager::new(storage);
    manager.get_or_create_task(4, TimerMode::Stopwatch, 0).unwrap();

    manager.complete(4, false).unwrap();

    let stored = spy.event(4).unwrap();
    assert!(stored.completed);
    assert_eq!(stored.end_time.as_deref(), Some("15:00"));
}

#[test]
fn completing_without_a_task_is_a_no_op() {
    let (storage, spy) = storage([event(3)]);
    let mut manager = TimerManager::new(storage);

    assert!(!manager.complete(3, false).unwrap());

    assert_eq!(spy.writes(), 0);
    assert!(!spy.event(3).unwrap().completed);
}

#[test]
fn completion_is_idempotent() {
    let (storage, spy) = storage([event(1), event(2)]);
    let mut manager = TimerManager::new(storage);

    manager.get_or_create_task(1, TimerMode::Stopwatch, 0).unwrap();
    assert!(manager.complete(1, false).unwrap());
    assert!(!manager.complete(1, false).unwrap());

    manager.get_or_create_task(2, TimerMode::Countdown, 0).unwrap();
    manager.start_countdown(2, 1).unwrap();
    manager.tick();
    assert!(!manager.complete(2, false).unwrap());

    assert_eq!(spy.writes(), 2);
}

#[test]
fn externally_completed_event_drops_task_without_writing() {
    let (storage, spy) = storage([event(1)]);
    let mut manager = TimerManager::new(storage);
    manager.get_or_create_task(1, TimerMode::Stopwatch, 0).unwrap();
    spy.insert(completed_event(1));

    assert!(manager.complete(1, false).unwrap());

    assert!(manager.get_task(1).is_none());
    assert_eq!(spy.writes(), 0);
}

#[test]
fn at_most_one_task_per_event() {
    let (storage, _spy) = storage([event(1)]);
    let mut manager = TimerManager::new(storage);

    manager.get_or_create_task(1, TimerMode::Stopwatch, 0).unwrap();
    manager.get_or_create_task(1, TimerMode::Countdown, 30).unwrap();

    assert_eq!(manager.len(), 1);
    assert_eq!(manager.tasks().filter(|task| task.event_id == 1).count(), 1);
}

#[test]
fn completed_event_never_gets_a_task() {
    let (storage, _spy) = storage([completed_event(1)]);
    let mut manager = TimerManager::new(storage);

    let err = manager.get_or_create_task(1, TimerMode::Stopwatch, 0).unwrap_err();

    assert!(matches!(err, TimerError::InvalidState(_)));
    assert!(manager.is_empty());
}

#[test]
fn mode_switch_discards_progress() {
    let (storage, _spy) = storage([event(1)]);
    let mut manager = TimerManager::new(storage);
    manager.get_or_create_task(1, TimerMode::Stopwatch, 120).unwrap();
    manager.set_running(1, true);

    manager.change_mode(1, TimerMode::Countdown);

    let task = manager.get_task(1).unwrap();
    assert_eq!(task.mode, TimerMode::Countdown);
    assert_eq!(task.seconds, 0);
    assert!(!task.running);
}

#[test]
fn tick_stops_when_registry_empties_and_restarts_on_new_task() {
    let (storage, _spy) = storage([event(1), event(2)]);
    let mut manager = TimerManager::new(storage);

    manager.get_or_create_task(1, TimerMode::Stopwatch, 0).unwrap();
    manager.complete(1, false).unwrap();
    assert!(!manager.is_ticking());
    assert!(!manager.tick());

    manager.get_or_create_task(2, TimerMode::Stopwatch, 0).unwrap();
    assert!(manager.is_ticking());
    assert!(manager.tick());
}

#[test]
fn running_countdown_at_zero_completes_instead_of_going_negative() {
    let (storage, spy) = storage([event(1)]);
    let mut manager = TimerManager::new(storage);
    manager.get_or_create_task(1, TimerMode::Countdown, 0).unwrap();
    manager.set_running(1, true);

    manager.tick();

    assert!(manager.get_task(1).is_none());
    assert!(spy.event(1).unwrap().completed);
}

#[test]
fn failed_manual_completion_keeps_task() {
    let (storage, spy) = storage([event(1)]);
    let mut manager = TimerManager::new(storage);
    manager.get_or_create_task(1, TimerMode::Stopwatch, 42).unwrap();
    spy.fail_writes(true);

    let err = manager.complete(1, false).unwrap_err();

    assert!(matches!(err, TimerError::PersistenceFailure(_)));
    assert_eq!(manager.get_task(1).unwrap().seconds, 42);
    assert!(manager.is_ticking());

    spy.fail_writes(false);
    assert!(manager.complete(1, false).unwrap());
    assert!(spy.event(1).unwrap().completed);
}

#[test]
fn failed_auto_completion_pins_task_until_retried() {
    let (storage, spy) = storage([event(1), event(2)]);
    let mut manager = TimerManager::new(storage);
    let failures = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&failures);
    manager.set_on_completion_error(move |event_id, error| {
        assert_eq!(event_id, 1);
        assert!(matches!(error, TimerError::PersistenceFailure(_)));
        seen.fetch_add(1, Ordering::SeqCst);
    });

    manager.get_or_create_task(1, TimerMode::Countdown, 0).unwrap();
    manager.start_countdown(1, 1).unwrap();
    manager.get_or_create_task(2, TimerMode::Stopwatch, 0).unwrap();
    manager.set_running(2, true);
    spy.fail_writes(true);

    tick_n(&mut manager, 3);

    let pinned = manager.get_task(1).unwrap();
    assert_eq!(pinned.seconds, 0);
    assert!(!pinned.running);
    assert_eq!(failures.load(Ordering::SeqCst), 1);
    // Other timers keep going
    assert_eq!(manager.get_task(2).unwrap().seconds, 3);

    spy.fail_writes(false);
    assert!(manager.complete(1, false).unwrap());
    assert!(spy.event(1).unwrap().completed);
}

#[test]
fn countdown_expiry_is_written_to_the_event_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.db");
    let storage = SqliteStorage::open(&path).unwrap();
    storage
        .add_event(&EventRecord::new(1, "Write weekly report", "2026-02-18"))
        .unwrap();

    let mut manager = TimerManager::new(storage);
    manager.get_or_create_task(1, TimerMode::Countdown, 0).unwrap();
    manager.start_countdown(1, 2).unwrap();
    tick_n(&mut manager, 2);
    assert!(manager.get_task(1).is_none());
    drop(manager);

    let reopened = SqliteStorage::open(&path).unwrap();
    let stored = reopened.get_event(1).unwrap().unwrap();
    assert!(stored.completed);
    assert!(stored.end_time.is_some());
}
