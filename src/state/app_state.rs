//! Timer host state
//!
//! [`AppState`] owns the [`TimerManager`], every open window and the timer
//! list. It lives inside the timer loop task, so all of it is touched from a
//! single logical thread and needs no locking of its own.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Instant,
};

use chrono::Utc;
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

use super::{
    commands::{Command, WindowOpened},
    status::{format_uptime, AppStatus, CompletionFailure},
};
use crate::{
    error::{Result, TimerError},
    storage::{EventId, Storage},
    timer::{TimerManager, WindowId},
    views::{CountdownInput, TimerListSnapshot, TimerListView, TimerWindow, WindowOpen, WindowView},
};

#[derive(Debug)]
pub struct AppState {
    manager: TimerManager,
    windows: HashMap<WindowId, TimerWindow>,
    next_window_id: WindowId,
    list: TimerListView,
    /// Set by the manager observer, consumed when the list is re-rendered
    list_dirty: Arc<AtomicBool>,
    completions: Arc<AtomicU64>,
    failures: Arc<Mutex<Vec<CompletionFailure>>>,
    start_time: Instant,
    list_tx: watch::Sender<TimerListSnapshot>,
}

impl AppState {
    /// Create the host state around an event store
    pub fn new(storage: impl Storage + 'static) -> Self {
        let mut manager = TimerManager::new(storage);

        let list_dirty = Arc::new(AtomicBool::new(true));
        let dirty = Arc::clone(&list_dirty);
        manager.register_observer(move || {
            dirty.store(true, Ordering::Release);
            Ok(())
        });

        let completions = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&completions);
        manager.set_on_task_completed(move || {
            let total = counter.fetch_add(1, Ordering::AcqRel) + 1;
            debug!("Timer completed, daily list refresh requested ({} so far)", total);
        });

        let failures = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&failures);
        manager.set_on_completion_error(move |event_id, error| {
            warn!("Recording completion failure for event {}: {}", event_id, error);
            recorded
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(CompletionFailure {
                    event_id,
                    message: error.to_string(),
                    at: Utc::now(),
                });
        });

        let (list_tx, _) = watch::channel(TimerListSnapshot::default());

        Self {
            manager,
            windows: HashMap::new(),
            next_window_id: 1,
            list: TimerListView::default(),
            list_dirty,
            completions,
            failures,
            start_time: Instant::now(),
            list_tx,
        }
    }

    pub fn manager(&self) -> &TimerManager {
        &self.manager
    }

    pub fn is_ticking(&self) -> bool {
        self.manager.is_ticking()
    }

    /// Receiver for list snapshots
    pub fn subscribe(&self) -> watch::Receiver<TimerListSnapshot> {
        self.list_tx.subscribe()
    }

    /// Run one tick and re-render whatever it changed
    pub fn tick(&mut self) -> bool {
        let keep_ticking = self.manager.tick();
        self.sync();
        keep_ticking
    }

    /// Apply a command and answer it
    pub fn dispatch(&mut self, command: Command) {
        match command {
            Command::OpenTimer { event_id, reply } => {
                let opened = self.open_timer(event_id);
                self.respond(reply, opened);
            }
            Command::ViewWindow { window_id, reply } => {
                let view = self
                    .windows
                    .get(&window_id)
                    .and_then(|window| window.view(&self.manager));
                self.respond(reply, view);
            }
            Command::ToggleWindow {
                window_id,
                countdown,
                reply,
            } => {
                let view = self.toggle_window(window_id, countdown);
                self.respond(reply, view);
            }
            Command::ChangeMode {
                window_id,
                mode,
                reply,
            } => {
                let view = self.windows.get_mut(&window_id).and_then(|window| {
                    window.change_mode(&mut self.manager, mode);
                    window.view(&self.manager)
                });
                self.respond(reply, view);
            }
            Command::CompleteWindow { window_id, reply } => {
                let completed = self.complete_window(window_id);
                self.respond(reply, completed);
            }
            Command::CloseWindow { window_id, reply } => {
                let closed = match self.windows.remove(&window_id) {
                    Some(window) => {
                        window.close(&mut self.manager);
                        true
                    }
                    None => false,
                };
                self.respond(reply, closed);
            }
            Command::ToggleTimer { event_id, reply } => {
                if self.list.select(event_id) {
                    self.list.toggle_selected(&mut self.manager);
                }
                self.list_dirty.store(true, Ordering::Release);
                self.sync();
                let _ = reply.send(self.list.snapshot());
            }
            Command::CompleteTimer { event_id, reply } => {
                let completed = if self.list.select(event_id) {
                    self.list.complete_selected(&mut self.manager)
                } else {
                    Ok(false)
                };
                self.respond(reply, completed);
            }
            Command::OpenFromList { event_id, reply } => {
                let opened = if self.list.select(event_id) {
                    let Self {
                        list,
                        manager,
                        windows,
                        next_window_id,
                        ..
                    } = self;
                    list.open_selected(|id| open_window(manager, windows, next_window_id, id))
                        .transpose()
                } else {
                    Ok(None)
                };
                self.respond(reply, opened);
            }
            Command::GetEvent { event_id, reply } => {
                let event = self
                    .manager
                    .storage()
                    .get_event(event_id)
                    .map_err(TimerError::from);
                self.respond(reply, event);
            }
            Command::Status { reply } => {
                let status = self.status();
                self.respond(reply, status);
            }
        }
    }

    /// Publish the effects of a command before answering it
    fn respond<T>(&mut self, reply: oneshot::Sender<T>, value: T) {
        self.list_dirty.store(true, Ordering::Release);
        self.sync();
        let _ = reply.send(value);
    }

    /// Open a window for an event from outside the timer list
    pub fn open_timer(&mut self, event_id: EventId) -> Result<WindowOpened> {
        open_window(
            &mut self.manager,
            &mut self.windows,
            &mut self.next_window_id,
            event_id,
        )
    }

    fn toggle_window(
        &mut self,
        window_id: WindowId,
        countdown: Option<CountdownInput>,
    ) -> Result<Option<WindowView>> {
        let Some(window) = self.windows.get_mut(&window_id) else {
            return Ok(None);
        };
        if let Some(input) = countdown {
            window.set_countdown_input(input);
        }
        window.toggle_start_pause(&mut self.manager)?;
        Ok(window.view(&self.manager))
    }

    fn complete_window(&mut self, window_id: WindowId) -> Result<bool> {
        let Some(window) = self.windows.get(&window_id) else {
            return Ok(false);
        };
        let completed = window.complete(&mut self.manager)?;
        self.windows.remove(&window_id);
        Ok(completed)
    }

    /// Current host summary
    pub fn status(&self) -> AppStatus {
        AppStatus {
            active_timers: self.manager.len(),
            ticking: self.manager.is_ticking(),
            open_windows: self.windows.len(),
            completions: self.completions.load(Ordering::Acquire),
            uptime: format_uptime(self.start_time.elapsed().as_secs()),
            errors: self
                .failures
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }

    /// Drop state that refers to completed timers and publish the list
    fn sync(&mut self) {
        let manager = &self.manager;
        self.windows.retain(|window_id, window| {
            let alive = manager.get_task(window.event_id()).is_some();
            if !alive {
                info!("Closing window {}, event {} completed", window_id, window.event_id());
            }
            alive
        });

        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|failure| manager.get_task(failure.event_id).is_some());

        if self.list_dirty.swap(false, Ordering::AcqRel) {
            self.list.refresh(&self.manager);
            self.list_tx.send_replace(self.list.snapshot());
        }
    }
}

fn open_window(
    manager: &mut TimerManager,
    windows: &mut HashMap<WindowId, TimerWindow>,
    next_window_id: &mut WindowId,
    event_id: EventId,
) -> Result<WindowOpened> {
    let window_id = *next_window_id;
    match TimerWindow::open(manager, event_id, window_id)? {
        WindowOpen::Created(window) => {
            *next_window_id += 1;
            windows.insert(window_id, window);
            Ok(WindowOpened {
                window_id,
                event_id,
                refocused: false,
            })
        }
        WindowOpen::Refocused(existing) => Ok(WindowOpened {
            window_id: existing,
            event_id,
            refocused: true,
        }),
    }
}
