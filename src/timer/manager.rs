//! Timer registry and tick engine
//!
//! [`TimerManager`] is the single authority over timer tasks: it creates and
//! removes them, advances them once per tick, completes expired countdowns
//! and fans notifications out to observers. It is a plain synchronous value
//! owned by one logical thread; the async driver in
//! [`crate::tasks::timer_loop`] only calls [`TimerManager::tick`] while
//! [`TimerManager::is_ticking`] reports true.

use std::{collections::HashMap, fmt, time::Duration};

use chrono::Local;
use tracing::{debug, error, info, warn};

use super::task::{TimerMode, TimerTask, WindowId};
use crate::{
    error::{Result, TimerError},
    storage::{EventId, EventUpdate, Storage},
};

/// Period between two ticks; every running task moves by one second per tick
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Callback invoked after every tick and every task insertion or removal
pub type Observer = Box<dyn FnMut() -> anyhow::Result<()> + Send>;

/// Callback invoked after a completion has been persisted
pub type CompletionHook = Box<dyn FnMut() + Send>;

/// Callback invoked when a countdown expired but could not be persisted
pub type CompletionErrorHook = Box<dyn FnMut(EventId, &TimerError) + Send>;

/// Handle returned by [`TimerManager::register_observer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

pub struct TimerManager {
    storage: Box<dyn Storage>,
    tasks: HashMap<EventId, TimerTask>,
    observers: Vec<(ObserverId, Observer)>,
    next_observer_id: u64,
    /// Whether the periodic driver should be scheduled
    tick_active: bool,
    on_task_completed: Option<CompletionHook>,
    on_completion_error: Option<CompletionErrorHook>,
}

impl fmt::Debug for TimerManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerManager")
            .field("tasks", &self.tasks)
            .field("observers", &self.observers.len())
            .field("tick_active", &self.tick_active)
            .finish()
    }
}

impl TimerManager {
    /// Create an empty registry on top of the given event store
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            tasks: HashMap::new(),
            observers: Vec::new(),
            next_observer_id: 0,
            tick_active: false,
            on_task_completed: None,
            on_completion_error: None,
        }
    }

    /// Set the hook run after each successful completion
    pub fn set_on_task_completed(&mut self, hook: impl FnMut() + Send + 'static) {
        self.on_task_completed = Some(Box::new(hook));
    }

    /// Set the hook run when an expired countdown fails to persist
    pub fn set_on_completion_error(&mut self, hook: impl FnMut(EventId, &TimerError) + Send + 'static) {
        self.on_completion_error = Some(Box::new(hook));
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// Whether the tick driver should currently be scheduled
    pub fn is_ticking(&self) -> bool {
        self.tick_active
    }

    pub fn get_task(&self, event_id: EventId) -> Option<&TimerTask> {
        self.tasks.get(&event_id)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &TimerTask> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Return the task for `event_id`, creating a paused one if needed
    ///
    /// `mode` and `initial_seconds` only apply when a task is created.
    pub fn get_or_create_task(
        &mut self,
        event_id: EventId,
        mode: TimerMode,
        initial_seconds: u64,
    ) -> Result<&TimerTask> {
        if self.tasks.contains_key(&event_id) {
            return Ok(&self.tasks[&event_id]);
        }

        let event = self
            .storage
            .get_event(event_id)?
            .ok_or(TimerError::EventNotFound(event_id))?;
        if event.completed {
            return Err(TimerError::InvalidState(format!(
                "event {} is already completed",
                event_id
            )));
        }

        self.tasks
            .insert(event_id, TimerTask::new(event_id, mode, initial_seconds));
        info!("Created {:?} timer for event {}", mode, event_id);

        if !self.tick_active {
            self.tick_active = true;
            debug!("First timer registered, tick driver activated");
        }
        self.notify_observers();

        Ok(&self.tasks[&event_id])
    }

    /// Start or pause a task
    pub fn set_running(&mut self, event_id: EventId, running: bool) {
        if let Some(task) = self.tasks.get_mut(&event_id) {
            if task.running != running {
                task.running = running;
                debug!("Timer for event {} {}", event_id, task.status_label());
            }
        }
    }

    /// Flip a task between running and paused, returning the new state
    pub fn toggle_running(&mut self, event_id: EventId) -> Option<bool> {
        let running = !self.tasks.get(&event_id)?.running;
        self.set_running(event_id, running);
        Some(running)
    }

    /// Switch mode; always discards in-progress timing
    pub fn change_mode(&mut self, event_id: EventId, mode: TimerMode) {
        if let Some(task) = self.tasks.get_mut(&event_id) {
            task.reset_to(mode);
            debug!("Timer for event {} switched to {:?}", event_id, mode);
        }
    }

    /// Load `total_seconds` into an idle countdown and start it
    pub fn start_countdown(&mut self, event_id: EventId, total_seconds: u64) -> Result<()> {
        if total_seconds == 0 {
            return Err(TimerError::InvalidArgument(
                "countdown duration must be positive".to_string(),
            ));
        }

        let Some(task) = self.tasks.get_mut(&event_id) else {
            return Ok(());
        };
        if task.mode != TimerMode::Countdown {
            return Err(TimerError::InvalidState(format!(
                "timer for event {} is not in countdown mode",
                event_id
            )));
        }
        if task.seconds != 0 {
            return Err(TimerError::InvalidState(format!(
                "countdown for event {} already has {}s remaining",
                event_id, task.seconds
            )));
        }

        task.seconds = total_seconds;
        task.running = true;
        info!("Countdown of {}s started for event {}", total_seconds, event_id);
        Ok(())
    }

    /// Complete the event behind a task and drop the task
    ///
    /// Returns whether a task was removed. Completing an event without a
    /// task is a no-op. On a storage failure the task stays registered.
    pub fn complete(&mut self, event_id: EventId, auto: bool) -> Result<bool> {
        let removed = self.finalize(event_id, auto)?;
        if removed {
            self.notify_observers();
        }
        Ok(removed)
    }

    /// Advance all running tasks by one period
    ///
    /// Returns whether the driver should schedule another tick.
    pub fn tick(&mut self) -> bool {
        if self.tasks.is_empty() {
            self.tick_active = false;
            return false;
        }

        let mut expired: Vec<EventId> = self
            .tasks
            .values_mut()
            .filter_map(|task| task.advance().then_some(task.event_id))
            .collect();
        expired.sort_unstable();

        for event_id in expired {
            if let Err(e) = self.finalize(event_id, true) {
                error!("Failed to auto-complete event {}: {}", event_id, e);
                // Pin the task so it neither vanishes nor retriggers every tick
                if let Some(task) = self.tasks.get_mut(&event_id) {
                    task.running = false;
                    task.seconds = 0;
                }
                if let Some(hook) = self.on_completion_error.as_mut() {
                    hook(event_id, &e);
                }
            }
        }

        self.notify_observers();

        self.tick_active = !self.tasks.is_empty();
        if !self.tick_active {
            debug!("Last timer removed, tick driver deactivated");
        }
        self.tick_active
    }

    /// Register an observer and return a handle for unregistering it
    pub fn register_observer(
        &mut self,
        observer: impl FnMut() -> anyhow::Result<()> + Send + 'static,
    ) -> ObserverId {
        let id = ObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unregister_observer(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    /// Record that `window_id` is showing the task for `event_id`
    pub fn bind_window(&mut self, event_id: EventId, window_id: WindowId) -> Result<()> {
        let task = self.tasks.get_mut(&event_id).ok_or_else(|| {
            TimerError::InvalidState(format!("no timer exists for event {}", event_id))
        })?;

        match task.bound_window {
            Some(existing) if existing != window_id => Err(TimerError::InvalidState(format!(
                "timer for event {} is already shown in window {}",
                event_id, existing
            ))),
            _ => {
                task.bound_window = Some(window_id);
                Ok(())
            }
        }
    }

    /// Clear the window binding if it still points at `window_id`
    pub fn unbind_window(&mut self, event_id: EventId, window_id: WindowId) -> bool {
        match self.tasks.get_mut(&event_id) {
            Some(task) if task.bound_window == Some(window_id) => {
                task.bound_window = None;
                true
            }
            _ => false,
        }
    }

    fn finalize(&mut self, event_id: EventId, auto: bool) -> Result<bool> {
        if !self.tasks.contains_key(&event_id) {
            debug!("No timer for event {}, nothing to complete", event_id);
            return Ok(false);
        }

        self.persist_completion(event_id)?;

        self.tasks.remove(&event_id);
        info!(
            "Timer for event {} completed ({})",
            event_id,
            if auto { "countdown expired" } else { "manual" }
        );
        if self.tasks.is_empty() && self.tick_active {
            self.tick_active = false;
            debug!("Last timer removed, tick driver deactivated");
        }

        if let Some(hook) = self.on_task_completed.as_mut() {
            hook();
        }
        Ok(true)
    }

    fn persist_completion(&mut self, event_id: EventId) -> Result<()> {
        match self.storage.get_event(event_id)? {
            Some(event) if !event.completed => {
                let mut update = EventUpdate::completed();
                if event.end_time.as_deref().map_or(true, str::is_empty) {
                    update = update.with_end_time(wall_clock_hm());
                }
                self.storage.update_event(event_id, &update)?;
            }
            Some(_) => debug!("Event {} already completed, skipping write-back", event_id),
            None => warn!("Event {} no longer exists, dropping its timer", event_id),
        }
        Ok(())
    }

    fn notify_observers(&mut self) {
        for (id, observer) in self.observers.iter_mut() {
            if let Err(e) = observer() {
                warn!("Timer observer {:?} failed: {:#}", id, e);
            }
        }
    }
}

fn wall_clock_hm() -> String {
    Local::now().format("%H:%M").to_string()
}
