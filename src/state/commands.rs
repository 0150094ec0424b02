//! Messages accepted by the timer loop and the handle that sends them

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};

use super::AppStatus;
use crate::{
    error::{Result, TimerError},
    storage::{EventId, EventRecord},
    timer::{TimerMode, WindowId},
    views::{CountdownInput, TimerListSnapshot, WindowView},
};

type Reply<T> = oneshot::Sender<T>;

/// Outcome of an open-timer request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowOpened {
    pub window_id: WindowId,
    pub event_id: EventId,
    /// True when an already open window was brought forward
    pub refocused: bool,
}

/// A user action routed to the loop that owns the timers
#[derive(Debug)]
pub enum Command {
    OpenTimer {
        event_id: EventId,
        reply: Reply<Result<WindowOpened>>,
    },
    ViewWindow {
        window_id: WindowId,
        reply: Reply<Option<WindowView>>,
    },
    ToggleWindow {
        window_id: WindowId,
        countdown: Option<CountdownInput>,
        reply: Reply<Result<Option<WindowView>>>,
    },
    ChangeMode {
        window_id: WindowId,
        mode: TimerMode,
        reply: Reply<Option<WindowView>>,
    },
    CompleteWindow {
        window_id: WindowId,
        reply: Reply<Result<bool>>,
    },
    CloseWindow {
        window_id: WindowId,
        reply: Reply<bool>,
    },
    ToggleTimer {
        event_id: EventId,
        reply: Reply<TimerListSnapshot>,
    },
    CompleteTimer {
        event_id: EventId,
        reply: Reply<Result<bool>>,
    },
    OpenFromList {
        event_id: EventId,
        reply: Reply<Result<Option<WindowOpened>>>,
    },
    GetEvent {
        event_id: EventId,
        reply: Reply<Result<Option<EventRecord>>>,
    },
    Status {
        reply: Reply<AppStatus>,
    },
}

/// Cloneable front door to the timer loop
#[derive(Debug, Clone)]
pub struct TimerHandle {
    tx: mpsc::Sender<Command>,
    list_rx: watch::Receiver<TimerListSnapshot>,
}

impl TimerHandle {
    pub fn new(tx: mpsc::Sender<Command>, list_rx: watch::Receiver<TimerListSnapshot>) -> Self {
        Self { tx, list_rx }
    }

    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| TimerError::Unavailable)?;
        rx.await.map_err(|_| TimerError::Unavailable)
    }

    /// Open the timer window for an event, or refocus its existing window
    pub async fn open_timer(&self, event_id: EventId) -> Result<WindowOpened> {
        self.request(|reply| Command::OpenTimer { event_id, reply }).await?
    }

    pub async fn window(&self, window_id: WindowId) -> Result<Option<WindowView>> {
        self.request(|reply| Command::ViewWindow { window_id, reply }).await
    }

    /// Start, resume or pause from a window, optionally updating its countdown input
    pub async fn toggle_window(
        &self,
        window_id: WindowId,
        countdown: Option<CountdownInput>,
    ) -> Result<Option<WindowView>> {
        self.request(|reply| Command::ToggleWindow {
            window_id,
            countdown,
            reply,
        })
        .await?
    }

    pub async fn change_mode(&self, window_id: WindowId, mode: TimerMode) -> Result<Option<WindowView>> {
        self.request(|reply| Command::ChangeMode {
            window_id,
            mode,
            reply,
        })
        .await
    }

    pub async fn complete_window(&self, window_id: WindowId) -> Result<bool> {
        self.request(|reply| Command::CompleteWindow { window_id, reply }).await?
    }

    pub async fn close_window(&self, window_id: WindowId) -> Result<bool> {
        self.request(|reply| Command::CloseWindow { window_id, reply }).await
    }

    /// Select a list row and pause or resume it
    pub async fn toggle_timer(&self, event_id: EventId) -> Result<TimerListSnapshot> {
        self.request(|reply| Command::ToggleTimer { event_id, reply }).await
    }

    /// Select a list row and complete it
    pub async fn complete_timer(&self, event_id: EventId) -> Result<bool> {
        self.request(|reply| Command::CompleteTimer { event_id, reply }).await?
    }

    /// Select a list row and open its window
    pub async fn open_from_list(&self, event_id: EventId) -> Result<Option<WindowOpened>> {
        self.request(|reply| Command::OpenFromList { event_id, reply }).await?
    }

    pub async fn event(&self, event_id: EventId) -> Result<Option<EventRecord>> {
        self.request(|reply| Command::GetEvent { event_id, reply }).await?
    }

    pub async fn status(&self) -> Result<AppStatus> {
        self.request(|reply| Command::Status { reply }).await
    }

    /// Latest rendering of the timer list
    pub fn timers(&self) -> TimerListSnapshot {
        self.list_rx.borrow().clone()
    }

    /// Watch the timer list; a new value is published after every refresh
    pub fn subscribe(&self) -> watch::Receiver<TimerListSnapshot> {
        self.list_rx.clone()
    }
}
