//! Timekeeper - per-event stopwatch and countdown timers
//!
//! This library keeps one timer per planner event, advances all of them from
//! a single shared tick, completes events when their countdown runs out and
//! notifies the views that display them.

pub mod api;
pub mod config;
pub mod error;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod timer;
pub mod utils;
pub mod views;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{StorageError, TimerError};
pub use state::{AppState, TimerHandle};
pub use tasks::spawn_timer_loop;
pub use timer::{TimerManager, TimerMode, TimerTask};
pub use utils::signals::shutdown_signal;
