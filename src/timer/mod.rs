//! Timer core
//!
//! Per-event timer tasks and the registry that drives them.

pub mod manager;
pub mod task;

// Re-export main types
pub use manager::{ObserverId, TimerManager, TICK_PERIOD};
pub use task::{format_hms, TimerMode, TimerTask, WindowId};
