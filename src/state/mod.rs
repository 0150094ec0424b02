//! Host state module
//!
//! This module contains the state owned by the timer loop, the commands it
//! accepts and the handle used to reach it.

pub mod app_state;
pub mod commands;
pub mod status;

// Re-export main types
pub use app_state::AppState;
pub use commands::{Command, TimerHandle, WindowOpened};
pub use status::{AppStatus, CompletionFailure};
