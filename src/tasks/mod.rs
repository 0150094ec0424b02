//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod timer_loop;

// Re-export main functions
pub use timer_loop::{spawn_timer_loop, timer_loop};
