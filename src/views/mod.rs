//! Timer view controllers
//!
//! Controllers hold presentation state only; every change to a timer goes
//! through the [`TimerManager`](crate::timer::TimerManager) they are handed.

pub mod list;
pub mod window;

pub use list::{TimerListSnapshot, TimerListView, TimerRow};
pub use window::{CountdownInput, TimerWindow, WindowOpen, WindowView};
