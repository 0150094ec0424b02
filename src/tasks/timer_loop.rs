//! Timer loop background task

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, info};

use crate::{
    state::{AppState, Command, TimerHandle},
    timer::TICK_PERIOD,
};

/// Pending commands before senders start waiting
const COMMAND_BUFFER: usize = 64;

/// Spawn the timer loop and return a handle for talking to it
pub fn spawn_timer_loop(state: AppState) -> (TimerHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let handle = TimerHandle::new(tx, state.subscribe());
    let task = tokio::spawn(timer_loop(state, rx));
    (handle, task)
}

/// Own the timer state, applying commands and ticking while timers exist
///
/// The tick branch is disabled whenever the registry is empty, so an idle
/// loop only wakes up for commands. Returns once every handle is dropped.
pub async fn timer_loop(mut state: AppState, mut commands: mpsc::Receiver<Command>) {
    info!("Starting timer loop");

    let mut ticker = interval(TICK_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticking = false;

    loop {
        let should_tick = state.is_ticking();
        if should_tick != ticking {
            if should_tick {
                // First tick lands one full period after the first timer appears
                ticker.reset();
                debug!("Tick driver started");
            } else {
                debug!("Tick driver stopped, no timers left");
            }
            ticking = should_tick;
        }

        tokio::select! {
            _ = ticker.tick(), if ticking => {
                state.tick();
            }

            command = commands.recv() => {
                match command {
                    Some(command) => state.dispatch(command),
                    None => {
                        info!("All timer handles dropped, stopping timer loop");
                        break;
                    }
                }
            }
        }
    }
}
