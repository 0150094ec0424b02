//! Timekeeper - per-event stopwatch and countdown timers
//!
//! This is the main entry point for the timekeeper host application.

use tokio::net::TcpListener;
use tracing::info;

use timekeeper::{
    api::create_router,
    config::Config,
    state::AppState,
    storage::{MemoryStorage, SqliteStorage},
    tasks::spawn_timer_loop,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("timekeeper={},tower_http=info", config.log_level()))
        .init();

    info!("Starting timekeeper v{}", env!("CARGO_PKG_VERSION"));

    // The timer registry is created once here and owned by the timer loop
    let state = match &config.db {
        Some(path) => AppState::new(SqliteStorage::open(path)?),
        None => {
            info!("No database given, events are kept in memory");
            AppState::new(MemoryStorage::new())
        }
    };
    let (timers, timer_task) = spawn_timer_loop(state);

    let app = create_router(timers);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /events/:id/timer     - Open or refocus an event's timer window");
    info!("  GET    /windows/:id          - Render a timer window");
    info!("  POST   /windows/:id/toggle   - Start, resume or pause");
    info!("  POST   /windows/:id/mode     - Switch stopwatch/countdown");
    info!("  POST   /windows/:id/complete - Complete the event");
    info!("  DELETE /windows/:id          - Close a window, timing continues");
    info!("  GET    /timers               - List active timers");
    info!("  GET    /status               - Host status");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    timer_task.abort();
    info!("Server shutdown complete");
    Ok(())
}
