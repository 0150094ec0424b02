//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::TimerHandle;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(timers: TimerHandle) -> Router {
    Router::new()
        .route("/events/:event_id", get(event_handler))
        .route("/events/:event_id/timer", post(open_timer_handler))
        .route("/windows/:window_id", get(window_handler).delete(close_window_handler))
        .route("/windows/:window_id/toggle", post(toggle_window_handler))
        .route("/windows/:window_id/mode", post(mode_handler))
        .route("/windows/:window_id/complete", post(complete_window_handler))
        .route("/timers", get(timers_handler))
        .route("/timers/:event_id/toggle", post(toggle_timer_handler))
        .route("/timers/:event_id/complete", post(complete_timer_handler))
        .route("/timers/:event_id/open", post(open_from_list_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(timers)
}
