//! HTTP endpoint handlers

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::info;

use super::responses::{ApiError, ApiResponse, HealthResponse, ModeRequest};
use crate::{
    state::{AppStatus, TimerHandle, WindowOpened},
    storage::{EventId, EventRecord},
    timer::WindowId,
    views::{CountdownInput, TimerListSnapshot, WindowView},
};

type ApiResult<T> = Result<Json<T>, ApiError>;

fn window_not_found(window_id: WindowId) -> ApiError {
    ApiError::NotFound(format!("window {}", window_id))
}

/// An empty body keeps the window's current countdown input
fn countdown_input(body: &[u8]) -> Result<Option<CountdownInput>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| ApiError::InvalidBody(e.to_string()))
}

/// Handle POST /events/:event_id/timer - Open or refocus the event's timer window
pub async fn open_timer_handler(
    State(timers): State<TimerHandle>,
    Path(event_id): Path<EventId>,
) -> ApiResult<WindowOpened> {
    let opened = timers.open_timer(event_id).await?;
    info!(
        "Timer window {} {} for event {}",
        opened.window_id,
        if opened.refocused { "refocused" } else { "opened" },
        event_id
    );
    Ok(Json(opened))
}

/// Handle GET /events/:event_id - Return the stored event
pub async fn event_handler(
    State(timers): State<TimerHandle>,
    Path(event_id): Path<EventId>,
) -> ApiResult<EventRecord> {
    timers
        .event(event_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("event {}", event_id)))
}

/// Handle GET /windows/:window_id - Render a timer window
pub async fn window_handler(
    State(timers): State<TimerHandle>,
    Path(window_id): Path<WindowId>,
) -> ApiResult<WindowView> {
    timers
        .window(window_id)
        .await?
        .map(Json)
        .ok_or_else(|| window_not_found(window_id))
}

/// Handle POST /windows/:window_id/toggle - Start, resume or pause
pub async fn toggle_window_handler(
    State(timers): State<TimerHandle>,
    Path(window_id): Path<WindowId>,
    body: Bytes,
) -> ApiResult<WindowView> {
    let countdown = countdown_input(&body)?;
    timers
        .toggle_window(window_id, countdown)
        .await?
        .map(Json)
        .ok_or_else(|| window_not_found(window_id))
}

/// Handle POST /windows/:window_id/mode - Switch between stopwatch and countdown
pub async fn mode_handler(
    State(timers): State<TimerHandle>,
    Path(window_id): Path<WindowId>,
    Json(request): Json<ModeRequest>,
) -> ApiResult<WindowView> {
    timers
        .change_mode(window_id, request.mode)
        .await?
        .map(Json)
        .ok_or_else(|| window_not_found(window_id))
}

/// Handle POST /windows/:window_id/complete - Complete the event and close the window
pub async fn complete_window_handler(
    State(timers): State<TimerHandle>,
    Path(window_id): Path<WindowId>,
) -> ApiResult<ApiResponse> {
    if timers.complete_window(window_id).await? {
        info!("Window {} completed its event", window_id);
        Ok(Json(ApiResponse::completed(format!(
            "Event for window {} completed",
            window_id
        ))))
    } else {
        Err(window_not_found(window_id))
    }
}

/// Handle DELETE /windows/:window_id - Close a window, timing continues
pub async fn close_window_handler(
    State(timers): State<TimerHandle>,
    Path(window_id): Path<WindowId>,
) -> Result<StatusCode, ApiError> {
    if timers.close_window(window_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(window_not_found(window_id))
    }
}

/// Handle GET /timers - Return the timer list
pub async fn timers_handler(State(timers): State<TimerHandle>) -> Json<TimerListSnapshot> {
    Json(timers.timers())
}

/// Handle POST /timers/:event_id/toggle - Pause or resume a listed timer
pub async fn toggle_timer_handler(
    State(timers): State<TimerHandle>,
    Path(event_id): Path<EventId>,
) -> ApiResult<TimerListSnapshot> {
    Ok(Json(timers.toggle_timer(event_id).await?))
}

/// Handle POST /timers/:event_id/complete - Complete a listed timer
pub async fn complete_timer_handler(
    State(timers): State<TimerHandle>,
    Path(event_id): Path<EventId>,
) -> ApiResult<ApiResponse> {
    let response = if timers.complete_timer(event_id).await? {
        ApiResponse::completed(format!("Event {} completed", event_id))
    } else {
        ApiResponse::unchanged(format!("No running timer for event {}", event_id))
    };
    Ok(Json(response))
}

/// Handle POST /timers/:event_id/open - Open the window of a listed timer
pub async fn open_from_list_handler(
    State(timers): State<TimerHandle>,
    Path(event_id): Path<EventId>,
) -> ApiResult<WindowOpened> {
    timers
        .open_from_list(event_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("timer for event {}", event_id)))
}

/// Handle GET /status - Return host status
pub async fn status_handler(State(timers): State<TimerHandle>) -> ApiResult<AppStatus> {
    Ok(Json(timers.status().await?))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
