//! API response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{error::TimerError, timer::TimerMode};

/// API response structure for action endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
        }
    }

    /// The action changed something
    pub fn completed(message: String) -> Self {
        Self::new("completed".to_string(), message)
    }

    /// The action was a no-op
    pub fn unchanged(message: String) -> Self {
        Self::new("unchanged".to_string(), message)
    }

    /// Create an error response
    pub fn error(message: String) -> Self {
        Self::new("error".to_string(), message)
    }
}

/// Body of `POST /windows/:window_id/mode`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModeRequest {
    pub mode: TimerMode,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error returned by handlers
#[derive(Debug)]
pub enum ApiError {
    /// The addressed window or event does not exist
    NotFound(String),
    /// The request body could not be decoded
    InvalidBody(String),
    Timer(TimerError),
}

impl From<TimerError> for ApiError {
    fn from(error: TimerError) -> Self {
        Self::Timer(error)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Timer(TimerError::EventNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Timer(TimerError::InvalidState(_)) => StatusCode::CONFLICT,
            Self::Timer(TimerError::InvalidArgument(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Timer(TimerError::PersistenceFailure(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timer(TimerError::Unavailable) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            Self::NotFound(what) => format!("{} not found", what),
            Self::InvalidBody(reason) => format!("invalid request body: {}", reason),
            Self::Timer(e) => e.to_string(),
        };

        if status.is_server_error() {
            error!("Request failed: {}", message);
        } else {
            warn!("Request rejected: {}", message);
        }

        (status, Json(ApiResponse::error(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;

    #[test]
    fn timer_errors_map_to_status_codes() {
        let cases = [
            (TimerError::EventNotFound(1), StatusCode::NOT_FOUND),
            (TimerError::InvalidState("done".into()), StatusCode::CONFLICT),
            (TimerError::InvalidArgument("zero".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (
                TimerError::PersistenceFailure(StorageError::Unavailable("locked".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (TimerError::Unavailable, StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status_code(), expected);
        }
    }

    #[test]
    fn undecodable_body_is_a_bad_request() {
        let error = ApiError::InvalidBody("expected u32".into());

        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }
}
