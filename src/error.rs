//! Error types for the timer core and its storage collaborator.

use crate::storage::EventId;

/// Failures reported by a [`Storage`](crate::storage::Storage) backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The database rejected a query or could not be opened.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The database directory could not be created.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the timer manager and its controllers.
#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    /// Storage has no record for the event.
    #[error("event {0} not found")]
    EventNotFound(EventId),

    /// The operation is not allowed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A caller-supplied value is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Completion could not be written back to storage.
    #[error("persistence failure: {0}")]
    PersistenceFailure(#[from] StorageError),

    /// The timer loop is no longer accepting commands.
    #[error("timer service is not running")]
    Unavailable,
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, TimerError>;
