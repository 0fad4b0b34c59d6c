//! Error types shared by every raffle crate.

use thiserror::Error;

/// Why a participant name was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The name is empty after trimming.
    #[error("name must not be empty")]
    Empty,

    /// The name's normalized key is already registered.
    #[error("name is already registered")]
    Duplicate,
}

/// Failure reported by a persistence adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A stored value could not be decoded.
    #[error("stored value for `{key}` could not be decoded: {message}")]
    Decode {
        /// The key whose value was unreadable.
        key: String,
        /// Decoder message.
        message: String,
    },

    /// The backing store failed to read or write.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Top-level raffle error type.
#[derive(Debug, Error)]
pub enum RaffleError {
    /// A participant name failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// An index did not address an entry of the pending list.
    #[error("index {index} is out of range for {len} pending names")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The length of the pending list at the time of the request.
        len: usize,
    },

    /// The participant list is locked because a draw has happened or is in flight.
    #[error("session is locked")]
    SessionLocked,

    /// The operation is not allowed while a draw is rolling.
    #[error("a draw is in progress")]
    DrawInProgress,

    /// Restart requested before anything was drawn.
    #[error("nothing has been drawn yet")]
    NothingDrawn,

    /// The session engine task is no longer running.
    #[error("session engine has stopped")]
    EngineStopped,

    /// A persistence failure surfaced to the caller.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
