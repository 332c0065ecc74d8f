//! Room error types.

use thiserror::Error;

/// Result type for room operations.
pub type RoomResult<T> = Result<T, RoomError>;

/// Errors that can occur while managing rooms.
///
/// The Display strings double as the client-facing `error` payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// The code does not resolve to a live room.
    #[error("room not found")]
    RoomNotFound,

    /// The room already holds two members.
    #[error("room full")]
    RoomFull,

    /// A non-host attempted a host-only action.
    #[error("only the host can do that")]
    NotAuthorized,

    /// No unused room code could be found.
    #[error("no room codes available")]
    CapacityExhausted,
}
