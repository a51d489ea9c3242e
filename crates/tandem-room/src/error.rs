//! Error types for the room layer.

use tandem_protocol::{PlayerId, RoomId};

/// Errors that can occur during room operations.
///
/// None of these reach clients; the connection handler logs them and
/// carries on.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The connection is already playing in a room.
    #[error("player {0} already in room {1}")]
    AlreadyInRoom(PlayerId, RoomId),

    /// The connection is not a member of this room.
    #[error("player {0} not in room {1}")]
    NotInRoom(PlayerId, RoomId),

    /// The connection has not joined any room.
    #[error("player {0} is not in any room")]
    NotInAnyRoom(PlayerId),

    /// The room's command channel is closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
