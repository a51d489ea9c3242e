//! Room lifecycle for the Tandem server.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns one
//! [`tandem_game::Room`]. Commands arrive on a bounded channel and are
//! applied one at a time, so a join, move or leave is atomic against the
//! whole room.
//!
//! # Key types
//!
//! - [`RoomManager`]: the registry. Creates rooms on first join, tracks
//!   which connection is in which room, routes input to the right actor.
//! - [`RoomHandle`]: send commands to a running room actor.
//! - [`RoomConfig`]: mailbox size and empty-room eviction.

mod config;
mod error;
mod manager;
mod room;

pub use config::RoomConfig;
pub use error::RoomError;
pub use manager::RoomManager;
pub use room::{JoinAck, PlayerSender, RoomHandle, RoomInfo};
