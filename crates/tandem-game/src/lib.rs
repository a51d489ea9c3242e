//! Authoritative game engine for Tandem rooms.
//!
//! Everything here is synchronous and owns its data; the room actor in
//! `tandem-room` wraps a [`Room`] and feeds it one command at a time.
//!
//! - [`generate_level`] builds a [`Level`]: ground, a staircase of random
//!   platforms, and a key and door placed on top of two of them.
//! - [`Room::apply_move`] runs one input sample through physics, pickups,
//!   door checks and the win/reset rule.
//! - [`Room::snapshot`] produces the full state clients render.
//!
//! ```rust
//! use tandem_game::{GameConfig, MoveInput, Room};
//! use tandem_protocol::PlayerId;
//!
//! let mut room = Room::new(GameConfig::default());
//! room.join(PlayerId(1), "Alice".into());
//! let out = room.apply_move(PlayerId(1), MoveInput { vx: 5.0, jump: false });
//! assert_eq!(out.len(), 1);
//! ```

mod config;
mod level;
mod physics;
mod room;
mod win;

pub use config::{DEFAULT_PALETTE, GameConfig};
pub use level::{Level, generate_level};
pub use physics::MoveInput;
pub use room::Room;

use tandem_protocol::{Recipient, ServerMessage};

/// Messages a room mutation wants delivered, in order.
pub type Outbound = Vec<(Recipient, ServerMessage)>;
