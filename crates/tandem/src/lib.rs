//! # Tandem
//!
//! Authoritative server for a browser co-op platformer. Players join a
//! room, run and jump across a generated level, pick up the key and reach
//! the door together. The server owns the simulation; clients send input
//! samples and render the `game_state` snapshots they get back.
//!
//! ```text
//! tandem-transport (bytes) → tandem-protocol (messages)
//!     → tandem-room (registry + one actor per room) → tandem-game (rules)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tandem::prelude::*;
//!
//! # async fn start() -> Result<(), TandemError> {
//! let server = TandemServer::builder()
//!     .config(ServerConfig::from_env())
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{DEFAULT_PORT, ServerConfig};
pub use error::TandemError;
pub use server::{TandemServer, TandemServerBuilder};

/// The types most users need, in one import.
pub mod prelude {
    pub use crate::{ServerConfig, TandemError, TandemServer, TandemServerBuilder};
    pub use tandem_game::GameConfig;
    pub use tandem_protocol::{ClientMessage, GameSnapshot, PlayerId, RoomId, ServerMessage};
    pub use tandem_room::RoomConfig;
}
