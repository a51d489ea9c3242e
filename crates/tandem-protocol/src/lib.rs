//! Wire protocol for the Tandem server.
//!
//! This crate defines the "language" that browser clients and the server
//! speak:
//!
//! - **Identity** ([`PlayerId`], [`RoomId`]) and routing ([`Recipient`]).
//! - **World data** ([`Platform`], [`Key`], [`Door`], [`PlayerState`],
//!   [`GameSnapshot`]): the plain data the game engine owns and the
//!   broadcaster ships verbatim.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]): every event
//!   that crosses the socket, as internally tagged JSON.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes ⇄ messages.
//!
//! The protocol layer doesn't know about connections or rooms; it only
//! knows how to describe and serialize them.
//!
//! ```text
//! Transport (bytes) → Protocol (messages) → Room (game state)
//! ```

mod codec;
mod error;
mod messages;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use messages::{ClientMessage, ServerMessage};
pub use types::{
    Door, GameSnapshot, Key, Platform, PlayerId, PlayerState, Recipient,
    RoomId,
};
