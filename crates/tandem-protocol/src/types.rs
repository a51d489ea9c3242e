//! Core protocol types: identities, routing, and world data.
//!
//! Everything here travels "on the wire" inside a [`ServerMessage`] or is
//! used to decide where one goes. The game engine stores the world data
//! types directly, so a snapshot is a plain clone with no translation.
//!
//! [`ServerMessage`]: crate::ServerMessage

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Players have no account: the id is the id of the connection they play
/// on, so it is unique per connection and dies with it.
///
/// `#[serde(transparent)]` makes `PlayerId(42)` serialize as plain `42`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A room identifier: an opaque string chosen by the client, or
/// generated by the server when the client leaves it blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Number of random bytes behind a generated id (8 hex characters).
    const GENERATED_BYTES: usize = 4;

    /// Generates a fresh id: 4 random bytes rendered as 8 lowercase hex
    /// characters. `rand::rng()` is a CSPRNG seeded from the OS.
    pub fn generate() -> Self {
        let bytes: [u8; Self::GENERATED_BYTES] = rand::rng().random();
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Interprets the room field of a join request.
    ///
    /// Returns `None` when the client left it absent or blank, meaning
    /// the server should pick an id.
    pub fn from_client(raw: Option<&str>) -> Option<Self> {
        let trimmed = raw?.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Borrows the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Specifies which members of a room receive a server message.
///
/// Engine operations return `(Recipient, ServerMessage)` pairs and the room
/// actor delivers them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Every player in the room.
    All,

    /// One specific player.
    Player(PlayerId),

    /// Everyone except the specified player (e.g. a signaling offer
    /// goes to every peer but its author).
    AllExcept(PlayerId),
}

// ---------------------------------------------------------------------------
// World data
// ---------------------------------------------------------------------------

/// An axis-aligned platform. `(x, y)` is the top-left corner and `y` grows
/// downward, so a platform's walkable surface is at `y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Platform {
    /// The x coordinate of the right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// The level's key. Picking it up opens the door.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    pub x: f64,
    pub y: f64,
    pub collected: bool,
    /// Who picked the key up. Set once per level, cleared only when a new
    /// level is generated.
    pub collected_by: Option<PlayerId>,
}

impl Key {
    /// An uncollected key with its top-left corner at `(x, y)`.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            collected: false,
            collected_by: None,
        }
    }
}

/// The level's exit door. Closed until the key is collected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub x: f64,
    pub y: f64,
    pub open: bool,
}

impl Door {
    /// A closed door with its top-left corner at `(x, y)`.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, open: false }
    }
}

/// One player's full kinematic and cosmetic state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub nickname: String,
    /// CSS color string assigned from the palette at join time.
    pub color: String,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub on_ground: bool,
}

/// The full room state sent to every member after each mutation.
///
/// `key_collected` and `door_open` duplicate `key.collected` and
/// `door.open`; clients read the top-level flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Players in join order.
    pub players: Vec<PlayerState>,
    pub key: Key,
    pub door: Door,
    pub platforms: Vec<Platform>,
    pub key_collected: bool,
    pub door_open: bool,
}
