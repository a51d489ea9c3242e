//! The authoritative state of one room.
//!
//! [`Room`] is plain synchronous data plus the rules that mutate it. It
//! knows nothing about channels or sockets: every mutating call returns an
//! [`Outbound`] list of `(Recipient, ServerMessage)` pairs and the owner
//! (the room actor) delivers them.

use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tandem_protocol::{GameSnapshot, PlayerId, PlayerState, Recipient, ServerMessage};
use tracing::{debug, info};

use crate::physics::{self, MoveInput};
use crate::{GameConfig, Level, Outbound, generate_level, win};

/// One room: players in join order, the current level, and who is
/// standing in the open door.
#[derive(Debug)]
pub struct Room {
    config: GameConfig,
    players: Vec<PlayerState>,
    level: Level,
    at_door: HashSet<PlayerId>,
    rng: StdRng,
}

impl Room {
    /// Creates a room with a freshly generated level.
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Creates a room whose level generation draws from `rng`.
    /// Seeded rngs make levels (and resets) reproducible.
    pub fn with_rng(config: GameConfig, mut rng: StdRng) -> Self {
        let config = config.validated();
        let level = generate_level(&config, &mut rng);
        Self {
            config,
            players: Vec::new(),
            level,
            at_door: HashSet::new(),
            rng,
        }
    }

    /// Creates a room around a hand-built level. Later resets still
    /// generate levels from `rng`.
    pub fn with_level(config: GameConfig, level: Level, rng: StdRng) -> Self {
        Self {
            config: config.validated(),
            players: Vec::new(),
            level,
            at_door: HashSet::new(),
            rng,
        }
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Adds a player at the next spawn slot and returns their color.
    ///
    /// Color and spawn x both depend on how many players are in the room
    /// right now, so colors repeat once people leave and rejoin. Joining
    /// twice with the same id keeps the existing player.
    pub fn join(&mut self, id: PlayerId, nickname: String) -> String {
        if let Some(existing) = self.player(id) {
            debug!(%id, "player already in room");
            return existing.color.clone();
        }

        let slot = self.players.len();
        let color = self.config.color_for(slot).to_owned();
        let player = physics::spawn(id, nickname, color.clone(), slot, &self.config);
        debug!(%id, slot, %color, "player spawned");
        self.players.push(player);
        color
    }

    /// Removes a player. Returns the state broadcast for the remaining
    /// players, or nothing if `id` was not here.
    pub fn leave(&mut self, id: PlayerId) -> Outbound {
        let Some(index) = self.index_of(id) else {
            debug!(%id, "leave for unknown player");
            return Vec::new();
        };
        self.players.remove(index);
        self.at_door.remove(&id);
        debug!(%id, remaining = self.players.len(), "player removed");
        vec![self.state_broadcast()]
    }

    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Runs one input sample for `id` through the physics step.
    ///
    /// Order: integrate, land on players, land on platforms, clamp, key,
    /// door, win check. A winning move emits [`ServerMessage::Win`] and
    /// resets the level before the state broadcast, so clients see `win`
    /// followed by the new level. Every other move ends in a state
    /// broadcast too. Unknown players produce nothing.
    ///
    /// Landing on another player may move this player by that player's
    /// `vx`; only the mover's own entry is written.
    pub fn apply_move(&mut self, id: PlayerId, input: MoveInput) -> Outbound {
        let Some(index) = self.index_of(id) else {
            debug!(%id, "move for unknown player");
            return Vec::new();
        };
        let config = &self.config;

        let prev_y = physics::integrate(&mut self.players[index], input, config);
        let stacked = physics::land_on_players(&mut self.players, index, prev_y, config);

        // A stacked player has vy = 0, so its previous-position estimate is
        // where it now stands.
        let player = &mut self.players[index];
        let prev_y = if stacked { player.y } else { prev_y };
        physics::land_on_platforms(player, prev_y, &self.level.platforms, config);
        physics::clamp_to_playfield(player, config);

        let level = &mut self.level;
        if physics::try_collect_key(player, &mut level.key, &mut level.door, config) {
            info!(%id, "key collected, door open");
        }

        if physics::reaches_door(player, &level.door, config) {
            self.at_door.insert(id);
        } else {
            self.at_door.remove(&id);
        }

        let mut out = Vec::with_capacity(2);
        if win::is_won(self.level.door.open, &self.players, &self.at_door) {
            info!(players = self.players.len(), "level cleared");
            out.push((Recipient::All, ServerMessage::Win));
            win::reset(&self.config, &mut self.rng, &mut self.level, &mut self.at_door);
        }
        out.push(self.state_broadcast());
        out
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// A full copy of the room as clients see it.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            players: self.players.clone(),
            key: self.level.key.clone(),
            door: self.level.door,
            platforms: self.level.platforms.clone(),
            key_collected: self.level.key.collected,
            door_open: self.level.door.open,
        }
    }

    /// The snapshot addressed to everyone in the room.
    pub fn state_broadcast(&self) -> (Recipient, ServerMessage) {
        (Recipient::All, ServerMessage::GameState(self.snapshot()))
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn contains(&self, id: PlayerId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Players in join order.
    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn at_door(&self) -> &HashSet<PlayerId> {
        &self.at_door
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    fn index_of(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    #[cfg(test)]
    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|p| p.id == id)
    }
}
