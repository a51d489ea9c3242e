//! Room registry: creates rooms, tracks membership, routes input.

use std::collections::HashMap;

use tandem_game::{GameConfig, MoveInput};
use tandem_protocol::{PlayerId, Recipient, RoomId, ServerMessage};

use crate::room::spawn_room;
use crate::{JoinAck, PlayerSender, RoomConfig, RoomError, RoomHandle, RoomInfo};

/// Manages all live rooms and tracks which player is in which room.
///
/// This is the entry point for room operations from the connection
/// handlers. The server keeps it behind a mutex; each method holds that
/// lock only for the map work and one round trip to the room actor.
pub struct RoomManager {
    config: RoomConfig,
    game_config: GameConfig,

    /// Live rooms, keyed by room ID.
    rooms: HashMap<RoomId, RoomHandle>,

    /// Maps each player to the room they're currently in.
    /// A player is in at most one room at a time.
    player_rooms: HashMap<PlayerId, RoomId>,
}

impl RoomManager {
    /// Creates an empty registry. New rooms use `game_config`.
    pub fn new(config: RoomConfig, game_config: GameConfig) -> Self {
        Self {
            config: config.validated(),
            game_config: game_config.validated(),
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
        }
    }

    /// Puts a player into a room, creating the room on first use.
    ///
    /// A blank or missing `requested` id gets a fresh random id that no
    /// live room uses. The joiner receives `room_joined` followed by the
    /// room's full state; everyone else gets the state.
    pub async fn join(
        &mut self,
        requested: Option<&str>,
        nickname: String,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<JoinAck, RoomError> {
        if let Some(current) = self.player_rooms.get(&player_id) {
            return Err(RoomError::AlreadyInRoom(player_id, current.clone()));
        }

        let room_id = match RoomId::from_client(requested) {
            Some(id) => id,
            None => self.fresh_room_id(),
        };
        let handle = self.room_or_create(room_id);

        let ack = handle.join(player_id, nickname, sender).await?;
        self.player_rooms.insert(player_id, ack.room.clone());
        Ok(ack)
    }

    /// Removes a player from whatever room they are in and returns that
    /// room's id.
    ///
    /// With [`RoomConfig::evict_when_empty`] set, a room left empty is
    /// shut down and forgotten.
    pub async fn leave(&mut self, player_id: PlayerId) -> Result<RoomId, RoomError> {
        let room_id = self
            .player_rooms
            .remove(&player_id)
            .ok_or(RoomError::NotInAnyRoom(player_id))?;

        let handle = self
            .rooms
            .get(&room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        let remaining = handle.leave(player_id).await?;

        if remaining == 0 && self.config.evict_when_empty {
            self.destroy_room(&room_id).await?;
        }
        Ok(room_id)
    }

    /// Forwards one input sample to the player's room.
    ///
    /// `room` is the id the client put in its move event; it has to match
    /// the room the player actually joined.
    pub async fn route_move(
        &self,
        player_id: PlayerId,
        room: &str,
        input: MoveInput,
    ) -> Result<(), RoomError> {
        let room_id = self
            .player_rooms
            .get(&player_id)
            .ok_or(RoomError::NotInAnyRoom(player_id))?;
        if room_id.as_str() != room.trim() {
            return Err(RoomError::NotInRoom(player_id, RoomId::from(room)));
        }

        self.handle(room_id)?.send_move(player_id, input).await
    }

    /// Delivers a signaling message inside the sender's room.
    pub async fn relay(
        &self,
        from: PlayerId,
        to: Recipient,
        msg: ServerMessage,
    ) -> Result<(), RoomError> {
        let room_id = self
            .player_rooms
            .get(&from)
            .ok_or(RoomError::NotInAnyRoom(from))?;

        self.handle(room_id)?.relay(from, to, msg).await
    }

    /// Returns info about a specific room.
    pub async fn get_room_info(&self, room_id: &RoomId) -> Result<RoomInfo, RoomError> {
        self.handle(room_id)?.get_info().await
    }

    /// Shuts down a room and drops all its players from the index.
    pub async fn destroy_room(&mut self, room_id: &RoomId) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .remove(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        let _ = handle.shutdown().await;
        self.player_rooms.retain(|_, rid| rid != room_id);

        tracing::info!(%room_id, "room destroyed");
        Ok(())
    }

    /// Returns the room a player is currently in, if any.
    pub fn player_room(&self, player_id: &PlayerId) -> Option<&RoomId> {
        self.player_rooms.get(player_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().cloned().collect()
    }

    fn handle(&self, room_id: &RoomId) -> Result<&RoomHandle, RoomError> {
        self.rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    fn room_or_create(&mut self, room_id: RoomId) -> &RoomHandle {
        let config = &self.config;
        let game_config = &self.game_config;
        self.rooms.entry(room_id).or_insert_with_key(|room_id| {
            tracing::info!(%room_id, "room created");
            spawn_room(room_id.clone(), game_config.clone(), config.channel_size)
        })
    }

    /// A random id no live room uses. Collisions are rare (32 bits), so
    /// this almost always loops once.
    fn fresh_room_id(&self) -> RoomId {
        loop {
            let id = RoomId::generate();
            if !self.rooms.contains_key(&id) {
                return id;
            }
        }
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new(RoomConfig::default(), GameConfig::default())
    }
}
