//! Room actor: an isolated Tokio task that owns one game room.
//!
//! The actor is the only code that touches its [`Room`]. Everything else
//! talks to it through a [`RoomHandle`], so the physics step for one move
//! never interleaves with a join, leave or another move in the same room.

use std::collections::HashMap;

use tandem_game::{GameConfig, MoveInput, Outbound, Room};
use tandem_protocol::{PlayerId, Recipient, RoomId, ServerMessage};
use tokio::sync::{mpsc, oneshot};

use crate::RoomError;

/// Channel sender for delivering outbound messages to a player's
/// connection handler. Unbounded: the actor never waits on a slow client.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// What a successful join tells the joiner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinAck {
    pub room: RoomId,
    pub nickname: String,
    pub color: String,
}

/// Room metadata for the registry and for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    /// Members in join order.
    pub players: Vec<PlayerId>,
    pub key_collected: bool,
    pub door_open: bool,
}

impl RoomInfo {
    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}

/// Commands sent to a room actor through its channel.
///
/// Variants carrying a `oneshot::Sender` expect a reply; the rest are
/// fire-and-forget.
pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        nickname: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<JoinAck, RoomError>>,
    },

    /// Replies with the number of players left.
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<usize, RoomError>>,
    },

    Move {
        player_id: PlayerId,
        input: MoveInput,
    },

    /// Forward an already-built message from one member to others.
    Relay {
        from: PlayerId,
        to: Recipient,
        msg: ServerMessage,
    },

    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },

    Shutdown,
}

/// Handle to a running room actor. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Adds a player. The actor sends `room_joined` to the joiner, then
    /// the full state to everyone, before replying.
    pub async fn join(
        &self,
        player_id: PlayerId,
        nickname: String,
        sender: PlayerSender,
    ) -> Result<JoinAck, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            player_id,
            nickname,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Removes a player and returns how many remain.
    pub async fn leave(&self, player_id: PlayerId) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Leave {
            player_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Queues one input sample (fire-and-forget).
    pub async fn send_move(
        &self,
        player_id: PlayerId,
        input: MoveInput,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Move { player_id, input }).await
    }

    /// Queues a signaling message for delivery inside the room.
    pub async fn relay(
        &self,
        from: PlayerId,
        to: Recipient,
        msg: ServerMessage,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Relay { from, to, msg }).await
    }

    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::GetInfo { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Tells the room to stop. Queued commands ahead of it still run.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender.send(cmd).await.map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.clone())
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    room: Room,
    /// Per-player outbound channels.
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Processes commands until shutdown or until every handle is gone.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player_id,
                    nickname,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player_id, nickname, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { player_id, reply } => {
                    let result = self.handle_leave(player_id);
                    let _ = reply.send(result);
                }
                RoomCommand::Move { player_id, input } => {
                    let msgs = self.room.apply_move(player_id, input);
                    if msgs.is_empty() {
                        tracing::debug!(
                            room_id = %self.room_id,
                            %player_id,
                            "move from non-member, ignoring"
                        );
                    }
                    self.dispatch(msgs);
                }
                RoomCommand::Relay { from, to, msg } => {
                    self.handle_relay(from, to, msg);
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room_id = %self.room_id, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        nickname: String,
        sender: PlayerSender,
    ) -> Result<JoinAck, RoomError> {
        if self.room.contains(player_id) {
            return Err(RoomError::AlreadyInRoom(player_id, self.room_id.clone()));
        }

        let color = self.room.join(player_id, nickname.clone());
        self.senders.insert(player_id, sender);
        tracing::info!(
            room_id = %self.room_id,
            %player_id,
            %nickname,
            players = self.room.len(),
            "player joined"
        );

        let ack = JoinAck {
            room: self.room_id.clone(),
            nickname,
            color,
        };
        self.send_to(
            player_id,
            ServerMessage::RoomJoined {
                room: ack.room.clone(),
                nickname: ack.nickname.clone(),
                color: ack.color.clone(),
            },
        );
        self.dispatch(vec![self.room.state_broadcast()]);
        Ok(ack)
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> Result<usize, RoomError> {
        if !self.room.contains(player_id) {
            return Err(RoomError::NotInRoom(player_id, self.room_id.clone()));
        }
        self.senders.remove(&player_id);
        let msgs = self.room.leave(player_id);

        tracing::info!(
            room_id = %self.room_id,
            %player_id,
            players = self.room.len(),
            "player left"
        );

        self.dispatch(msgs);
        Ok(self.room.len())
    }

    /// Signaling stays inside the room: the sender must be a member, and
    /// a direct message to someone elsewhere is dropped.
    fn handle_relay(&self, from: PlayerId, to: Recipient, msg: ServerMessage) {
        if !self.room.contains(from) {
            tracing::debug!(room_id = %self.room_id, %from, "relay from non-member, ignoring");
            return;
        }
        if let Recipient::Player(target) = to {
            if !self.room.contains(target) {
                tracing::debug!(
                    room_id = %self.room_id,
                    %from,
                    %target,
                    "relay target not in room, dropping"
                );
                return;
            }
        }
        self.dispatch(vec![(to, msg)]);
    }

    /// Dispatches outbound messages to the correct recipients, in join
    /// order for broadcasts.
    fn dispatch(&self, msgs: Outbound) {
        for (recipient, msg) in msgs {
            match recipient {
                Recipient::All => {
                    for player in self.room.players() {
                        self.send_to(player.id, msg.clone());
                    }
                }
                Recipient::Player(pid) => {
                    self.send_to(pid, msg);
                }
                Recipient::AllExcept(excluded) => {
                    for player in self.room.players() {
                        if player.id != excluded {
                            self.send_to(player.id, msg.clone());
                        }
                    }
                }
            }
        }
    }

    /// Sends to one player. Silently drops if their connection is gone;
    /// the disconnect path removes them shortly after.
    fn send_to(&self, player_id: PlayerId, msg: ServerMessage) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(msg);
        }
    }

    fn info(&self) -> RoomInfo {
        let level = self.room.level();
        RoomInfo {
            room_id: self.room_id.clone(),
            players: self.room.players().iter().map(|p| p.id).collect(),
            key_collected: level.key.collected,
            door_open: level.door.open,
        }
    }
}

/// Spawns a room actor with a freshly generated level and returns a
/// handle to it.
pub(crate) fn spawn_room(
    room_id: RoomId,
    game_config: GameConfig,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        room_id: room_id.clone(),
        room: Room::new(game_config),
        senders: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
