//! Per-connection handler: decode client events and route them.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The connection id doubles as the player id. The task waits on four
//! things at once:
//!   1. inbound frames from the socket → decoded and dispatched
//!   2. outbound messages from the player's room → encoded and written
//!   3. the ping timer → a WebSocket ping the browser answers by itself
//!   4. the idle deadline → connection closed
//!
//! Every inbound message or pong pushes the idle deadline back.
//!
//! Client mistakes (bad JSON, unknown room, moving in someone else's
//! room) are logged and ignored; the client never gets an error back.

use std::sync::Arc;
use std::time::Instant;

use tandem_game::MoveInput;
use tandem_protocol::{ClientMessage, Codec, PlayerId, Recipient, ServerMessage};
use tandem_room::{PlayerSender, RoomError};
use tandem_transport::{Connection, Inbound, WebSocketConnection};
use tokio::sync::mpsc;

use crate::TandemError;
use crate::server::ServerState;

/// Drop guard that removes the player from their room when the handler
/// exits, however it exits.
///
/// `Drop` is synchronous, so the async leave runs on a spawned task.
struct DisconnectGuard<C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for DisconnectGuard<C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut rooms = state.rooms.lock().await;
            match rooms.leave(player_id).await {
                Ok(room_id) => tracing::info!(%player_id, %room_id, "player left on disconnect"),
                Err(RoomError::NotInAnyRoom(_)) => {}
                Err(e) => tracing::debug!(%player_id, error = %e, "leave on disconnect failed"),
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), TandemError> {
    let conn_id = conn.id();
    let player_id = PlayerId(conn_id.into_inner());
    tracing::debug!(%conn_id, %player_id, peer = %conn.peer_addr(), "handling new connection");

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let _guard = DisconnectGuard {
        player_id,
        state: Arc::clone(&state),
    };

    let start = Instant::now();
    let idle = tokio::time::sleep(state.idle_timeout);
    tokio::pin!(idle);
    let mut ping = tokio::time::interval_at(
        tokio::time::Instant::now() + state.ping_interval,
        state.ping_interval,
    );
    ping.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            inbound = conn.recv() => {
                let inbound = match inbound {
                    Ok(Some(inbound)) => inbound,
                    Ok(None) => {
                        tracing::info!(%player_id, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "recv error");
                        break;
                    }
                };
                idle.as_mut().reset(tokio::time::Instant::now() + state.idle_timeout);

                let Inbound::Message(data) = inbound else {
                    continue;
                };
                match state.codec.decode::<ClientMessage>(&data) {
                    Ok(msg) => handle_client_message(&state, player_id, msg, &tx, start).await,
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "failed to decode client message");
                    }
                }
            }

            Some(msg) = rx.recv() => {
                let bytes = state.codec.encode(&msg)?;
                conn.send(&bytes).await?;
            }

            _ = ping.tick() => {
                conn.ping().await?;
            }

            () = &mut idle => {
                tracing::info!(%player_id, "connection timed out");
                let _ = conn.close().await;
                break;
            }
        }
    }

    // _guard drops here → player leaves their room.
    Ok(())
}

/// Applies one decoded client event. Failures are the client's fault and
/// only logged.
async fn handle_client_message<C: Codec>(
    state: &ServerState<C>,
    player_id: PlayerId,
    msg: ClientMessage,
    tx: &PlayerSender,
    start: Instant,
) {
    let result = match msg {
        ClientMessage::JoinRoom { nickname, room } => {
            let mut rooms = state.rooms.lock().await;
            rooms
                .join(room.as_deref(), nickname, player_id, tx.clone())
                .await
                .map(|ack| {
                    tracing::info!(%player_id, room_id = %ack.room, nickname = %ack.nickname, "joined room");
                })
        }

        ClientMessage::Move { room, vx, jump } => {
            state
                .rooms
                .lock()
                .await
                .route_move(player_id, &room, MoveInput { vx, jump })
                .await
        }

        ClientMessage::WebrtcOffer { offer } => {
            let msg = ServerMessage::WebrtcOffer {
                from: player_id,
                offer,
            };
            relay(state, player_id, Recipient::AllExcept(player_id), msg).await
        }

        ClientMessage::WebrtcAnswer { to, answer } => {
            let msg = ServerMessage::WebrtcAnswer {
                from: player_id,
                answer,
            };
            relay(state, player_id, Recipient::Player(to), msg).await
        }

        ClientMessage::WebrtcIceCandidate { to, candidate } => {
            let msg = ServerMessage::WebrtcIceCandidate {
                from: player_id,
                candidate,
            };
            relay(state, player_id, Recipient::Player(to), msg).await
        }

        ClientMessage::Heartbeat { client_time } => {
            let _ = tx.send(ServerMessage::HeartbeatAck {
                client_time,
                server_time: start.elapsed().as_millis() as u64,
            });
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::debug!(%player_id, error = %e, "ignoring client event");
    }
}

async fn relay<C: Codec>(
    state: &ServerState<C>,
    from: PlayerId,
    to: Recipient,
    msg: ServerMessage,
) -> Result<(), RoomError> {
    state.rooms.lock().await.relay(from, to, msg).await
}
