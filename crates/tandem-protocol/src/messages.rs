//! Messages exchanged over the socket.
//!
//! Both enums use `#[serde(tag = "type", rename_all = "snake_case")]`, so
//! every frame is a flat JSON object with a `"type"` discriminator:
//!
//! ```text
//! {"type": "move", "room": "abc", "vx": 5, "jump": false}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{GameSnapshot, PlayerId, RoomId};

/// Client → server events.
///
/// Fields the browser client may omit carry `#[serde(default)]`.
/// Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// "Put me in this room, or a new one if `room` is blank."
    JoinRoom {
        #[serde(default)]
        nickname: String,
        #[serde(default)]
        room: Option<String>,
    },

    /// One input sample. `vx` is the raw horizontal intent (any sign or
    /// magnitude); the engine scales it.
    Move {
        room: String,
        #[serde(default)]
        vx: f64,
        #[serde(default)]
        jump: bool,
    },

    /// Signaling: offer for every other peer in the sender's room.
    WebrtcOffer { offer: Value },

    /// Signaling: answer for one peer.
    WebrtcAnswer { to: PlayerId, answer: Value },

    /// Signaling: ICE candidate for one peer.
    WebrtcIceCandidate { to: PlayerId, candidate: Value },

    /// Keep-alive. Echoed back in [`ServerMessage::HeartbeatAck`].
    Heartbeat { client_time: u64 },
}

/// Server → client events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent only to the joining connection, before the first snapshot.
    RoomJoined {
        room: RoomId,
        nickname: String,
        color: String,
    },

    /// Full room state. Flattened into the tagged object:
    /// `{"type": "game_state", "players": [...], ...}`.
    GameState(GameSnapshot),

    /// Every player reached the open door. A new level follows in the
    /// next `game_state`.
    Win,

    /// Relayed signaling offer.
    WebrtcOffer { from: PlayerId, offer: Value },

    /// Relayed signaling answer.
    WebrtcAnswer { from: PlayerId, answer: Value },

    /// Relayed ICE candidate.
    WebrtcIceCandidate { from: PlayerId, candidate: Value },

    /// Reply to a heartbeat. `server_time` is milliseconds since the
    /// connection was accepted.
    HeartbeatAck { client_time: u64, server_time: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Door, Key, Platform, PlayerState};

    #[test]
    fn test_join_room_parses_browser_payload() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type": "join_room", "nickname": "Alice", "room": "abc"}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::JoinRoom {
                nickname: "Alice".into(),
                room: Some("abc".into()),
            }
        );
    }

    #[test]
    fn test_join_room_without_room_field() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "join_room", "nickname": "Bob"}"#)
                .unwrap();
        assert!(matches!(msg, ClientMessage::JoinRoom { room: None, .. }));
    }

    #[test]
    fn test_move_accepts_integer_vx_and_defaults() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "move", "room": "abc", "vx": -5}"#)
                .unwrap();
        assert_eq!(
            msg,
            ClientMessage::Move {
                room: "abc".into(),
                vx: -5.0,
                jump: false,
            }
        );
    }

    #[test]
    fn test_move_without_room_is_rejected() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"type": "move", "vx": 5, "jump": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_offer_ignores_extra_room_field() {
        // The browser client sends `room` alongside the offer; the server
        // routes by the sender's membership instead.
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type": "webrtc_offer", "room": "abc", "offer": {"sdp": "v=0"}}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::WebrtcOffer { offer } => {
                assert_eq!(offer["sdp"], "v=0");
            }
            other => panic!("expected offer, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"type": "fly_to_moon"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_game_state_is_flattened_under_type_tag() {
        let snapshot = GameSnapshot {
            players: vec![PlayerState {
                id: PlayerId(1),
                nickname: "Alice".into(),
                color: "#e74c3c".into(),
                x: 100.0,
                y: 500.0,
                vx: 0.0,
                vy: 0.0,
                on_ground: true,
            }],
            key: Key::new(10.0, 20.0),
            door: Door::new(30.0, 40.0),
            platforms: vec![Platform {
                x: 0.0,
                y: 550.0,
                width: 800.0,
                height: 50.0,
            }],
            key_collected: false,
            door_open: false,
        };
        let json =
            serde_json::to_value(ServerMessage::GameState(snapshot)).unwrap();

        assert_eq!(json["type"], "game_state");
        assert_eq!(json["players"][0]["nickname"], "Alice");
        assert_eq!(json["players"][0]["on_ground"], true);
        assert_eq!(json["platforms"][0]["width"], 800.0);
        assert_eq!(json["key_collected"], false);
        assert_eq!(json["door_open"], false);
    }

    #[test]
    fn test_win_is_marker_only() {
        let json = serde_json::to_value(ServerMessage::Win).unwrap();
        assert_eq!(json, serde_json::json!({"type": "win"}));
    }

    #[test]
    fn test_room_joined_json_format() {
        let json = serde_json::to_value(ServerMessage::RoomJoined {
            room: RoomId::from("abc"),
            nickname: "Alice".into(),
            color: "#e74c3c".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "room_joined");
        assert_eq!(json["room"], "abc");
        assert_eq!(json["color"], "#e74c3c");
    }

    #[test]
    fn test_relayed_answer_carries_sender() {
        let json = serde_json::to_value(ServerMessage::WebrtcAnswer {
            from: PlayerId(9),
            answer: serde_json::json!({"sdp": "x"}),
        })
        .unwrap();
        assert_eq!(json["type"], "webrtc_answer");
        assert_eq!(json["from"], 9);
        assert_eq!(json["answer"]["sdp"], "x");
    }
}
