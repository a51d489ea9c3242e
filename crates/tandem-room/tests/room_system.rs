//! Integration tests for the room registry and room actors.

use std::time::Duration;

use serde_json::json;
use tandem_game::{GameConfig, MoveInput};
use tandem_protocol::{GameSnapshot, PlayerId, Recipient, RoomId, ServerMessage};
use tandem_room::{PlayerSender, RoomConfig, RoomError, RoomManager};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

type Inbox = mpsc::UnboundedReceiver<ServerMessage>;

fn pid(id: u64) -> PlayerId {
    PlayerId(id)
}

fn channel() -> (PlayerSender, Inbox) {
    mpsc::unbounded_channel()
}

async fn recv(inbox: &mut Inbox) -> ServerMessage {
    tokio::time::timeout(Duration::from_secs(1), inbox.recv())
        .await
        .expect("timed out waiting for a message")
        .expect("room dropped the sender")
}

async fn recv_state(inbox: &mut Inbox) -> GameSnapshot {
    match recv(inbox).await {
        ServerMessage::GameState(state) => state,
        other => panic!("expected game_state, got {other:?}"),
    }
}

/// Asserts nothing arrives within a short window.
async fn assert_silent(inbox: &mut Inbox) {
    let result = tokio::time::timeout(Duration::from_millis(100), inbox.recv()).await;
    assert!(result.is_err(), "unexpected message: {result:?}");
}

/// Joins `id` to `room` and discards the join messages.
async fn join_quiet(mgr: &mut RoomManager, room: &str, id: u64, name: &str) -> Inbox {
    let (tx, mut rx) = channel();
    mgr.join(Some(room), name.into(), pid(id), tx).await.unwrap();
    recv(&mut rx).await;
    recv_state(&mut rx).await;
    rx
}

// =========================================================================
// join()
// =========================================================================

#[tokio::test]
async fn test_join_named_room_sends_ack_then_state() {
    let mut mgr = RoomManager::default();
    let (tx, mut rx) = channel();

    let ack = mgr.join(Some("abc"), "Alice".into(), pid(1), tx).await.unwrap();

    assert_eq!(ack.room, RoomId::from("abc"));
    assert_eq!(ack.nickname, "Alice");
    assert_eq!(ack.color, "#e74c3c");

    assert_eq!(
        recv(&mut rx).await,
        ServerMessage::RoomJoined {
            room: RoomId::from("abc"),
            nickname: "Alice".into(),
            color: "#e74c3c".into(),
        }
    );
    let state = recv_state(&mut rx).await;
    assert_eq!(state.players.len(), 1);
    assert_eq!((state.players[0].x, state.players[0].y), (100.0, 500.0));
    assert!(state.players[0].on_ground);
    assert_eq!(state.platforms.len(), 7);
    assert!(!state.key_collected);
    assert!(!state.door_open);
}

#[tokio::test]
async fn test_join_blank_room_generates_hex_id() {
    let mut mgr = RoomManager::default();
    let (tx, _rx) = channel();

    let ack = mgr.join(Some("   "), "Bob".into(), pid(1), tx).await.unwrap();

    let id = ack.room.as_str();
    assert_eq!(id.len(), 8);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert_eq!(mgr.player_room(&pid(1)), Some(&ack.room));
}

#[tokio::test]
async fn test_join_without_room_creates_separate_rooms() {
    let mut mgr = RoomManager::default();
    let a = mgr.join(None, "A".into(), pid(1), channel().0).await.unwrap();
    let b = mgr.join(None, "B".into(), pid(2), channel().0).await.unwrap();

    assert_ne!(a.room, b.room);
    assert_eq!(mgr.room_count(), 2);
}

#[tokio::test]
async fn test_second_join_same_room_shares_level() {
    let mut mgr = RoomManager::default();
    let mut alice = join_quiet(&mut mgr, "abc", 1, "Alice").await;

    let (tx, mut bob) = channel();
    let ack = mgr.join(Some("abc"), "Bob".into(), pid(2), tx).await.unwrap();
    assert_eq!(ack.color, "#3498db");

    recv(&mut bob).await;
    let bob_view = recv_state(&mut bob).await;
    let alice_view = recv_state(&mut alice).await;

    assert_eq!(bob_view, alice_view);
    assert_eq!(bob_view.players.len(), 2);
    assert_eq!(bob_view.players[1].x, 150.0);
    assert_eq!(mgr.room_count(), 1);
}

#[tokio::test]
async fn test_join_twice_is_rejected() {
    let mut mgr = RoomManager::default();
    join_quiet(&mut mgr, "abc", 1, "Alice").await;

    let result = mgr.join(Some("xyz"), "Alice".into(), pid(1), channel().0).await;

    assert!(matches!(result, Err(RoomError::AlreadyInRoom(_, ref room)) if room.as_str() == "abc"));
    assert_eq!(mgr.room_count(), 1, "no room created for the rejected join");
}

// =========================================================================
// leave()
// =========================================================================

#[tokio::test]
async fn test_leave_broadcasts_to_remaining() {
    let mut mgr = RoomManager::default();
    let _alice = join_quiet(&mut mgr, "abc", 1, "Alice").await;
    let mut bob = join_quiet(&mut mgr, "abc", 2, "Bob").await;

    let room = mgr.leave(pid(1)).await.unwrap();

    assert_eq!(room.as_str(), "abc");
    assert_eq!(mgr.player_room(&pid(1)), None);
    let state = recv_state(&mut bob).await;
    assert_eq!(state.players.len(), 1);
    assert_eq!(state.players[0].id, pid(2));
}

#[tokio::test]
async fn test_leave_without_room_fails() {
    let mut mgr = RoomManager::default();
    let result = mgr.leave(pid(1)).await;
    assert!(matches!(result, Err(RoomError::NotInAnyRoom(_))));
}

#[tokio::test]
async fn test_last_player_leaves_room_persists() {
    let mut mgr = RoomManager::default();
    join_quiet(&mut mgr, "abc", 1, "Alice").await;
    let before = mgr.get_room_info(&RoomId::from("abc")).await.unwrap();

    mgr.leave(pid(1)).await.unwrap();

    assert_eq!(mgr.room_count(), 1);
    let info = mgr.get_room_info(&RoomId::from("abc")).await.unwrap();
    assert_eq!(info.player_count(), 0);
    assert_eq!(info.door_open, before.door_open);

    // Rejoining lands in the same room at the first spawn slot.
    let (tx, mut rx) = channel();
    let ack = mgr.join(Some("abc"), "Alice".into(), pid(3), tx).await.unwrap();
    assert_eq!(ack.color, "#e74c3c");
    recv(&mut rx).await;
    assert_eq!(recv_state(&mut rx).await.players[0].x, 100.0);
}

#[tokio::test]
async fn test_last_player_leaves_room_evicted_when_configured() {
    let config = RoomConfig {
        evict_when_empty: true,
        ..RoomConfig::default()
    };
    let mut mgr = RoomManager::new(config, GameConfig::default());
    join_quiet(&mut mgr, "abc", 1, "Alice").await;
    join_quiet(&mut mgr, "abc", 2, "Bob").await;

    mgr.leave(pid(1)).await.unwrap();
    assert_eq!(mgr.room_count(), 1, "Bob is still there");

    mgr.leave(pid(2)).await.unwrap();
    assert_eq!(mgr.room_count(), 0);
    assert!(matches!(
        mgr.get_room_info(&RoomId::from("abc")).await,
        Err(RoomError::NotFound(_))
    ));
}

// =========================================================================
// route_move()
// =========================================================================

#[tokio::test]
async fn test_route_move_broadcasts_to_room() {
    let mut mgr = RoomManager::default();
    let mut alice = join_quiet(&mut mgr, "abc", 1, "Alice").await;
    let mut bob = join_quiet(&mut mgr, "abc", 2, "Bob").await;
    recv_state(&mut alice).await; // Bob's join

    mgr.route_move(pid(1), "abc", MoveInput { vx: 5.0, jump: false })
        .await
        .unwrap();

    let seen_by_alice = recv_state(&mut alice).await;
    let seen_by_bob = recv_state(&mut bob).await;
    assert_eq!(seen_by_alice, seen_by_bob);
    assert_eq!(seen_by_alice.players[0].x, 103.0);
}

#[tokio::test]
async fn test_route_move_wrong_room_is_rejected() {
    let mut mgr = RoomManager::default();
    let mut alice = join_quiet(&mut mgr, "abc", 1, "Alice").await;
    let mut other = join_quiet(&mut mgr, "xyz", 2, "Other").await;

    let result = mgr.route_move(pid(1), "xyz", MoveInput::default()).await;

    assert!(matches!(result, Err(RoomError::NotInRoom(_, _))));
    assert_silent(&mut alice).await;
    assert_silent(&mut other).await;
}

#[tokio::test]
async fn test_route_move_before_join_is_rejected() {
    let mgr = RoomManager::default();
    let result = mgr.route_move(pid(1), "abc", MoveInput::default()).await;
    assert!(matches!(result, Err(RoomError::NotInAnyRoom(_))));
}

// =========================================================================
// relay()
// =========================================================================

#[tokio::test]
async fn test_relay_offer_reaches_everyone_else() {
    let mut mgr = RoomManager::default();
    let mut alice = join_quiet(&mut mgr, "abc", 1, "Alice").await;
    let mut bob = join_quiet(&mut mgr, "abc", 2, "Bob").await;
    recv_state(&mut alice).await; // Bob's join

    let offer = ServerMessage::WebrtcOffer {
        from: pid(1),
        offer: json!({"sdp": "v=0"}),
    };
    mgr.relay(pid(1), Recipient::AllExcept(pid(1)), offer.clone())
        .await
        .unwrap();

    assert_eq!(recv(&mut bob).await, offer);
    assert_silent(&mut alice).await;
}

#[tokio::test]
async fn test_relay_direct_message_outside_room_is_dropped() {
    let mut mgr = RoomManager::default();
    join_quiet(&mut mgr, "abc", 1, "Alice").await;
    let mut stranger = join_quiet(&mut mgr, "xyz", 2, "Stranger").await;

    let answer = ServerMessage::WebrtcAnswer {
        from: pid(1),
        answer: json!({"sdp": "x"}),
    };
    mgr.relay(pid(1), Recipient::Player(pid(2)), answer).await.unwrap();

    assert_silent(&mut stranger).await;
}

#[tokio::test]
async fn test_relay_direct_message_in_room() {
    let mut mgr = RoomManager::default();
    join_quiet(&mut mgr, "abc", 1, "Alice").await;
    let mut bob = join_quiet(&mut mgr, "abc", 2, "Bob").await;

    let candidate = ServerMessage::WebrtcIceCandidate {
        from: pid(1),
        candidate: json!({"candidate": "a=1"}),
    };
    mgr.relay(pid(1), Recipient::Player(pid(2)), candidate.clone())
        .await
        .unwrap();

    assert_eq!(recv(&mut bob).await, candidate);
}

// =========================================================================
// Registry bookkeeping
// =========================================================================

#[tokio::test]
async fn test_get_room_info_lists_members_in_join_order() {
    let mut mgr = RoomManager::default();
    join_quiet(&mut mgr, "abc", 7, "Alice").await;
    join_quiet(&mut mgr, "abc", 3, "Bob").await;

    let info = mgr.get_room_info(&RoomId::from("abc")).await.unwrap();
    assert_eq!(info.players, vec![pid(7), pid(3)]);
    assert_eq!(mgr.room_ids(), vec![RoomId::from("abc")]);
}

#[tokio::test]
async fn test_get_room_info_unknown_room() {
    let mgr = RoomManager::default();
    let result = mgr.get_room_info(&RoomId::from("nope")).await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

#[tokio::test]
async fn test_destroy_room_clears_membership() {
    let mut mgr = RoomManager::default();
    join_quiet(&mut mgr, "abc", 1, "Alice").await;

    mgr.destroy_room(&RoomId::from("abc")).await.unwrap();

    assert_eq!(mgr.room_count(), 0);
    assert_eq!(mgr.player_room(&pid(1)), None);
}
