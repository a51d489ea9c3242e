//! End-to-end runs of the engine through its public API.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tandem_game::{GameConfig, Level, MoveInput, Room, generate_level};
use tandem_protocol::{Door, Key, Platform, PlayerId, Recipient, ServerMessage};

fn ground_only(key: Key, door: Door) -> Room {
    let level = Level {
        platforms: vec![Platform {
            x: 0.0,
            y: 550.0,
            width: 800.0,
            height: 50.0,
        }],
        key,
        door,
    };
    Room::with_level(GameConfig::default(), level, StdRng::seed_from_u64(42))
}

fn settle(room: &mut Room, id: PlayerId) {
    for _ in 0..20 {
        room.apply_move(id, MoveInput::default());
    }
}

#[test]
fn test_alice_joins_and_lands() {
    let mut room = ground_only(Key::new(700.0, 100.0), Door::new(600.0, 100.0));
    let color = room.join(PlayerId(1), "Alice".into());
    assert_eq!(color, "#e74c3c");

    let spawn = &room.players()[0];
    assert_eq!((spawn.x, spawn.y), (100.0, 500.0));
    assert!(spawn.on_ground);

    settle(&mut room, PlayerId(1));
    assert_eq!(room.players()[0].y, 510.0);
}

#[test]
fn test_walk_to_key_then_door_wins() {
    // Key on the ground at x≈300, door further right.
    let mut room = ground_only(Key::new(300.0, 520.0), Door::new(500.0, 490.0));
    let alice = PlayerId(1);
    room.join(alice, "Alice".into());
    settle(&mut room, alice);

    let walk = MoveInput { vx: 5.0, jump: false };
    let mut saw_key = false;
    let mut won = false;
    for _ in 0..200 {
        let out = room.apply_move(alice, walk);
        if out.iter().any(|(_, m)| *m == ServerMessage::Win) {
            won = true;
            break;
        }
        saw_key |= room.level().key.collected;
    }

    assert!(saw_key, "walked over the key");
    assert!(won, "reached the open door");
    assert!(!room.level().door.open, "level was reset");
}

#[test]
fn test_win_message_precedes_new_level() {
    // The player drops from spawn onto the key, right below the door.
    let mut room = ground_only(Key::new(105.0, 520.0), Door::new(100.0, 490.0));
    room.join(PlayerId(1), "Solo".into());
    let mut messages = Vec::new();
    for _ in 0..20 {
        messages.extend(room.apply_move(PlayerId(1), MoveInput::default()));
    }

    let win_at = messages
        .iter()
        .position(|(_, m)| *m == ServerMessage::Win)
        .expect("single player standing at the door wins");
    assert_eq!(messages[win_at].0, Recipient::All);
    match &messages[win_at + 1].1 {
        ServerMessage::GameState(state) => {
            assert!(!state.key_collected);
            assert!(!state.door_open);
        }
        other => panic!("expected state after win, got {other:?}"),
    }
}

#[test]
fn test_last_player_leaves_room_survives() {
    let mut room = Room::with_rng(GameConfig::default(), StdRng::seed_from_u64(9));
    room.join(PlayerId(1), "Alice".into());
    let level_before = room.level().clone();

    room.leave(PlayerId(1));

    assert!(room.is_empty());
    assert_eq!(room.level(), &level_before, "level kept for the next joiner");
    room.join(PlayerId(2), "Bob".into());
    assert_eq!(room.players()[0].x, 100.0);
}

#[test]
fn test_seeded_rooms_share_levels() {
    let config = GameConfig::default();
    let a = Room::with_rng(config.clone(), StdRng::seed_from_u64(11));
    let expected = generate_level(&config, &mut StdRng::seed_from_u64(11));
    assert_eq!(a.level(), &expected);
}
