//! Per-input kinematics and collision resolution.
//!
//! The simulation advances once per received move event, not on a
//! wall-clock tick: gravity is added to `vy` on every call, so the rate at
//! which a client sends input sets how fast it falls. Clients sample input
//! on key changes, which the default constants are tuned for.
//!
//! Each function here is one step of [`Room::apply_move`]; the ordering
//! lives there.
//!
//! [`Room::apply_move`]: crate::Room::apply_move

use tandem_protocol::{Door, Key, Platform, PlayerId, PlayerState};

use crate::GameConfig;

/// One input sample from a client.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveInput {
    /// Raw horizontal intent. Scaled by `move_damping`, never clamped.
    pub vx: f64,
    pub jump: bool,
}

/// Applies input, gravity, and velocity to one player.
///
/// Returns the player's `y` from before integration, which the landing
/// checks use to tell "fell onto" from "was already below".
pub(crate) fn integrate(
    player: &mut PlayerState,
    input: MoveInput,
    config: &GameConfig,
) -> f64 {
    player.vx = input.vx * config.move_damping;

    // No double jump: airborne jump requests are dropped.
    if input.jump && player.on_ground {
        player.vy = config.jump_impulse;
        player.on_ground = false;
    }

    player.vy += config.gravity;
    player.x += player.vx;

    let prev_y = player.y;
    player.y += player.vy;
    player.on_ground = false;
    prev_y
}

/// Lands `players[index]` on top of another player it just fell onto.
///
/// The first supporter in join order wins. The lander is carried by the
/// supporter's horizontal velocity, so standing on a walking player moves
/// you with them.
pub(crate) fn land_on_players(
    players: &mut [PlayerState],
    index: usize,
    prev_y: f64,
    config: &GameConfig,
) -> bool {
    let size = config.player_size;
    let mover = &players[index];
    if mover.vy <= 0.0 {
        return false;
    }

    let support = players
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, other)| other)
        .find(|other| {
            overlaps_x(mover.x, size, other.x, size)
                && crossed_from_above(prev_y, mover.y, other.y, size)
        })
        .map(|other| (other.y, other.vx));

    let Some((top, carry)) = support else {
        return false;
    };

    let mover = &mut players[index];
    mover.y = top - size;
    mover.vy = 0.0;
    mover.on_ground = true;
    mover.x += carry;
    true
}

/// Lands the player on the first platform (in list order, ground first)
/// whose top it crossed this step.
pub(crate) fn land_on_platforms(
    player: &mut PlayerState,
    prev_y: f64,
    platforms: &[Platform],
    config: &GameConfig,
) -> bool {
    let size = config.player_size;
    let hit = platforms.iter().find(|p| {
        overlaps_x(player.x, size, p.x, p.width)
            && crossed_from_above(prev_y, player.y, p.y, size)
    });

    match hit {
        Some(platform) => {
            player.y = platform.y - size;
            player.vy = 0.0;
            player.on_ground = true;
            true
        }
        None => false,
    }
}

/// Keeps the player's hitbox inside the playfield horizontally.
pub(crate) fn clamp_to_playfield(player: &mut PlayerState, config: &GameConfig) {
    player.x = player.x.clamp(0.0, config.max_player_x());
}

/// Collects the key if the player's center is within reach of the key's
/// center on both axes. Opens the door. Returns `true` on pickup.
pub(crate) fn try_collect_key(
    player: &PlayerState,
    key: &mut Key,
    door: &mut Door,
    config: &GameConfig,
) -> bool {
    if key.collected {
        return false;
    }

    let half_player = config.player_size / 2.0;
    let half_key = config.key_size / 2.0;
    let dx = (player.x + half_player) - (key.x + half_key);
    let dy = (player.y + half_player) - (key.y + half_key);

    if dx.abs() < config.key_pickup_dx && dy.abs() < config.key_pickup_dy {
        key.collected = true;
        key.collected_by = Some(player.id);
        door.open = true;
        true
    } else {
        false
    }
}

/// `true` when the door is open and the player stands in its doorway.
pub(crate) fn reaches_door(
    player: &PlayerState,
    door: &Door,
    config: &GameConfig,
) -> bool {
    door.open
        && (player.x - door.x).abs() < config.door_reach_dx
        && (player.y - door.y).abs() < config.door_reach_dy
}

/// A freshly spawned player: standing, motionless.
pub(crate) fn spawn(
    id: PlayerId,
    nickname: String,
    color: String,
    slot: usize,
    config: &GameConfig,
) -> PlayerState {
    PlayerState {
        id,
        nickname,
        color,
        x: config.spawn_x + slot as f64 * config.spawn_spacing,
        y: config.spawn_y,
        vx: 0.0,
        vy: 0.0,
        on_ground: true,
    }
}

fn overlaps_x(ax: f64, aw: f64, bx: f64, bw: f64) -> bool {
    ax + aw > bx && ax < bx + bw
}

/// The bottom edge of a `size`-tall box moved from `prev_y` to `y` and
/// reached or passed `surface` from above.
fn crossed_from_above(prev_y: f64, y: f64, surface: f64, size: f64) -> bool {
    y + size >= surface && prev_y + size <= surface
}
