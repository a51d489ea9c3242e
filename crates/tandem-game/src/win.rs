//! Win detection and level reset.

use std::collections::HashSet;

use rand::Rng;
use tandem_protocol::{PlayerId, PlayerState};

use crate::{GameConfig, Level, generate_level};

/// `true` when the door is open and every player in the room is standing
/// in it. An empty room never wins.
pub(crate) fn is_won(
    door_open: bool,
    players: &[PlayerState],
    at_door: &HashSet<PlayerId>,
) -> bool {
    door_open
        && !players.is_empty()
        && players.len() == at_door.len()
        && players.iter().all(|p| at_door.contains(&p.id))
}

/// Replaces the level with a fresh one and forgets who was at the door.
///
/// Players keep their positions and velocities.
pub(crate) fn reset<R: Rng>(
    config: &GameConfig,
    rng: &mut R,
    level: &mut Level,
    at_door: &mut HashSet<PlayerId>,
) {
    *level = generate_level(config, rng);
    at_door.clear();
}
