//! Tunables for level generation and physics.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Player colors, handed out by join order.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#e74c3c", "#3498db", "#2ecc71", "#f1c40f", "#9b59b6", "#e67e22",
    "#1abc9c", "#34495e",
];

/// Every constant the engine uses. Units are pixels (and pixels per move
/// event for velocities); `y` grows downward.
///
/// Missing fields fall back to [`Default`] when deserializing, so a config
/// file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the playfield. Platforms and players stay inside it.
    pub playfield_width: u32,

    /// Top of the ground platform.
    pub ground_y: f64,
    pub ground_height: f64,

    /// Platforms generated above the ground. At least 1.
    pub platform_count: u32,
    pub platform_min_width: u32,
    pub platform_max_width: u32,
    pub platform_height: f64,
    /// `y` of the lowest generated platform.
    pub platform_y_start: f64,
    /// Vertical distance between consecutive generated platforms.
    pub platform_y_gap: f64,

    /// Side length of the key's square box.
    pub key_size: f64,
    /// How far above its platform the key sits.
    pub key_offset_y: f64,
    pub door_width: f64,
    /// How far above its platform the door's top edge sits.
    pub door_offset_y: f64,

    /// Player hitbox side length (width and height).
    pub player_size: f64,
    pub spawn_x: f64,
    /// Horizontal offset between consecutive joiners' spawn points.
    pub spawn_spacing: f64,
    pub spawn_y: f64,

    /// Added to `vy` on every move event.
    pub gravity: f64,
    /// `vy` right after a jump. Negative is up.
    pub jump_impulse: f64,
    /// Multiplier applied to the client's horizontal intent.
    pub move_damping: f64,

    /// Key pickup reach between player and key centers, per axis.
    pub key_pickup_dx: f64,
    pub key_pickup_dy: f64,
    /// Door reach between player and door top-left corners, per axis.
    pub door_reach_dx: f64,
    pub door_reach_dy: f64,

    pub palette: Vec<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            playfield_width: 800,
            ground_y: 550.0,
            ground_height: 50.0,
            platform_count: 6,
            platform_min_width: 100,
            platform_max_width: 200,
            platform_height: 20.0,
            platform_y_start: 400.0,
            platform_y_gap: 60.0,
            key_size: 30.0,
            key_offset_y: 30.0,
            door_width: 40.0,
            door_offset_y: 60.0,
            player_size: 40.0,
            spawn_x: 100.0,
            spawn_spacing: 50.0,
            spawn_y: 500.0,
            gravity: 0.7,
            jump_impulse: -12.0,
            move_damping: 0.6,
            key_pickup_dx: 40.0,
            key_pickup_dy: 40.0,
            door_reach_dx: 40.0,
            door_reach_dy: 60.0,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl GameConfig {
    /// Fixes any out-of-range values so the config is safe to use.
    ///
    /// Rules:
    /// - `player_size` is positive and finite.
    /// - `playfield_width` fits at least one player.
    /// - `platform_count` is at least 1 (key and door need a platform).
    /// - `platform_max_width` ≤ `playfield_width`, and
    ///   `platform_min_width` ≤ `platform_max_width`.
    /// - an empty palette is replaced by [`DEFAULT_PALETTE`].
    pub fn validated(mut self) -> Self {
        if !self.player_size.is_finite() || self.player_size <= 0.0 {
            let fallback = Self::default().player_size;
            warn!(
                size = self.player_size,
                fallback,
                "player_size must be positive, using default"
            );
            self.player_size = fallback;
        }
        let min_width = self.player_size.ceil() as u32;
        if self.playfield_width < min_width {
            warn!(
                playfield = self.playfield_width,
                player_size = self.player_size,
                "playfield narrower than a player, widening"
            );
            self.playfield_width = min_width;
        }
        if self.platform_count == 0 {
            warn!("platform_count is 0, using 1");
            self.platform_count = 1;
        }
        if self.platform_max_width > self.playfield_width {
            warn!(
                max = self.platform_max_width,
                playfield = self.playfield_width,
                "platform_max_width exceeds playfield, clamping"
            );
            self.platform_max_width = self.playfield_width;
        }
        if self.platform_min_width > self.platform_max_width {
            warn!(
                min = self.platform_min_width,
                max = self.platform_max_width,
                "platform_min_width exceeds max, clamping"
            );
            self.platform_min_width = self.platform_max_width;
        }
        if self.palette.is_empty() {
            warn!("empty palette, using default colors");
            self.palette =
                DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect();
        }
        self
    }

    /// Color for the player who joins when `player_count` players are
    /// already in the room. Wraps around the palette.
    pub fn color_for(&self, player_count: usize) -> &str {
        &self.palette[player_count % self.palette.len()]
    }

    /// Largest x a player's left edge may reach.
    pub fn max_player_x(&self) -> f64 {
        f64::from(self.playfield_width) - self.player_size
    }
}
