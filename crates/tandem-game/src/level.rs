//! Procedural level generation.

use rand::Rng;
use tandem_protocol::{Door, Key, Platform};

use crate::GameConfig;

/// One room's playable layout: platforms plus the key and the door.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    /// Ground first, then the generated platforms bottom to top.
    pub platforms: Vec<Platform>,
    pub key: Key,
    pub door: Door,
}

impl Level {
    /// The full-width platform every level starts with.
    pub fn ground(&self) -> &Platform {
        &self.platforms[0]
    }
}

/// Generates a fresh level.
///
/// The ground spans the playfield; above it `platform_count` platforms of
/// random width and x form a staircase `platform_y_gap` apart. The key and
/// the door each pick a non-ground platform independently (they may share
/// one) and sit centered on it.
///
/// Expects a [`GameConfig::validated`] config; the width range must not
/// be empty.
pub fn generate_level<R: Rng>(config: &GameConfig, rng: &mut R) -> Level {
    let count = config.platform_count.max(1);
    let mut platforms = Vec::with_capacity(count as usize + 1);

    platforms.push(Platform {
        x: 0.0,
        y: config.ground_y,
        width: f64::from(config.playfield_width),
        height: config.ground_height,
    });

    for i in 0..count {
        let width = rng.random_range(
            config.platform_min_width..=config.platform_max_width,
        );
        let x = rng
            .random_range(0..=config.playfield_width.saturating_sub(width));
        platforms.push(Platform {
            x: f64::from(x),
            y: config.platform_y_start - f64::from(i) * config.platform_y_gap,
            width: f64::from(width),
            height: config.platform_height,
        });
    }

    let key_platform = platforms[rng.random_range(1..platforms.len())];
    let door_platform = platforms[rng.random_range(1..platforms.len())];

    let key = Key::new(
        center_x(&key_platform) - config.key_size / 2.0,
        key_platform.y - config.key_offset_y,
    );
    let door = Door::new(
        center_x(&door_platform) - config.door_width / 2.0,
        door_platform.y - config.door_offset_y,
    );

    Level {
        platforms,
        key,
        door,
    }
}

/// Horizontal center of a platform, rounded down to a whole pixel.
fn center_x(platform: &Platform) -> f64 {
    platform.x + (platform.width / 2.0).floor()
}
