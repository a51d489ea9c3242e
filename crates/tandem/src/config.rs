//! Server configuration and environment loading.

use std::path::Path;
use std::time::Duration;

use tandem_game::GameConfig;
use tandem_room::RoomConfig;

/// Port used when neither `TANDEM_BIND` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 5000;

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// `host:port` to listen on.
    pub bind_addr: String,

    /// A connection that sends nothing for this long is closed, which
    /// removes its player. Any event or pong counts as activity.
    pub idle_timeout: Duration,

    /// How often the server pings each connection. Browsers answer
    /// pings on their own, so a player standing still stays connected.
    /// Keep it well under `idle_timeout`.
    pub ping_interval: Duration,

    pub room: RoomConfig,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            idle_timeout: Duration::from_secs(15),
            ping_interval: Duration::from_secs(5),
            room: RoomConfig::default(),
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// | Variable                    | Effect                                  |
    /// |-----------------------------|-----------------------------------------|
    /// | `TANDEM_BIND`               | full bind address, wins over `PORT`     |
    /// | `PORT`                      | bind `0.0.0.0:$PORT`                    |
    /// | `TANDEM_IDLE_TIMEOUT_SECS`  | idle timeout in whole seconds (> 0)     |
    /// | `TANDEM_PING_INTERVAL_SECS` | ping interval in whole seconds (> 0)    |
    /// | `TANDEM_EVICT_EMPTY_ROOMS`  | `true`/`false`, `1`/`0`                 |
    /// | `TANDEM_GAME_CONFIG`        | path to a JSON file of [`GameConfig`] overrides |
    ///
    /// Invalid values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("TANDEM_BIND").filter(|a| !a.trim().is_empty()) {
            config.bind_addr = addr.trim().to_string();
        } else if let Some(port) = lookup("PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => config.bind_addr = format!("0.0.0.0:{port}"),
                Err(e) => tracing::warn!(%port, error = %e, "invalid PORT, using default"),
            }
        }

        if let Some(secs) = lookup("TANDEM_IDLE_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.idle_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(%secs, "invalid TANDEM_IDLE_TIMEOUT_SECS, using default"),
            }
        }

        if let Some(secs) = lookup("TANDEM_PING_INTERVAL_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.ping_interval = Duration::from_secs(secs),
                _ => tracing::warn!(%secs, "invalid TANDEM_PING_INTERVAL_SECS, using default"),
            }
        }
        if config.ping_interval >= config.idle_timeout {
            tracing::warn!(
                ping = ?config.ping_interval,
                idle = ?config.idle_timeout,
                "ping interval not shorter than idle timeout, quiet players will be dropped"
            );
        }

        if let Some(flag) = lookup("TANDEM_EVICT_EMPTY_ROOMS") {
            match parse_flag(&flag) {
                Some(evict) => config.room.evict_when_empty = evict,
                None => tracing::warn!(%flag, "invalid TANDEM_EVICT_EMPTY_ROOMS, using default"),
            }
        }

        if let Some(path) = lookup("TANDEM_GAME_CONFIG") {
            if let Some(game) = load_game_config(Path::new(&path)) {
                config.game = game;
            }
        }

        config
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Reads a JSON [`GameConfig`]; missing fields keep their defaults.
fn load_game_config(path: &Path) -> Option<GameConfig> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read game config, using defaults");
            return None;
        }
    };
    match serde_json::from_str::<GameConfig>(&text) {
        Ok(game) => {
            tracing::info!(path = %path.display(), "loaded game config");
            Some(game.validated())
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid game config, using defaults");
            None
        }
    }
}
