//! Room actor settings.

use serde::{Deserialize, Serialize};

/// Settings shared by every room the registry creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Capacity of each room actor's command mailbox. When it fills up,
    /// senders wait.
    pub channel_size: usize,

    /// Shut down and forget a room once its last player leaves.
    ///
    /// Off by default: an empty room keeps its level and id, and the next
    /// player to join that id lands in the same level.
    pub evict_when_empty: bool,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            channel_size: 64,
            evict_when_empty: false,
        }
    }
}

impl RoomConfig {
    /// Fixes out-of-range values. A zero-capacity mailbox can't be
    /// created, so `channel_size` is raised to 1.
    pub fn validated(mut self) -> Self {
        if self.channel_size == 0 {
            tracing::warn!("channel_size is 0, using 1");
            self.channel_size = 1;
        }
        self
    }
}
