//! Room configuration.

use serde::{Deserialize, Serialize};

/// Per-player time (ms) a room starts with when nobody has changed it.
pub const DEFAULT_TIME_LIMIT_MS: u64 = 300_000;

/// Settings applied to every room the registry creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Initial per-player time limit in milliseconds.
    pub time_limit_ms: u64,
}

impl RoomConfig {
    /// Returns a copy with a zero limit replaced by the default.
    pub fn validated(mut self) -> Self {
        if self.time_limit_ms == 0 {
            self.time_limit_ms = DEFAULT_TIME_LIMIT_MS;
        }
        self
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: DEFAULT_TIME_LIMIT_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default_is_five_minutes() {
        assert_eq!(RoomConfig::default().time_limit_ms, 300_000);
    }

    #[test]
    fn test_validated_zero_limit_falls_back_to_default() {
        let config = RoomConfig { time_limit_ms: 0 }.validated();
        assert_eq!(config.time_limit_ms, DEFAULT_TIME_LIMIT_MS);
    }

    #[test]
    fn test_room_config_missing_fields_use_default() {
        let config: RoomConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RoomConfig::default());
    }
}
