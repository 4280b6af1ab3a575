// Console backend configuration

use crate::{Format, Level};
use std::env;

/// Configuration of the [`ConsoleLogger`](crate::ConsoleLogger).
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum level written
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether colors are enabled (pretty format only)
    pub color: bool,
    /// Whether to include timestamps
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            format: Format::Json,
            color: false,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Build a config from `WAYPOINT_*` environment variables.
    ///
    /// Unset or unparseable variables fall back to the defaults.
    pub fn from_env() -> Self {
        let debug = env_flag("WAYPOINT_DEBUG").unwrap_or(false);

        let level = env::var("WAYPOINT_LOG_LEVEL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = env::var("WAYPOINT_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(Format::Json);

        let color = env_flag("WAYPOINT_LOG_COLOR")
            .unwrap_or_else(|| env::var("NO_COLOR").is_err() && env::var("TERM").is_ok());

        let timestamps = env_flag("WAYPOINT_LOG_TIMESTAMPS").unwrap_or(true);

        Self {
            level,
            format,
            color,
            timestamps,
        }
    }

    /// Set the minimum level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set the output format.
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable timestamps.
    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_json_info() {
        let config = LogConfig::default();
        assert_eq!(config.level, Level::Info);
        assert_eq!(config.format, Format::Json);
        assert!(config.timestamps);
    }

    #[test]
    fn test_builder_methods() {
        let config = LogConfig::default()
            .level(Level::Debug)
            .format(Format::Compact)
            .with_timestamps(false);

        assert_eq!(config.level, Level::Debug);
        assert_eq!(config.format, Format::Compact);
        assert!(!config.timestamps);
    }
}
