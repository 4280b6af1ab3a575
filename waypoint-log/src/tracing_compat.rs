//! Tracing compatibility layer.
//!
//! [`TracingLogger`] forwards logger messages to `tracing` events, and
//! [`subscriber`] builds a subscriber that honours the `WAYPOINT_*` level
//! settings when `RUST_LOG` is not set.

use crate::{Level, LogConfig, Logger};

/// Forwards messages to `tracing` under the `waypoint` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::Debug => tracing::debug!(target: "waypoint", "{}", message),
            Level::Info => tracing::info!(target: "waypoint", "{}", message),
            Level::Warn => tracing::warn!(target: "waypoint", "{}", message),
            Level::Error => tracing::error!(target: "waypoint", "{}", message),
            Level::Off => {}
        }
    }
}

/// Create a tracing subscriber configured like the console backend.
pub fn subscriber(config: &LogConfig) -> impl tracing::Subscriber {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match config.level {
        Level::Debug => "debug",
        Level::Info => "info",
        Level::Warn => "warn",
        Level::Error => "error",
        Level::Off => "off",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(config.color))
}
