//! Waypoint Logging
//!
//! Leveled logging for the Waypoint route generator and dispatcher.
//!
//! Nothing in this crate is global: the generator and dispatcher receive an
//! `Arc<dyn Logger>` at construction and every message goes through it. The
//! host application picks the backend once, at startup.
//!
//! # Backends
//!
//! - [`ConsoleLogger`] - stderr output in JSON, pretty or compact format,
//!   configured from `WAYPOINT_*` environment variables
//! - [`MemoryLogger`] - records messages, for tests and diagnostics
//! - [`NoopLogger`] - discards everything
//! - [`FacadeLogger`] - forwards to the `log` crate facade
//! - `TracingLogger` - forwards to `tracing` (feature `tracing`)
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use waypoint_log::{info, warn, Logger, MemoryLogger};
//!
//! let logger: Arc<dyn Logger> = Arc::new(MemoryLogger::new());
//!
//! info!(logger, "route {} bound", "GET /api/users");
//! warn!(logger, "controller {} has no handlers", "HealthController");
//! ```
//!
//! # Environment Variables
//!
//! - `WAYPOINT_DEBUG=1` - Enable debug logging
//! - `WAYPOINT_LOG_LEVEL=debug|info|warn|error` - Set log level
//! - `WAYPOINT_LOG_FORMAT=pretty|json|compact` - Set output format
//! - `WAYPOINT_LOG_COLOR=1|0` - Enable/disable colors

mod config;
mod level;
mod logger;
mod output;

#[cfg(feature = "tracing")]
pub mod tracing_compat;

pub use config::LogConfig;
pub use level::{Format, Level};
pub use logger::{ConsoleLogger, FacadeLogger, LogRecord, Logger, MemoryLogger, NoopLogger};

#[cfg(feature = "tracing")]
pub use tracing_compat::TracingLogger;

// ============================================================================
// Macros
// ============================================================================

/// Log a debug message through a [`Logger`].
///
/// The message is only formatted when the logger accepts debug output.
///
/// # Example
///
/// ```rust
/// use waypoint_log::{debug, MemoryLogger};
///
/// let logger = MemoryLogger::new();
/// let path = "/api/users";
/// debug!(logger, "Matching route: {}", path);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        if $crate::Logger::enabled(&$logger, $crate::Level::Debug) {
            $crate::Logger::log(&$logger, $crate::Level::Debug, &format!($($arg)+));
        }
    };
}

/// Log an info message through a [`Logger`].
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        if $crate::Logger::enabled(&$logger, $crate::Level::Info) {
            $crate::Logger::log(&$logger, $crate::Level::Info, &format!($($arg)+));
        }
    };
}

/// Log a warning through a [`Logger`].
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        if $crate::Logger::enabled(&$logger, $crate::Level::Warn) {
            $crate::Logger::log(&$logger, $crate::Level::Warn, &format!($($arg)+));
        }
    };
}

/// Log an error through a [`Logger`].
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        if $crate::Logger::enabled(&$logger, $crate::Level::Error) {
            $crate::Logger::log(&$logger, $crate::Level::Error, &format!($($arg)+));
        }
    };
}

// ============================================================================
// Tests
// ============================================================================
