// Logger collaborator and its backends

use crate::output::render;
use crate::{Level, LogConfig};
use std::sync::{Arc, Mutex};

/// Diagnostics sink injected into the route generator and dispatcher.
///
/// Implementors only need [`log`](Logger::log); the per-level methods and
/// [`enabled`](Logger::enabled) have defaults.
pub trait Logger: Send + Sync {
    /// Write one message at the given level.
    fn log(&self, level: Level, message: &str);

    /// Whether messages at `level` would be written.
    fn enabled(&self, _level: Level) -> bool {
        true
    }

    fn debug(&self, message: &str) {
        if self.enabled(Level::Debug) {
            self.log(Level::Debug, message);
        }
    }

    fn info(&self, message: &str) {
        if self.enabled(Level::Info) {
            self.log(Level::Info, message);
        }
    }

    fn warn(&self, message: &str) {
        if self.enabled(Level::Warn) {
            self.log(Level::Warn, message);
        }
    }

    fn error(&self, message: &str) {
        if self.enabled(Level::Error) {
            self.log(Level::Error, message);
        }
    }
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn log(&self, level: Level, message: &str) {
        (**self).log(level, message)
    }

    fn enabled(&self, level: Level) -> bool {
        (**self).enabled(level)
    }
}

impl<L: Logger + ?Sized> Logger for Box<L> {
    fn log(&self, level: Level, message: &str) {
        (**self).log(level, message)
    }

    fn enabled(&self, level: Level) -> bool {
        (**self).enabled(level)
    }
}

impl<L: Logger + ?Sized> Logger for &L {
    fn log(&self, level: Level, message: &str) {
        (**self).log(level, message)
    }

    fn enabled(&self, level: Level) -> bool {
        (**self).enabled(level)
    }
}

/// Writes to stderr in the configured [`Format`](crate::Format).
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    config: LogConfig,
    target: String,
}

impl ConsoleLogger {
    /// Create a console logger with an explicit config.
    pub fn new(config: LogConfig) -> Self {
        Self {
            config,
            target: "waypoint".to_string(),
        }
    }

    /// Create a console logger configured from the environment.
    pub fn from_env() -> Self {
        Self::new(LogConfig::from_env())
    }

    /// Set the target shown next to each message.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new(LogConfig::default())
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, level: Level, message: &str) {
        if !self.enabled(level) {
            return;
        }
        eprintln!("{}", render(&self.config, level, &self.target, message));
    }

    fn enabled(&self, level: Level) -> bool {
        level != Level::Off && level >= self.config.level
    }
}

/// A single message captured by [`MemoryLogger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: Level,
    pub message: String,
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    min_level: Option<Level>,
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only keep messages at `level` or above.
    pub fn with_level(level: Level) -> Self {
        Self {
            min_level: Some(level),
            records: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of all captured records, oldest first.
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    /// Messages captured at exactly `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|r| r.level == level)
            .map(|r| r.message.clone())
            .collect()
    }

    /// Whether a message at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lock()
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogRecord>> {
        // A panic while holding the lock leaves the Vec intact.
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: Level, message: &str) {
        if !self.enabled(level) {
            return;
        }
        self.lock().push(LogRecord {
            level,
            message: message.to_string(),
        });
    }

    fn enabled(&self, level: Level) -> bool {
        self.min_level.is_none_or(|min| level >= min)
    }
}

/// Discards all messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _level: Level, _message: &str) {}

    fn enabled(&self, _level: Level) -> bool {
        false
    }
}

/// Forwards to the `log` crate facade under the `waypoint` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeLogger;

impl FacadeLogger {
    fn facade_level(level: Level) -> Option<log::Level> {
        match level {
            Level::Debug => Some(log::Level::Debug),
            Level::Info => Some(log::Level::Info),
            Level::Warn => Some(log::Level::Warn),
            Level::Error => Some(log::Level::Error),
            Level::Off => None,
        }
    }
}

impl Logger for FacadeLogger {
    fn log(&self, level: Level, message: &str) {
        if let Some(level) = Self::facade_level(level) {
            log::log!(target: "waypoint", level, "{}", message);
        }
    }

    fn enabled(&self, level: Level) -> bool {
        Self::facade_level(level)
            .is_some_and(|level| log::log_enabled!(target: "waypoint", level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Format;

    #[test]
    fn test_default_methods_route_to_log() {
        let logger = MemoryLogger::new();
        logger.debug("a");
        logger.info("b");
        logger.warn("c");
        logger.error("d");

        let levels: Vec<Level> = logger.records().iter().map(|r| r.level).collect();
        assert_eq!(
            levels,
            vec![Level::Debug, Level::Info, Level::Warn, Level::Error]
        );
    }

    #[test]
    fn test_memory_logger_contains_and_clear() {
        let logger = MemoryLogger::new();
        logger.warn("controller HealthController has no handlers");

        assert!(logger.contains(Level::Warn, "HealthController"));
        assert!(!logger.contains(Level::Error, "HealthController"));

        logger.clear();
        assert!(logger.records().is_empty());
    }

    #[test]
    fn test_console_logger_level_filter() {
        let logger = ConsoleLogger::new(LogConfig::default().level(Level::Warn));

        assert!(!logger.enabled(Level::Debug));
        assert!(!logger.enabled(Level::Info));
        assert!(logger.enabled(Level::Warn));
        assert!(logger.enabled(Level::Error));
        assert!(!logger.enabled(Level::Off));
    }

    #[test]
    fn test_console_logger_target() {
        let logger = ConsoleLogger::new(LogConfig::default().format(Format::Compact))
            .with_target("waypoint::dispatch");
        assert_eq!(logger.target, "waypoint::dispatch");
        assert_eq!(logger.config().format, Format::Compact);
    }

    #[test]
    fn test_noop_logger_is_disabled() {
        let logger = NoopLogger;
        assert!(!logger.enabled(Level::Error));
        logger.error("dropped");
    }

    #[test]
    fn test_boxed_logger_delegates() {
        let boxed: Box<dyn Logger> = Box::new(MemoryLogger::with_level(Level::Error));
        assert!(!boxed.enabled(Level::Warn));
        assert!(boxed.enabled(Level::Error));
    }
}
