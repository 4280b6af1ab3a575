// Console line rendering

use crate::{Format, Level, LogConfig};
use std::fmt::Write;

/// Render one log line (without the trailing newline).
pub(crate) fn render(config: &LogConfig, level: Level, target: &str, message: &str) -> String {
    match config.format {
        Format::Pretty => render_pretty(config, level, target, message),
        Format::Compact => render_compact(config, level, target, message),
        Format::Json => render_json(level, target, message),
    }
}

fn render_pretty(config: &LogConfig, level: Level, target: &str, message: &str) -> String {
    let mut line = String::new();

    if config.timestamps {
        let now = chrono::Local::now();
        let _ = write!(line, "{} ", now.format("%Y-%m-%d %H:%M:%S%.3f"));
    }

    #[cfg(feature = "color")]
    if config.color {
        let _ = write!(line, "{:5} ", level.colored());
    } else {
        let _ = write!(line, "{:5} ", level.as_str());
    }

    #[cfg(not(feature = "color"))]
    let _ = write!(line, "{:5} ", level.as_str());

    if !target.is_empty() {
        let _ = write!(line, "[{}] ", target);
    }

    line.push_str(message);
    line
}

fn render_compact(config: &LogConfig, level: Level, target: &str, message: &str) -> String {
    let mut line = String::new();

    if config.timestamps {
        let now = chrono::Local::now();
        let _ = write!(line, "{} ", now.format("%H:%M:%S"));
    }

    let _ = write!(line, "{} ", level.as_str().chars().next().unwrap_or('?'));

    if !target.is_empty() {
        let _ = write!(line, "{}: ", target);
    }

    line.push_str(message);
    line
}

#[cfg(feature = "json")]
fn render_json(level: Level, target: &str, message: &str) -> String {
    use serde::Serialize;

    #[derive(Serialize)]
    struct LogEntry<'a> {
        timestamp: String,
        level: &'a str,
        target: &'a str,
        message: &'a str,
    }

    let entry = LogEntry {
        timestamp: chrono::Utc::now().to_rfc3339(),
        level: level.as_str(),
        target,
        message,
    };

    serde_json::to_string(&entry).unwrap_or_default()
}

#[cfg(not(feature = "json"))]
fn render_json(level: Level, target: &str, message: &str) -> String {
    format!(
        r#"{{"timestamp":"{}","level":"{}","target":"{}","message":"{}"}}"#,
        chrono::Utc::now().to_rfc3339(),
        level.as_str(),
        escape_json(target),
        escape_json(message)
    )
}

#[cfg(not(feature = "json"))]
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(result, "\\u{:04x}", c as u32);
            }
            c => result.push(c),
        }
    }
    result
}
