//! Structured JSON logger
//!
//! - One line per event, `event` then `severity` then fields sorted by key
//! - Written synchronously to stderr, so stdout stays free for CLI output
//! - A process-wide minimum severity filters noise (default INFO)

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Trace = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    /// Authoring defect; the operation cannot proceed
    Fatal = 4,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => Severity::Trace,
            1 => Severity::Info,
            2 => Severity::Warn,
            3 => Severity::Error,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static MIN_SEVERITY: AtomicU8 = AtomicU8::new(Severity::Info as u8);

/// Structured logger writing JSON lines to stderr
pub struct Logger;

impl Logger {
    /// Sets the lowest severity that is written.
    pub fn set_min_severity(severity: Severity) {
        MIN_SEVERITY.store(severity as u8, Ordering::Relaxed);
    }

    pub fn min_severity() -> Severity {
        Severity::from_u8(MIN_SEVERITY.load(Ordering::Relaxed))
    }

    pub fn enabled(severity: Severity) -> bool {
        severity >= Self::min_severity()
    }

    /// Log an event with the given severity and fields
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if !Self::enabled(severity) {
            return;
        }
        let line = Self::format_line(severity, event, fields);
        let mut stderr = io::stderr().lock();
        // logging never fails the caller
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }

    /// Renders one log line, including the trailing newline.
    pub(crate) fn format_line(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
        sorted.sort_by_key(|(k, _)| *k);

        let mut line = String::with_capacity(128);
        line.push_str("{\"event\":");
        line.push_str(&quote(event));
        line.push_str(",\"severity\":");
        line.push_str(&quote(severity.as_str()));
        for (key, value) in sorted {
            line.push(',');
            line.push_str(&quote(key));
            line.push(':');
            line.push_str(&quote(value));
        }
        line.push_str("}\n");
        line
    }

    pub fn trace(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }

    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }

    pub fn fatal(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Fatal, event, fields);
    }
}

/// JSON string literal for `s`.
fn quote(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Trace < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn test_line_is_json() {
        let line = Logger::format_line(Severity::Info, "COMPILE_COMPLETE", &[("fields", "3")]);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["event"], "COMPILE_COMPLETE");
        assert_eq!(parsed["severity"], "INFO");
        assert_eq!(parsed["fields"], "3");
    }

    #[test]
    fn test_field_order_is_deterministic() {
        let a = Logger::format_line(Severity::Warn, "E", &[("zebra", "1"), ("apple", "2")]);
        let b = Logger::format_line(Severity::Warn, "E", &[("apple", "2"), ("zebra", "1")]);
        assert_eq!(a, b);
        assert!(a.find("apple").unwrap() < a.find("zebra").unwrap());
        assert!(a.find("\"event\"").unwrap() < a.find("\"severity\"").unwrap());
    }

    #[test]
    fn test_escapes_and_single_line() {
        let line = Logger::format_line(Severity::Error, "E", &[("path", "a\"b\nc")]);
        assert_eq!(line.matches('\n').count(), 1);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["path"], "a\"b\nc");
    }
}
