//! Observability for formrules
//!
//! - Structured JSON logging to stderr
//! - Typed lifecycle events
//! - Monotonic counters
//!
//! Observability is read-only: nothing here affects compilation or
//! validation results.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

fn severity_for(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else if event.is_trace() {
        Severity::Trace
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(severity_for(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_for(event), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_severity_mapping() {
        assert_eq!(severity_for(Event::CompileFailed), Severity::Fatal);
        assert_eq!(severity_for(Event::RuleSetCacheHit), Severity::Trace);
        assert_eq!(severity_for(Event::ValidationAccepted), Severity::Info);
    }

    #[test]
    fn test_log_event_does_not_panic() {
        log_event(Event::ConfigLoaded);
        log_event_with_fields(Event::CompileComplete, &[("fields", "3")]);
    }
}
