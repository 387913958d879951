//! Observable events
//!
//! Every event the crate logs is named here; names are stable strings.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Setup
    ConfigLoaded,
    SchemasLoaded,

    // Compilation
    CompileBegin,
    CompileComplete,
    /// Schema authoring defect surfaced by the compiler
    CompileFailed,
    RuleSetCacheHit,

    // Authoritative validation
    ValidationAccepted,
    ValidationRejected,

    // Submission protocol
    SubmissionUiRejected,
    SubmissionAccepted,
    SubmissionRejected,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::CompileBegin => "COMPILE_BEGIN",
            Event::CompileComplete => "COMPILE_COMPLETE",
            Event::CompileFailed => "COMPILE_FAILED",
            Event::RuleSetCacheHit => "RULESET_CACHE_HIT",
            Event::ValidationAccepted => "VALIDATION_ACCEPTED",
            Event::ValidationRejected => "VALIDATION_REJECTED",
            Event::SubmissionUiRejected => "SUBMISSION_UI_REJECTED",
            Event::SubmissionAccepted => "SUBMISSION_ACCEPTED",
            Event::SubmissionRejected => "SUBMISSION_REJECTED",
        }
    }

    /// Compile failures are authoring defects, not user errors.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::CompileFailed)
    }

    /// Events that are too frequent for the default INFO level.
    pub fn is_trace(&self) -> bool {
        matches!(self, Event::RuleSetCacheHit | Event::CompileBegin)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_upper_snake() {
        let events = [
            Event::ConfigLoaded,
            Event::SchemasLoaded,
            Event::CompileBegin,
            Event::CompileComplete,
            Event::CompileFailed,
            Event::RuleSetCacheHit,
            Event::ValidationAccepted,
            Event::ValidationRejected,
            Event::SubmissionUiRejected,
            Event::SubmissionAccepted,
            Event::SubmissionRejected,
        ];
        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_fatal_events() {
        assert!(Event::CompileFailed.is_fatal());
        assert!(!Event::ValidationRejected.is_fatal());
    }
}
