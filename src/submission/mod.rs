//! Dual-validation submission protocol
//!
//! A record goes through two independent checks:
//!
//! 1. UI gate: compiled rules, cheap and interactive, bypassable
//! 2. Authoritative: the schema itself, run on submit
//!
//! Only the authoritative verdict accepts or rejects. A clean UI gate never
//! accepts on its own, and a skipped UI gate never blocks acceptance.
//!
//! States:
//!
//! ```text
//! Editing --ui ok--> UiAccepted --authoritative ok--> Accepted
//!    |                   |
//!    +--authoritative ok--> AuthoritativeAccepted --ui bypassed--> Accepted
//!    any --authoritative failed--> Rejected(errors)
//! ```

mod ui;

use serde::Serialize;
use serde_json::Value;

pub use ui::evaluate_rules;

use crate::compiler::RuleSet;
use crate::observability::{log_event_with_fields, Event};
use crate::schema::SchemaNode;
use crate::validator::{ErrorList, Validator};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Editing,
    UiAccepted,
    AuthoritativeAccepted,
    Accepted,
    Rejected(ErrorList),
}

/// Inputs that move a submission between states.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionEvent {
    UiPassed,
    UiFailed,
    AuthoritativePassed,
    AuthoritativeFailed(ErrorList),
    /// Submitted without a passing UI verdict
    UiBypassed,
}

impl SubmissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionState::Editing => "editing",
            SubmissionState::UiAccepted => "ui_accepted",
            SubmissionState::AuthoritativeAccepted => "authoritative_accepted",
            SubmissionState::Accepted => "accepted",
            SubmissionState::Rejected(_) => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionState::Accepted | SubmissionState::Rejected(_))
    }

    /// Applies one event. Terminal states absorb every event.
    pub fn on(self, event: SubmissionEvent) -> SubmissionState {
        use SubmissionEvent as E;
        use SubmissionState as S;

        match (self, event) {
            (state, _) if state.is_terminal() => state,
            (_, E::AuthoritativeFailed(errors)) => S::Rejected(errors),
            (S::Editing | S::UiAccepted, E::UiPassed) => S::UiAccepted,
            (S::Editing | S::UiAccepted, E::UiFailed) => S::Editing,
            (S::UiAccepted, E::AuthoritativePassed) => S::Accepted,
            (S::Editing, E::AuthoritativePassed) => S::AuthoritativeAccepted,
            (S::AuthoritativeAccepted, E::UiPassed | E::UiBypassed) => S::Accepted,
            (state, _) => state,
        }
    }
}

/// Final verdict of a submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Accepted { data: Value, ui_bypassed: bool },
    Rejected { errors: ErrorList, ui_bypassed: bool },
}

impl SubmissionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmissionOutcome::Accepted { .. })
    }

    pub fn ui_bypassed(&self) -> bool {
        match self {
            SubmissionOutcome::Accepted { ui_bypassed, .. }
            | SubmissionOutcome::Rejected { ui_bypassed, .. } => *ui_bypassed,
        }
    }
}

/// One form submission against a schema and its compiled rules.
pub struct Submission<'a> {
    schema: &'a SchemaNode,
    rules: &'a RuleSet,
    validator: Validator,
    state: SubmissionState,
}

impl<'a> Submission<'a> {
    pub fn new(schema: &'a SchemaNode, rules: &'a RuleSet) -> Self {
        Self {
            schema,
            rules,
            validator: Validator::new(),
            state: SubmissionState::Editing,
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Runs the UI gate over the current form value.
    ///
    /// Returns the UI errors; an empty list moves the submission to
    /// `UiAccepted`, anything else back to `Editing`.
    pub fn check_ui(&mut self, value: &Value) -> ErrorList {
        let errors = evaluate_rules(self.rules, value);
        let event = if errors.is_empty() {
            SubmissionEvent::UiPassed
        } else {
            let count = errors.len().to_string();
            log_event_with_fields(Event::SubmissionUiRejected, &[("errors", count.as_str())]);
            SubmissionEvent::UiFailed
        };
        self.advance(event);
        errors
    }

    /// Runs authoritative validation and settles the submission.
    pub fn submit(mut self, value: &Value) -> (SubmissionState, SubmissionOutcome) {
        let ui_bypassed = self.state != SubmissionState::UiAccepted;

        let outcome = match self.validator.validate(self.schema, value) {
            Ok(data) => {
                self.advance(SubmissionEvent::AuthoritativePassed);
                if ui_bypassed {
                    self.advance(SubmissionEvent::UiBypassed);
                }
                log_event_with_fields(
                    Event::SubmissionAccepted,
                    &[("ui_bypassed", bool_str(ui_bypassed))],
                );
                SubmissionOutcome::Accepted { data, ui_bypassed }
            }
            Err(failure) => {
                let errors = failure.into_errors();
                self.advance(SubmissionEvent::AuthoritativeFailed(errors.clone()));
                let count = errors.len().to_string();
                log_event_with_fields(
                    Event::SubmissionRejected,
                    &[
                        ("errors", count.as_str()),
                        ("ui_bypassed", bool_str(ui_bypassed)),
                    ],
                );
                SubmissionOutcome::Rejected {
                    errors,
                    ui_bypassed,
                }
            }
        };
        (self.state, outcome)
    }

    fn advance(&mut self, event: SubmissionEvent) {
        let state = std::mem::replace(&mut self.state, SubmissionState::Editing);
        self.state = state.on(event);
    }
}

fn bool_str(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}
