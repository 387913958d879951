//! Authoritative validation errors
//!
//! A failed validation is an expected, per-request outcome (REJECT), not an
//! authoring defect. It carries every violation found, in field declaration
//! order then constraint order.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::schema::{FieldPath, Severity};

/// One violation at one concrete path (`tags[1]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub path: FieldPath,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Ordered `(path, message)` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorList(Vec<ValidationError>);

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: FieldPath, message: impl Into<String>) {
        self.0.push(ValidationError::new(path, message));
    }

    pub fn extend(&mut self, other: ErrorList) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Messages reported at `path`, in order.
    pub fn messages_at(&self, path: &FieldPath) -> Vec<&str> {
        self.0
            .iter()
            .filter(|e| &e.path == path)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }
}

impl IntoIterator for ErrorList {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationFailure {
    #[error("authoritative validation failed: {errors}")]
    AuthoritativeValidationFailed { errors: ErrorList },
}

impl ValidationFailure {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationFailure::AuthoritativeValidationFailed { .. } => {
                "FORM_AUTHORITATIVE_VALIDATION_FAILED"
            }
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Reject
    }

    pub fn errors(&self) -> &ErrorList {
        match self {
            ValidationFailure::AuthoritativeValidationFailed { errors } => errors,
        }
    }

    pub fn into_errors(self) -> ErrorList {
        match self {
            ValidationFailure::AuthoritativeValidationFailed { errors } => errors,
        }
    }
}
