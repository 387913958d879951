//! Compile-time errors
//!
//! Every compile error is an authoring defect in the schema. They are FATAL:
//! compilation stops and no partial RuleSet is produced.

use thiserror::Error;

use crate::schema::{FieldPath, NodeKind, Severity};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("unsupported constraint kind '{kind}' at '{path}'")]
    UnsupportedConstraintKind { kind: String, path: FieldPath },

    #[error("schema nesting exceeds {max_depth} levels at '{path}'")]
    RecursiveSchemaUnsupported { max_depth: usize, path: FieldPath },

    #[error("top-level schema must be an object, found {found}")]
    InvalidTopLevelSchema { found: NodeKind },

    #[error("constraint '{kind}' cannot apply to a {node} at '{path}'")]
    InapplicableConstraint {
        kind: String,
        node: NodeKind,
        path: FieldPath,
    },

    #[error("invalid pattern '{pattern}' at '{path}': {reason}")]
    InvalidPattern {
        pattern: String,
        path: FieldPath,
        reason: String,
    },

    #[error("duplicate field '{name}' in object at '{path}'")]
    DuplicateField { name: String, path: FieldPath },

    #[error("refinement names undeclared field '{field}' in object at '{path}'")]
    UnknownRefinementField { field: String, path: FieldPath },
}

impl CompileError {
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::UnsupportedConstraintKind { .. } => "FORM_UNSUPPORTED_CONSTRAINT_KIND",
            CompileError::RecursiveSchemaUnsupported { .. } => "FORM_RECURSIVE_SCHEMA_UNSUPPORTED",
            CompileError::InvalidTopLevelSchema { .. } => "FORM_INVALID_TOP_LEVEL_SCHEMA",
            CompileError::InapplicableConstraint { .. } => "FORM_INAPPLICABLE_CONSTRAINT",
            CompileError::InvalidPattern { .. } => "FORM_INVALID_PATTERN",
            CompileError::DuplicateField { .. } => "FORM_DUPLICATE_FIELD",
            CompileError::UnknownRefinementField { .. } => "FORM_UNKNOWN_REFINEMENT_FIELD",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }

    /// Field the defect was found at, if any.
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            CompileError::UnsupportedConstraintKind { path, .. }
            | CompileError::RecursiveSchemaUnsupported { path, .. }
            | CompileError::InapplicableConstraint { path, .. }
            | CompileError::InvalidPattern { path, .. }
            | CompileError::DuplicateField { path, .. }
            | CompileError::UnknownRefinementField { path, .. } => Some(path),
            CompileError::InvalidTopLevelSchema { .. } => None,
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;
