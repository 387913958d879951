//! formrules - compile form validation schemas into UI rules
//!
//! One schema is the single source of truth for a form:
//! - `compiler` turns it into per-field rules a UI form layer can apply
//! - `validator` runs it authoritatively against submitted values
//! - `submission` ties both together; only the authoritative verdict counts

pub mod cli;
pub mod compiler;
pub mod config;
pub mod observability;
pub mod schema;
pub mod submission;
pub mod validator;

pub use compiler::{compile, CompileError, Compiler, RuleSet, RuleSetCache};
pub use config::{CompilerConfig, MergePolicy};
pub use schema::{FieldPath, SchemaNode};
pub use submission::{evaluate_rules, Submission, SubmissionOutcome, SubmissionState};
pub use validator::{validate, ErrorList, ValidationFailure, Validator};
