//! Schema model for formrules
//!
//! The schema tree is the single authoritative description of a form's data.
//! It is compiled into UI rules (see `compiler`) and evaluated directly at
//! submission time (see `validator`).
//!
//! # Design Principles
//!
//! - Tagged enum tree, walked by exhaustive match
//! - Closed constraint vocabulary; unknown kinds are carried, never dropped
//! - Field declaration order is significant and preserved
//! - Paths are segment lists; rendering is presentation only

pub mod builder;
mod constraint;
mod errors;
mod loader;
mod path;
mod types;

pub use constraint::{Constraint, ConstraintKind, Trigger};
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use loader::{SchemaDocument, SchemaLoader};
pub use path::{FieldPath, PathSegment};
pub use types::{Field, NodeKind, PrimitiveType, Refinement, SchemaNode};
