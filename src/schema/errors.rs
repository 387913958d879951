//! Schema registry error types
//!
//! Error codes:
//! - FORM_UNKNOWN_SCHEMA (REJECT)
//! - FORM_UNKNOWN_SCHEMA_VERSION (REJECT)
//! - FORM_SCHEMA_IMMUTABLE (REJECT)
//! - FORM_MALFORMED_SCHEMA (FATAL)

use std::fmt;

/// Severity levels shared by every error family in the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Request rejected; caller may correct input and retry
    Reject,
    /// Authoring defect; must surface to the developer
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema registry error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Schema ID not found
    UnknownSchema,
    /// Schema version not found
    UnknownSchemaVersion,
    /// Attempt to replace a registered schema
    SchemaImmutable,
    /// Schema file unreadable or structurally invalid
    MalformedSchema,
}

impl SchemaErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::UnknownSchema => "FORM_UNKNOWN_SCHEMA",
            SchemaErrorCode::UnknownSchemaVersion => "FORM_UNKNOWN_SCHEMA_VERSION",
            SchemaErrorCode::SchemaImmutable => "FORM_SCHEMA_IMMUTABLE",
            SchemaErrorCode::MalformedSchema => "FORM_MALFORMED_SCHEMA",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::MalformedSchema => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema registry error with context
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    schema_id: Option<String>,
    schema_version: Option<String>,
}

impl SchemaError {
    pub fn unknown_schema(schema_id: impl Into<String>) -> Self {
        let id = schema_id.into();
        Self {
            code: SchemaErrorCode::UnknownSchema,
            message: format!("Schema '{}' not found", id),
            schema_id: Some(id),
            schema_version: None,
        }
    }

    pub fn unknown_version(schema_id: impl Into<String>, version: impl Into<String>) -> Self {
        let id = schema_id.into();
        let ver = version.into();
        Self {
            code: SchemaErrorCode::UnknownSchemaVersion,
            message: format!("Schema '{}' version '{}' not found", id, ver),
            schema_id: Some(id),
            schema_version: Some(ver),
        }
    }

    pub fn schema_immutable(schema_id: impl Into<String>, version: impl Into<String>) -> Self {
        let id = schema_id.into();
        let ver = version.into();
        Self {
            code: SchemaErrorCode::SchemaImmutable,
            message: format!("Schema '{}' version '{}' is immutable", id, ver),
            schema_id: Some(id),
            schema_version: Some(ver),
        }
    }

    pub fn malformed_schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::MalformedSchema,
            message: format!("Malformed schema '{}': {}", path.into(), reason.into()),
            schema_id: None,
            schema_version: None,
        }
    }

    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn schema_id(&self) -> Option<&str> {
        self.schema_id.as_deref()
    }

    pub fn schema_version(&self) -> Option<&str> {
        self.schema_version.as_deref()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema registry operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaErrorCode::UnknownSchema.code(), "FORM_UNKNOWN_SCHEMA");
        assert_eq!(SchemaErrorCode::UnknownSchemaVersion.code(), "FORM_UNKNOWN_SCHEMA_VERSION");
        assert_eq!(SchemaErrorCode::SchemaImmutable.code(), "FORM_SCHEMA_IMMUTABLE");
        assert_eq!(SchemaErrorCode::MalformedSchema.code(), "FORM_MALFORMED_SCHEMA");
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(SchemaErrorCode::UnknownSchema.severity(), Severity::Reject);
        assert_eq!(SchemaErrorCode::MalformedSchema.severity(), Severity::Fatal);
        assert!(SchemaError::malformed_schema("x.json", "bad").is_fatal());
    }

    #[test]
    fn test_display_includes_code_and_context() {
        let err = SchemaError::unknown_version("login", "v9");
        let display = err.to_string();
        assert!(display.contains("REJECT"));
        assert!(display.contains("FORM_UNKNOWN_SCHEMA_VERSION"));
        assert!(display.contains("v9"));
        assert_eq!(err.schema_id(), Some("login"));
    }
}
