//! CLI-specific error types
//!
//! All CLI errors are FATAL: the process prints the error to stderr and
//! exits non-zero. Rejected values are not CLI errors; they are written to
//! stdout as an error response.

use std::fmt;
use std::io;

use crate::compiler::CompileError;
use crate::config::ConfigError;
use crate::schema::SchemaError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Schema could not be loaded or resolved
    SchemaError,
    /// Schema failed to compile
    CompileError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "FORM_CLI_CONFIG_ERROR",
            Self::IoError => "FORM_CLI_IO_ERROR",
            Self::SchemaError => "FORM_CLI_SCHEMA_ERROR",
            Self::CompileError => "FORM_CLI_COMPILE_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(CliErrorCode::ConfigError, format!("{}: {}", e.code(), e))
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::new(CliErrorCode::SchemaError, e.to_string())
    }
}

impl From<CompileError> for CliError {
    fn from(e: CompileError) -> Self {
        Self::new(CliErrorCode::CompileError, format!("{}: {}", e.code(), e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
