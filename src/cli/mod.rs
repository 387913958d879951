//! CLI module for formrules
//!
//! Provides command-line interface for:
//! - compile: Print a schema's RuleSet
//! - validate: Authoritative validation of one value
//! - submit: Full dual-validation protocol on one value

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, SchemaSelector};
pub use commands::{compile, run, run_command, submit, validate};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_input, read_input, write_rejection, write_response};
