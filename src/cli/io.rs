//! JSON I/O handling for CLI
//!
//! - Input: one JSON value via stdin
//! - Output: one JSON object via stdout
//! - Logs go to stderr, so stdout stays machine-readable

use std::io::{self, Read, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};
use crate::validator::ErrorList;

/// Parses one JSON value from `input`.
pub fn parse_input(input: &str) -> CliResult<Value> {
    if input.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }
    Ok(serde_json::from_str(input)?)
}

/// Read the JSON value to validate from stdin
pub fn read_input() -> CliResult<Value> {
    let mut input = String::new();
    io::stdin().lock().read_to_string(&mut input)?;
    parse_input(&input)
}

fn write_line(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&serde_json::json!({
        "status": "ok",
        "data": data
    }))
}

/// Write a rejected-value response to stdout
pub fn write_rejection(code: &str, errors: &ErrorList) -> CliResult<()> {
    write_line(&serde_json::json!({
        "status": "error",
        "code": code,
        "errors": errors
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        let value = parse_input("{\"username\": \"ada\"}\n").unwrap();
        assert_eq!(value["username"], "ada");
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = parse_input("  \n").unwrap_err();
        assert_eq!(err.code_str(), "FORM_CLI_IO_ERROR");
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(parse_input("{ nope").is_err());
    }
}
