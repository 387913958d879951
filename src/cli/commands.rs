//! CLI command implementations
//!
//! Every command follows the same sequence:
//! 1. Configuration load (file or defaults)
//! 2. Schema load from the schema directory
//! 3. Schema resolve by (id, version)
//! 4. Command work, one JSON response on stdout

use serde_json::{json, Value};

use crate::compiler::{Compiler, RuleSet};
use crate::config::CompilerConfig;
use crate::observability::{Logger, Severity};
use crate::schema::{SchemaDocument, SchemaLoader};
use crate::submission::Submission;
use crate::validator::{ErrorList, Validator};

use super::args::{Command, SchemaSelector};
use super::errors::CliResult;
use super::io::{read_input, write_rejection, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    if cli.verbose {
        Logger::set_min_severity(Severity::Trace);
    }
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Compile { selector } => compile(&selector),
        Command::Validate { selector } => {
            let value = read_input()?;
            validate(&selector, &value)
        }
        Command::Submit { selector } => {
            let value = read_input()?;
            submit(&selector, &value)
        }
    }
}

/// Loaded configuration plus the selected schema document.
struct Context {
    config: CompilerConfig,
    document: SchemaDocument,
}

fn load_context(selector: &SchemaSelector) -> CliResult<Context> {
    let config = match &selector.config {
        Some(path) => CompilerConfig::load(path)?,
        None => CompilerConfig::default(),
    };

    let mut loader = SchemaLoader::new(&selector.schemas);
    loader.load_all()?;
    let document = loader
        .resolve(&selector.schema_id, &selector.schema_version)?
        .clone();

    Ok(Context { config, document })
}

fn compile_rules(context: &Context) -> CliResult<RuleSet> {
    Ok(Compiler::new(context.config.clone()).compile(&context.document.root)?)
}

/// Print the compiled RuleSet
pub fn compile(selector: &SchemaSelector) -> CliResult<()> {
    let context = load_context(selector)?;
    let rules = compile_rules(&context)?;
    write_response(serde_json::to_value(&rules)?)
}

/// Authoritatively validate one value
///
/// A rejected value is a normal outcome: it is written as an error
/// response and the command still succeeds.
pub fn validate(selector: &SchemaSelector, value: &Value) -> CliResult<()> {
    let context = load_context(selector)?;
    match Validator::new().validate(&context.document.root, value) {
        Ok(data) => write_response(data),
        Err(failure) => write_rejection(failure.code(), failure.errors()),
    }
}

/// Run the dual-validation protocol on one value
pub fn submit(selector: &SchemaSelector, value: &Value) -> CliResult<()> {
    let context = load_context(selector)?;
    let rules = compile_rules(&context)?;

    let mut submission = Submission::new(&context.document.root, &rules);
    let ui_errors: ErrorList = submission.check_ui(value);
    let (state, outcome) = submission.submit(value);

    write_response(json!({
        "ui_errors": ui_errors,
        "outcome": outcome,
        "state": state.as_str(),
    }))
}
