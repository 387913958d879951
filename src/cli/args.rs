//! CLI argument definitions using clap
//!
//! Commands:
//! - formrules compile --schemas <dir> --id <id> --version <v> [--config <path>]
//! - formrules validate ...same selectors... < value.json
//! - formrules submit ...same selectors... < value.json

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// formrules - compile form schemas into UI validation rules
#[derive(Parser, Debug)]
#[command(name = "formrules")]
#[command(about, long_about = None)]
pub struct Cli {
    /// Log at TRACE level (cache hits, compile starts)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Selects one schema document from a schema directory.
#[derive(Args, Debug, Clone)]
pub struct SchemaSelector {
    /// Directory of schema documents (*.json)
    #[arg(long, default_value = "./schemas")]
    pub schemas: PathBuf,

    /// Schema id
    #[arg(long = "id")]
    pub schema_id: String,

    /// Schema version
    #[arg(long = "version")]
    pub schema_version: String,

    /// Path to compiler configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the compiled RuleSet of a schema
    Compile {
        #[command(flatten)]
        selector: SchemaSelector,
    },

    /// Validate one JSON value from stdin against a schema
    Validate {
        #[command(flatten)]
        selector: SchemaSelector,
    },

    /// Run UI rules and authoritative validation on one JSON value from stdin
    Submit {
        #[command(flatten)]
        selector: SchemaSelector,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
