//! formrules CLI entry point
//!
//! This is a minimal entrypoint that:
//! 1. Parses CLI arguments and dispatches (via cli::run)
//! 2. Prints errors to stderr
//! 3. Exits with non-zero on failure
//!
//! All logic is delegated to the CLI module.

use formrules::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
