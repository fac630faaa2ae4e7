//! `isodraw`: headless checks for diagram documents.
//!
//! `isodraw validate -f doc.json` loads and validates a document, then runs
//! the lint rules. `isodraw order -f doc.json` prints every view's paint
//! order. Set `RUST_LOG=debug` for engine logging.

mod commands;

use clap::{Parser, Subcommand};
use commands::{OrderArgs, ValidateArgs};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "isodraw", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a document and report lint findings
    Validate(ValidateArgs),
    /// Print the paint order of each view
    Order(OrderArgs),
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Validate(args) => args.execute(),
        Command::Order(args) => args.execute(),
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::from(2)
        }
    }
}
