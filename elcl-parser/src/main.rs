//! The entry point for the `elcl-parser` binary.

use std::process::ExitCode;

use clap::Parser;
use elcl_parser::cli::{Cli, Command};
use elcl_parser::commands::{print, validate};
use simplelog::{Config, LevelFilter, SimpleLogger};

/// Parses the CLI arguments and calls the respective library functions.
fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if let Err(error) = SimpleLogger::init(level, Config::default()) {
        eprintln!("Cannot initialize the logger: {error}");
        return ExitCode::FAILURE;
    }
    let result = match &cli.command {
        Command::Validate { file } => validate(file),
        Command::Print {
            file,
            output_format,
            pretty,
        } => print(file, output_format, *pretty),
    };

    if let Err(error) = result {
        eprintln!("{error}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
