//! Commandline argument handling.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// The commandline interface of the `elcl-parser` tool.
#[derive(Clone, Debug, Parser)]
#[command(about, author, name = "elcl-parser", version)]
pub struct Cli {
    /// Log debug information to stderr.
    #[arg(long, global = true)]
    pub verbose: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// The output format for the `print` command.
#[derive(Clone, Debug, Default, strum::Display, clap::ValueEnum)]
pub enum OutputFormat {
    /// The flat value map as JSON.
    #[default]
    #[strum(serialize = "json")]
    Json,
    /// The value tree in the compact test format.
    #[strum(serialize = "tree")]
    Tree,
}

/// The subcommands of the tool.
#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Validate a configuration document.
    ///
    /// If the document parses, the program exits with a return code of 0
    /// and no output. Otherwise an error is emitted on stderr and the
    /// program exits with a non-zero status.
    #[command()]
    Validate {
        /// The document to validate.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Parse a configuration document and print its values.
    #[command()]
    Print {
        /// The document to parse.
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// The output format.
        #[arg(
            short,
            long,
            value_name = "OUTPUT_FORMAT",
            default_value_t = OutputFormat::Json
        )]
        output_format: OutputFormat,

        /// Pretty-print the output, where the format supports it.
        #[arg(short, long)]
        pretty: bool,
    },
}
