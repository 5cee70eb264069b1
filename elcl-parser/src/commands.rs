//! Functions called from the binary.

use std::path::Path;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::document::Document;
use crate::error::Error;
use crate::parser::Parser;
use crate::test_format::TestFormat;

/// One entry of the flat value map, as printed by the `print` command.
#[derive(Debug, Serialize)]
struct FlatValue {
    /// The absolute name path of the value.
    path: String,
    /// The type of the value.
    kind: String,
    /// The canonical textual form of the value; empty for containers.
    text: String,
    /// The line of the value in the document.
    line: Option<i32>,
    /// The column of the value in the document.
    column: Option<i32>,
}

/// Validate a configuration document.
pub fn validate(file: &Path) -> Result<(), Error> {
    parse(file)?;
    Ok(())
}

/// Parse a configuration document and print its values to stdout.
pub fn print(file: &Path, output_format: &OutputFormat, pretty: bool) -> Result<(), Error> {
    let document = parse(file)?;
    match output_format {
        OutputFormat::Json => {
            let flat: Vec<FlatValue> = document
                .to_flat_value_map()
                .iter()
                .map(|(path, value)| {
                    let position = value.location().map(|location| location.position());
                    FlatValue {
                        path: format!("{path}"),
                        kind: format!("{}", value.kind()),
                        text: value.to_text_representation(),
                        line: position.map(|position| position.line()),
                        column: position.map(|position| position.column()),
                    }
                })
                .collect();
            let output = if pretty {
                serde_json::to_string_pretty(&flat)
            } else {
                serde_json::to_string(&flat)
            };
            match output {
                Ok(output) => println!("{output}"),
                Err(error) => {
                    return Err(Error::new(
                        crate::error::ErrorCategory::Internal,
                        format!("Cannot format the output: {error}"),
                    ));
                }
            }
        }
        OutputFormat::Tree => {
            print!(
                "{}",
                document.to_test_value_tree(TestFormat::default().with_container_size())
            );
        }
    }
    Ok(())
}

/// Parse a document from a file with the default settings.
fn parse(file: &Path) -> Result<Document, Error> {
    let mut parser = Parser::new();
    parser.parse_file(file)
}
