//! The assignment stream: structural reduction of the token stream.

use std::str::FromStr;

use elcl_types::{Bytes, Location, Name, NamePath, Regex};

use crate::char_stream::CharStream;
use crate::digest::HashAlgorithm;
use crate::error::{Error, ErrorCategory};
use crate::lexer::Lexer;
use crate::limits::MAX_TEXT_LENGTH;
use crate::token::{Token, TokenContent, TokenKind};
use crate::value::{Value, ValuePtr};
use elcl_types::MAX_NAME_PATH_LENGTH;

/// The language version this parser supports.
const SUPPORTED_LANGUAGE_VERSION: &str = "1.0";

/// The features a document may declare in a `@features` meta value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
#[non_exhaustive]
pub enum Feature {
    /// The core language.
    Core,
    /// The minimum feature set.
    Minimum,
    /// The standard feature set.
    Standard,
    /// The advanced feature set.
    Advanced,
    /// All features.
    All,
    /// Floating-point values.
    Float,
    /// Byte-count suffixes on integers.
    ByteCount,
    /// Multi-line values.
    MultiLine,
    /// Section lists.
    SectionList,
    /// Value lists.
    ValueList,
    /// Sections and values with text names.
    TextNames,
    /// Date, time and date-time values.
    DateTime,
    /// Code values.
    Code,
    /// Byte-data values.
    ByteData,
    /// The `@include` meta value.
    Include,
    /// Regular expression values.
    Regex,
    /// Time-delta values.
    TimeDelta,
    /// Validation rules.
    Validation,
    /// Document signatures.
    Signature,
}

/// The kind of an [`Assignment`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum AssignmentKind {
    /// A `[…]` section map definition.
    SectionMap,
    /// A `*[…]` section list entry.
    SectionList,
    /// A named value.
    Value,
    /// A meta value, e.g. `@include`.
    MetaValue,
    /// The sentinel ending the assignment stream.
    EndOfDocument,
}

/// One structural element of a document.
#[derive(Clone, Debug)]
pub(crate) struct Assignment {
    /// The kind of this assignment.
    pub(crate) kind: AssignmentKind,
    /// The absolute name path of the defined element.
    pub(crate) name_path: NamePath,
    /// The location where the element is defined.
    pub(crate) location: Location,
    /// The value; absent for section definitions.
    pub(crate) value: Option<ValuePtr>,
}

/// Reduces the token stream into a flat stream of assignments.
///
/// The stream tracks the current section, resolves relative section
/// paths, assembles value lists and multi-line values, and enforces the
/// rules for meta values.
#[derive(Debug)]
pub(crate) struct AssignmentStream {
    lexer: Lexer,
    token: Token,
    initialized: bool,
    in_root_area: bool,
    current_section_path: NamePath,
    last_absolute_path: NamePath,
    read_meta_version: bool,
    read_meta_features: bool,
}

impl AssignmentStream {
    /// Create a new assignment stream over a character stream.
    pub(crate) fn new(stream: CharStream) -> Self {
        Self {
            lexer: Lexer::new(stream),
            token: Token::end_of_data(elcl_types::Position::undefined()),
            initialized: false,
            in_root_area: true,
            current_section_path: NamePath::new(),
            last_absolute_path: NamePath::new(),
            read_meta_version: false,
            read_meta_features: false,
        }
    }

    /// Enable document hashing, for signing documents.
    pub(crate) fn enable_hashing(&mut self, algorithm: HashAlgorithm) {
        self.lexer.enable_hashing(algorithm);
    }

    /// The document digest, available at the end of the document.
    pub(crate) fn digest(&self) -> Option<&(HashAlgorithm, Bytes)> {
        self.lexer.digest()
    }

    /// Close the underlying source.
    pub(crate) fn close(&mut self) {
        self.lexer.close();
    }

    /// Read the next assignment.
    ///
    /// Returns an `EndOfDocument` assignment at the end of the document,
    /// indefinitely.
    pub(crate) fn next_assignment(&mut self) -> Result<Assignment, Error> {
        if !self.initialized {
            self.initialized = true;
            self.token = self.lexer.next_token()?;
        }
        loop {
            match self.token.kind {
                TokenKind::EndOfData => {
                    return Ok(Assignment {
                        kind: AssignmentKind::EndOfDocument,
                        name_path: NamePath::new(),
                        location: self.current_location(),
                        value: None,
                    });
                }
                TokenKind::LineBreak
                | TokenKind::Indentation
                | TokenKind::Spacing
                | TokenKind::Comment => {
                    self.next()?;
                }
                TokenKind::MetaName => return self.handle_meta_value(),
                TokenKind::RegularName | TokenKind::TextName => return self.handle_value(),
                TokenKind::SectionMapOpen | TokenKind::SectionListOpen => {
                    return self.handle_section();
                }
                _ => {
                    return Err(self.syntax_error(
                        "Expected a section or a named value, but got something else.",
                    ));
                }
            }
        }
    }

    /// Advance to the next token, skipping spacing and comments.
    fn next(&mut self) -> Result<(), Error> {
        loop {
            self.token = self.lexer.next_token()?;
            if !matches!(self.token.kind, TokenKind::Spacing | TokenKind::Comment) {
                return Ok(());
            }
        }
    }

    /// Advance and require a meaningful token on the same line.
    fn expect_next(&mut self) -> Result<(), Error> {
        self.next()?;
        if self.token.kind == TokenKind::EndOfData {
            return Err(self.unexpected_end_error("Unexpected end of the document."));
        }
        if self.token.kind == TokenKind::LineBreak {
            return Err(self.unexpected_end_error("Unexpected end of the line."));
        }
        Ok(())
    }

    /// Advance and require one of the given token kinds.
    fn expect_next_of(&mut self, kinds: &[TokenKind], message: &str) -> Result<(), Error> {
        self.next()?;
        if self.token.kind == TokenKind::EndOfData {
            return Err(self.unexpected_end_error("Unexpected end of the document."));
        }
        if !kinds.contains(&self.token.kind) {
            if self.token.kind == TokenKind::LineBreak {
                return Err(self.syntax_error("Unexpected end of the line."));
            }
            return Err(self.syntax_error(message));
        }
        Ok(())
    }

    /// Require the end of the line or document and consume it.
    fn verify_and_consume_end_of_line(&mut self) -> Result<(), Error> {
        match self.token.kind {
            TokenKind::EndOfData => Ok(()),
            TokenKind::LineBreak => self.next(),
            _ => Err(self.syntax_error(
                "Expected the end of the line, or the end of the document.",
            )),
        }
    }

    /// Handle a meta value like `@version` or `@include`.
    fn handle_meta_value(&mut self) -> Result<Assignment, Error> {
        let name = Name::Meta(self.token.content.as_text().to_string());
        let name_location = self.current_location();
        if !Name::all_meta_names().contains(&name) {
            return Err(self
                .syntax_error("Unknown meta value name.")
                .with_name_path(NamePath::from_name(name)));
        }
        if name == Name::meta_signature() && self.token.begin.line() > 1 {
            return Err(
                self.syntax_error("Signature must be defined in the first line of the document.")
            );
        }
        if (name == Name::meta_version() || name == Name::meta_features()) && !self.in_root_area {
            return Err(
                self.syntax_error("The version and features must be defined before the first section.")
            );
        }
        self.expect_next_of(
            &[TokenKind::NameValueSeparator],
            "Expected a value separator after the meta name.",
        )?;
        self.expect_next_of(
            &[TokenKind::Text],
            "Only single-line text is supported for a meta value or command.",
        )?;
        let text = self.token.content.as_text().to_string();
        self.next()?;
        if self.token.kind == TokenKind::ValueListSeparator {
            return Err(
                self.syntax_error("Only a single text value is supported for a meta value or command.")
            );
        }
        self.verify_and_consume_end_of_line()?;
        if name == Name::meta_version() {
            if self.read_meta_version {
                return Err(
                    self.syntax_error("The '@version' meta value must be defined only once.")
                );
            }
            if text != SUPPORTED_LANGUAGE_VERSION {
                return Err(Error::with_location(
                    ErrorCategory::Unsupported,
                    "This parser only supports version 1.0 of the configuration language.",
                    name_location.clone(),
                ));
            }
            self.read_meta_version = true;
        } else if name == Name::meta_features() {
            if self.read_meta_features {
                return Err(
                    self.syntax_error("The '@features' meta value must be defined only once.")
                );
            }
            self.verify_features(&text, &name_location)?;
            self.read_meta_features = true;
        } else if name == Name::meta_include() {
            // After each include, the section paths start fresh.
            self.last_absolute_path = NamePath::new();
            self.current_section_path = NamePath::new();
        }
        let value = Value::create_text(text);
        value.set_location(name_location.clone());
        Ok(Assignment {
            kind: AssignmentKind::MetaValue,
            name_path: NamePath::from_name(name),
            location: name_location,
            value: Some(value),
        })
    }

    /// Handle a named value assignment.
    fn handle_value(&mut self) -> Result<Assignment, Error> {
        let name = if self.token.kind == TokenKind::TextName {
            Name::text(self.token.content.as_text())
        } else {
            Name::Regular(self.token.content.as_text().to_string())
        };
        let name_location = self.current_location();
        self.expect_next_of(
            &[TokenKind::NameValueSeparator],
            "Expected a value separator after the name.",
        )?;
        self.next()?;
        if self.token.kind == TokenKind::LineBreak {
            // The value is indented on one of the next lines.
            self.expect_next_of(&[TokenKind::Indentation], "Expected an indented value.")?;
            self.expect_next()?;
        }
        let value = match self.token.kind {
            TokenKind::Integer
            | TokenKind::Float
            | TokenKind::Boolean
            | TokenKind::Text
            | TokenKind::Code
            | TokenKind::Regex
            | TokenKind::Date
            | TokenKind::DateTime
            | TokenKind::Time
            | TokenKind::TimeDelta
            | TokenKind::Bytes => {
                let mut values = self.handle_value_or_value_list()?;
                if values.len() == 1 {
                    values.remove(0)
                } else {
                    Value::create_value_list(values)
                }
            }
            TokenKind::MultiLineValueListSeparator => {
                let mut values = self.handle_multi_line_value_list()?;
                if values.len() == 1 {
                    values.remove(0)
                } else {
                    Value::create_value_list(values)
                }
            }
            TokenKind::MultiLineTextOpen | TokenKind::MultiLineCodeOpen => {
                Value::create_text(self.handle_multi_line_text()?)
            }
            TokenKind::MultiLineRegexOpen => {
                Value::create_regex(Regex::new(self.handle_multi_line_regex()?, true))
            }
            TokenKind::MultiLineBytesOpen => Value::create_bytes(self.handle_multi_line_bytes()?),
            _ => {
                return Err(Error::with_location(
                    ErrorCategory::Internal,
                    "Unexpected token for a value.",
                    self.current_location(),
                ));
            }
        };
        value.set_location(name_location.clone());
        let mut name_path = self.current_section_path.clone();
        name_path.append(name);
        Ok(Assignment {
            kind: AssignmentKind::Value,
            name_path,
            location: name_location,
            value: Some(value),
        })
    }

    /// Collect the values of one line: a single value or an inline list.
    fn handle_value_or_value_list(&mut self) -> Result<Vec<ValuePtr>, Error> {
        let mut values = Vec::new();
        while !matches!(self.token.kind, TokenKind::LineBreak | TokenKind::EndOfData) {
            let value = self.value_from_token()?;
            value.set_location(self.current_location());
            values.push(value);
            self.next()?;
            if self.token.kind == TokenKind::ValueListSeparator {
                self.next()?;
            }
        }
        self.verify_and_consume_end_of_line()?;
        Ok(values)
    }

    /// Collect the values of a `*` bullet list on the following lines.
    fn handle_multi_line_value_list(&mut self) -> Result<Vec<ValuePtr>, Error> {
        let mut values = Vec::new();
        while self.token.kind == TokenKind::MultiLineValueListSeparator {
            let bullet_location = self.current_location();
            self.expect_next()?;
            let mut line_values = self.handle_value_or_value_list()?;
            let value = if line_values.len() == 1 {
                line_values.remove(0)
            } else {
                Value::create_value_list(line_values)
            };
            value.set_location(bullet_location);
            values.push(value);
            if self.token.kind != TokenKind::Indentation {
                // A line without indentation ends the list; empty lines
                // are not allowed inside a multi-line list.
                break;
            }
            self.expect_next_of(
                &[TokenKind::MultiLineValueListSeparator],
                "Expected a '*' bullet at the start of the line.",
            )?;
        }
        Ok(values)
    }

    /// Assemble the content of a multi-line text or code block.
    fn handle_multi_line_text(&mut self) -> Result<String, Error> {
        self.expect_next_of(
            &[TokenKind::LineBreak, TokenKind::MultiLineCodeLanguage],
            "Expected the end of the line after the opening sequence.",
        )?;
        if self.token.kind == TokenKind::MultiLineCodeLanguage {
            self.expect_next_of(
                &[TokenKind::LineBreak],
                "Expected the end of the line after the language identifier.",
            )?;
        }
        self.expect_next_of(
            &[TokenKind::Indentation, TokenKind::LineBreak],
            "Expected an indented content line.",
        )?;
        let mut is_second_line = false;
        let mut text = String::new();
        while matches!(self.token.kind, TokenKind::Indentation | TokenKind::LineBreak) {
            if self.token.kind != TokenKind::LineBreak {
                self.expect_next_of(
                    &[
                        TokenKind::MultiLineCode,
                        TokenKind::MultiLineText,
                        TokenKind::MultiLineTextClose,
                        TokenKind::MultiLineCodeClose,
                        TokenKind::LineBreak,
                    ],
                    "Expected multi-line content or the closing sequence.",
                )?;
                if matches!(
                    self.token.kind,
                    TokenKind::MultiLineTextClose | TokenKind::MultiLineCodeClose
                ) {
                    self.next()?;
                    self.verify_and_consume_end_of_line()?;
                    return Ok(text);
                }
                if is_second_line {
                    text.push('\n');
                }
                if self.token.kind != TokenKind::LineBreak {
                    text.push_str(self.token.content.as_text());
                    self.verify_text_length(&text)?;
                    self.expect_next_of(&[TokenKind::LineBreak], "Expected the end of the line.")?;
                }
            } else if is_second_line {
                text.push('\n');
            }
            self.expect_next_of(
                &[TokenKind::LineBreak, TokenKind::Indentation],
                "Expected the closing sequence of the multi-line value.",
            )?;
            is_second_line = true;
        }
        Err(self.syntax_error("The multi-line value is not closed."))
    }

    /// Assemble the content of a multi-line regular expression block.
    fn handle_multi_line_regex(&mut self) -> Result<String, Error> {
        self.expect_next_of(
            &[TokenKind::LineBreak],
            "Expected the end of the line after the opening sequence.",
        )?;
        self.expect_next_of(
            &[TokenKind::Indentation, TokenKind::LineBreak],
            "Expected an indented content line.",
        )?;
        let mut is_second_line = false;
        let mut text = String::new();
        while matches!(self.token.kind, TokenKind::Indentation | TokenKind::LineBreak) {
            if self.token.kind != TokenKind::LineBreak {
                self.expect_next_of(
                    &[
                        TokenKind::MultiLineRegex,
                        TokenKind::MultiLineRegexClose,
                        TokenKind::LineBreak,
                    ],
                    "Expected multi-line content or the closing sequence.",
                )?;
                if self.token.kind == TokenKind::MultiLineRegexClose {
                    self.next()?;
                    self.verify_and_consume_end_of_line()?;
                    return Ok(text);
                }
                if is_second_line {
                    text.push('\n');
                }
                if self.token.kind != TokenKind::LineBreak {
                    text.push_str(self.token.content.as_text());
                    self.verify_text_length(&text)?;
                    self.expect_next_of(&[TokenKind::LineBreak], "Expected the end of the line.")?;
                }
            } else if is_second_line {
                text.push('\n');
            }
            self.expect_next_of(
                &[TokenKind::LineBreak, TokenKind::Indentation],
                "Expected the closing sequence of the multi-line value.",
            )?;
            is_second_line = true;
        }
        Err(self.syntax_error("The multi-line value is not closed."))
    }

    /// Assemble the content of a multi-line byte-data block.
    fn handle_multi_line_bytes(&mut self) -> Result<Bytes, Error> {
        self.expect_next_of(
            &[TokenKind::LineBreak, TokenKind::MultiLineBytesFormat],
            "Expected the end of the line after the opening sequence.",
        )?;
        if self.token.kind == TokenKind::MultiLineBytesFormat {
            self.expect_next_of(
                &[TokenKind::LineBreak],
                "Expected the end of the line after the format identifier.",
            )?;
        }
        self.expect_next_of(
            &[TokenKind::Indentation, TokenKind::LineBreak],
            "Expected an indented content line.",
        )?;
        let mut result = Bytes::new();
        while matches!(self.token.kind, TokenKind::Indentation | TokenKind::LineBreak) {
            if self.token.kind != TokenKind::LineBreak {
                self.expect_next_of(
                    &[
                        TokenKind::MultiLineBytes,
                        TokenKind::MultiLineBytesClose,
                        TokenKind::LineBreak,
                    ],
                    "Expected multi-line content or the closing sequence.",
                )?;
                if self.token.kind == TokenKind::MultiLineBytesClose {
                    self.next()?;
                    self.verify_and_consume_end_of_line()?;
                    return Ok(result);
                }
                if self.token.kind != TokenKind::LineBreak {
                    if let TokenContent::Bytes(bytes) = &self.token.content {
                        result.append(bytes);
                    }
                    if result.len() > MAX_TEXT_LENGTH {
                        return Err(Error::with_location(
                            ErrorCategory::LimitExceeded,
                            "The byte-data exceeds the maximum length.",
                            self.current_location(),
                        ));
                    }
                    self.expect_next_of(&[TokenKind::LineBreak], "Expected the end of the line.")?;
                }
            }
            self.expect_next_of(
                &[TokenKind::Indentation, TokenKind::LineBreak],
                "Expected the closing sequence of the multi-line value.",
            )?;
        }
        Err(self.syntax_error("The multi-line value is not closed."))
    }

    /// Handle a section map or section list definition.
    fn handle_section(&mut self) -> Result<Assignment, Error> {
        let is_section_list = self.token.kind == TokenKind::SectionListOpen;
        let open_location = self.current_location();
        let mut is_relative_path = false;
        self.expect_next_of(
            &[
                TokenKind::NamePathSeparator,
                TokenKind::RegularName,
                TokenKind::TextName,
            ],
            "Expected a name after the section opening.",
        )?;
        if self.token.kind == TokenKind::NamePathSeparator {
            // A leading separator makes this a relative section path.
            is_relative_path = true;
            self.expect_next_of(
                &[TokenKind::RegularName, TokenKind::TextName],
                "Expected a name after the leading name separator.",
            )?;
        }
        let mut name_path = NamePath::new();
        loop {
            if name_path.len() >= MAX_NAME_PATH_LENGTH {
                return Err(Error::with_location(
                    ErrorCategory::LimitExceeded,
                    "A name path must not exceed 10 name components.",
                    self.current_location(),
                ));
            }
            let name = if self.token.kind == TokenKind::TextName {
                Name::text(self.token.content.as_text())
            } else {
                Name::Regular(self.token.content.as_text().to_string())
            };
            name_path.append(name);
            self.expect_next_of(
                &[
                    TokenKind::NamePathSeparator,
                    TokenKind::SectionListClose,
                    TokenKind::SectionMapClose,
                ],
                "Expected a name separator or the end of the section.",
            )?;
            if self.token.kind != TokenKind::NamePathSeparator {
                break;
            }
            self.expect_next_of(
                &[TokenKind::RegularName, TokenKind::TextName],
                "Expected a name after the name separator.",
            )?;
        }
        if self.token.kind == TokenKind::SectionListClose && !is_section_list {
            return Err(self.syntax_error("A section map must be closed with ']'."));
        }
        self.next()?; // consume the closing sequence
        self.verify_and_consume_end_of_line()?;
        if is_relative_path {
            if self.last_absolute_path.is_empty() {
                return Err(Error::with_location(
                    ErrorCategory::Syntax,
                    "There is no absolute section definition before this relative one.",
                    open_location,
                )
                .with_name_path(name_path));
            }
            name_path.prepend(&self.last_absolute_path);
        } else {
            self.last_absolute_path = name_path.clone();
        }
        self.current_section_path = name_path.clone();
        self.in_root_area = false;
        Ok(Assignment {
            kind: if is_section_list {
                AssignmentKind::SectionList
            } else {
                AssignmentKind::SectionMap
            },
            name_path,
            location: open_location,
            value: None,
        })
    }

    /// Create a scalar value from the current token.
    fn value_from_token(&self) -> Result<ValuePtr, Error> {
        let value = match (&self.token.kind, &self.token.content) {
            (TokenKind::Integer, TokenContent::Integer(value)) => Value::create_integer(*value),
            (TokenKind::Float, TokenContent::Float(value)) => Value::create_float(*value),
            (TokenKind::Boolean, TokenContent::Boolean(value)) => Value::create_boolean(*value),
            (TokenKind::Text | TokenKind::Code, TokenContent::Text(text)) => {
                Value::create_text(text.clone())
            }
            (TokenKind::Regex, TokenContent::Text(text)) => {
                Value::create_regex(Regex::new(text.clone(), false))
            }
            (TokenKind::Date, TokenContent::Date(value)) => Value::create_date(*value),
            (TokenKind::DateTime, TokenContent::DateTime(value)) => {
                Value::create_date_time(*value)
            }
            (TokenKind::Time, TokenContent::Time(value)) => Value::create_time(*value),
            (TokenKind::TimeDelta, TokenContent::TimeDelta(value)) => {
                Value::create_time_delta(value.clone())
            }
            (TokenKind::Bytes, TokenContent::Bytes(value)) => Value::create_bytes(value.clone()),
            _ => {
                return Err(Error::with_location(
                    ErrorCategory::Syntax,
                    "Expected a value.",
                    self.current_location(),
                ));
            }
        };
        Ok(value)
    }

    /// Validate the text of a `@features` meta value.
    fn verify_features(&self, text: &str, location: &Location) -> Result<(), Error> {
        for feature in text.split([' ', '\t']) {
            if feature.is_empty() {
                continue;
            }
            let normalized = feature.to_ascii_lowercase();
            if !normalized
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '-')
            {
                return Err(Error::with_location(
                    ErrorCategory::Syntax,
                    format!("Unsupported character in the @features text: '{feature}'."),
                    location.clone(),
                )
                .with_name_path(NamePath::from_name(Name::meta_features())));
            }
            if Feature::from_str(&normalized).is_err() {
                return Err(Error::with_location(
                    ErrorCategory::Unsupported,
                    format!("This parser does not support the feature '{normalized}'."),
                    location.clone(),
                ));
            }
        }
        Ok(())
    }

    fn verify_text_length(&self, text: &str) -> Result<(), Error> {
        if text.len() > MAX_TEXT_LENGTH {
            return Err(Error::with_location(
                ErrorCategory::LimitExceeded,
                "The text exceeds the maximum length.",
                self.current_location(),
            ));
        }
        Ok(())
    }

    /// The location of the current token.
    fn current_location(&self) -> Location {
        Location::new(self.lexer.source_identifier(), self.token.begin)
    }

    fn syntax_error(&self, message: impl Into<String>) -> Error {
        Error::with_location(ErrorCategory::Syntax, message.into(), self.current_location())
    }

    fn unexpected_end_error(&self, message: impl Into<String>) -> Error {
        Error::with_location(
            ErrorCategory::UnexpectedEnd,
            message.into(),
            self.current_location(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Source, TextSource};
    use crate::value::ValueKind;
    use pretty_assertions::assert_eq;

    fn stream_for(text: &str) -> AssignmentStream {
        let mut source = TextSource::new(text);
        source.open().unwrap();
        AssignmentStream::new(CharStream::new(Box::new(source)))
    }

    fn collect(text: &str) -> Vec<Assignment> {
        let mut stream = stream_for(text);
        let mut assignments = Vec::new();
        loop {
            let assignment = stream.next_assignment().unwrap();
            if assignment.kind == AssignmentKind::EndOfDocument {
                break;
            }
            assignments.push(assignment);
        }
        assignments
    }

    fn first_error(text: &str) -> Error {
        let mut stream = stream_for(text);
        loop {
            match stream.next_assignment() {
                Ok(assignment) if assignment.kind == AssignmentKind::EndOfDocument => {
                    panic!("expected an error");
                }
                Ok(_) => {}
                Err(error) => return error,
            }
        }
    }

    #[test]
    fn minimal_document() {
        let assignments = collect("[main]\nvalue: 42\n");
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].kind, AssignmentKind::SectionMap);
        assert_eq!(format!("{}", assignments[0].name_path), "main");
        assert_eq!(assignments[1].kind, AssignmentKind::Value);
        assert_eq!(format!("{}", assignments[1].name_path), "main.value");
        assert_eq!(assignments[1].value.as_ref().unwrap().as_integer(), 42);
    }

    #[test]
    fn relative_section_paths() {
        let assignments = collect("[servers]\n[.workers]\nid: 1\n");
        assert_eq!(format!("{}", assignments[1].name_path), "servers.workers");
        assert_eq!(format!("{}", assignments[2].name_path), "servers.workers.id");
    }

    #[test]
    fn relative_path_without_absolute_is_an_error() {
        let error = first_error("[.workers]\n");
        assert_eq!(error.category(), ErrorCategory::Syntax);
    }

    #[test]
    fn inline_value_list() {
        let assignments = collect("[main]\nlist: 1, 2, 3\n");
        let value = assignments[1].value.as_ref().unwrap();
        assert_eq!(value.kind(), ValueKind::ValueList);
        assert_eq!(value.size(), 3);
        assert_eq!(value.value(2usize).unwrap().as_integer(), 3);
    }

    #[test]
    fn multi_line_value_list() {
        let assignments = collect("[main]\nlist:\n    * 1, 2\n    * 3\n");
        let value = assignments[1].value.as_ref().unwrap();
        assert_eq!(value.kind(), ValueKind::ValueList);
        assert_eq!(value.size(), 2);
        assert_eq!(value.value(0usize).unwrap().kind(), ValueKind::ValueList);
        assert_eq!(value.value(1usize).unwrap().as_integer(), 3);
    }

    #[test]
    fn indented_value_on_next_line() {
        let assignments = collect("[main]\nvalue:\n    42\n");
        assert_eq!(assignments[1].value.as_ref().unwrap().as_integer(), 42);
    }

    #[test]
    fn multi_line_text_assembly() {
        let assignments = collect("[doc]\nbody:\n    \"\"\"\n    hello\n    world\n    \"\"\"\n");
        let value = assignments[1].value.as_ref().unwrap();
        assert_eq!(value.as_text(), "hello\nworld");
    }

    #[test]
    fn multi_line_text_preserves_empty_lines() {
        let assignments = collect("[doc]\nbody:\n    \"\"\"\n    a\n\n    b\n    \"\"\"\n");
        assert_eq!(assignments[1].value.as_ref().unwrap().as_text(), "a\n\nb");
    }

    #[test]
    fn multi_line_regex_value() {
        let assignments = collect("[doc]\npattern:\n    ///\n    \\d+\n    ///\n");
        let value = assignments[1].value.as_ref().unwrap();
        let regex = value.as_regex();
        assert_eq!(regex.pattern(), "\\d+");
        assert!(regex.is_multi_line());
    }

    #[test]
    fn multi_line_bytes_value() {
        let assignments = collect("[doc]\ndata:\n    <<<\n    01ff\n    >>>\n");
        let value = assignments[1].value.as_ref().unwrap();
        assert_eq!(value.as_bytes().to_hex(), "01ff");
    }

    #[test]
    fn version_meta_value() {
        let assignments = collect("@version: \"1.0\"\n[main]\n");
        assert_eq!(assignments[0].kind, AssignmentKind::MetaValue);
        assert_eq!(format!("{}", assignments[0].name_path), "@version");
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let error = first_error("@version: \"2.0\"\n");
        assert_eq!(error.category(), ErrorCategory::Unsupported);
    }

    #[test]
    fn version_after_section_is_an_error() {
        let error = first_error("[main]\n@version: \"1.0\"\n");
        assert_eq!(error.category(), ErrorCategory::Syntax);
    }

    #[test]
    fn duplicate_features_is_an_error() {
        let error = first_error("@features: \"core\"\n@features: \"core\"\n");
        assert_eq!(error.category(), ErrorCategory::Syntax);
    }

    #[test]
    fn unknown_feature_is_unsupported() {
        let error = first_error("@features: \"warp-drive\"\n");
        assert_eq!(error.category(), ErrorCategory::Unsupported);
    }

    #[test]
    fn known_features_are_accepted() {
        let assignments = collect("@features: \"core multi-line byte-count\"\n[main]\n");
        assert_eq!(assignments[0].kind, AssignmentKind::MetaValue);
    }

    #[test]
    fn signature_after_first_line_is_an_error() {
        let error = first_error("[main]\n@signature: \"data\"\n");
        assert_eq!(error.category(), ErrorCategory::Syntax);
    }

    #[test]
    fn unknown_meta_name_is_an_error() {
        let error = first_error("@unknown: \"x\"\n");
        assert_eq!(error.category(), ErrorCategory::Syntax);
    }

    #[test]
    fn section_path_length_is_limited() {
        let error = first_error("[a.b.c.d.e.f.g.h.i.j.k]\n");
        assert_eq!(error.category(), ErrorCategory::LimitExceeded);
    }

    #[test]
    fn text_names_in_values() {
        let assignments = collect("[translations]\n\"hello\": \"hallo\"\n");
        let path = &assignments[1].name_path;
        assert_eq!(format!("{path}"), "translations.\"hello\"");
    }

    #[test]
    fn include_resets_the_section_memory() {
        let mut stream = stream_for("[servers]\n@include: \"other.elcl\"\n[.workers]\n");
        stream.next_assignment().unwrap();
        stream.next_assignment().unwrap();
        let error = loop {
            match stream.next_assignment() {
                Ok(_) => {}
                Err(error) => break error,
            }
        };
        assert_eq!(error.category(), ErrorCategory::Syntax);
    }
}
