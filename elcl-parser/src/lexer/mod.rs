//! The lexer: a token stream over the document syntax.

mod multi_line;
mod value;

use std::collections::VecDeque;
use std::sync::Arc;

use elcl_types::{Bytes, Location, Name, Position, SourceIdentifier};

use crate::char_stream::{CharStream, DecodedChar};
use crate::chars::{is_line_break, is_name_start, is_spacing};
use crate::digest::HashAlgorithm;
use crate::error::{Error, ErrorCategory};
use crate::token::{Token, TokenContent, TokenKind};

/// The kinds of multi-line blocks the lexer can be inside of.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum MultiLineKind {
    /// A `"""` text block.
    Text,
    /// A ``` code block.
    Code,
    /// A `///` regular expression block.
    Regex,
    /// A `<<<` byte-data block.
    Bytes,
}

impl MultiLineKind {
    /// The marker that closes a block of this kind.
    fn close_marker(self) -> &'static str {
        match self {
            Self::Text => "\"\"\"",
            Self::Code => "```",
            Self::Regex => "///",
            Self::Bytes => ">>>",
        }
    }
}

/// The state of an active multi-line block.
#[derive(Clone, Debug)]
struct MultiLineState {
    kind: MultiLineKind,
    /// The indentation of the content lines, fixed by the first one.
    indent: Option<String>,
}

/// The lexer turns a character stream into a stream of [`Token`]s.
///
/// The token stream always ends with an `EndOfData` token; lexical errors
/// abort the stream. The lexer is context sensitive: names are scanned at
/// the start of a line, values after a name-value separator or an
/// indentation, and multi-line blocks line by line.
#[derive(Debug)]
pub(crate) struct Lexer {
    stream: CharStream,
    current: DecodedChar,
    peeked: VecDeque<DecodedChar>,
    queue: VecDeque<Token>,
    initialized: bool,
    finished: bool,
    at_line_start: bool,
    value_context: bool,
    section_context: bool,
    pending_multi_line: Option<MultiLineKind>,
    multi_line: Option<MultiLineState>,
}

impl Lexer {
    /// Create a new lexer over the given character stream.
    pub(crate) fn new(stream: CharStream) -> Self {
        Self {
            stream,
            current: DecodedChar {
                c: None,
                position: Position::undefined(),
            },
            peeked: VecDeque::new(),
            queue: VecDeque::new(),
            initialized: false,
            finished: false,
            at_line_start: true,
            value_context: false,
            section_context: false,
            pending_multi_line: None,
            multi_line: None,
        }
    }

    /// The identifier of the underlying source.
    pub(crate) fn source_identifier(&self) -> Arc<SourceIdentifier> {
        self.stream.source_identifier()
    }

    /// Enable hashing on the underlying character stream.
    pub(crate) fn enable_hashing(&mut self, algorithm: HashAlgorithm) {
        self.stream.enable_hashing(algorithm);
    }

    /// The document digest, available after the last token was read.
    pub(crate) fn digest(&self) -> Option<&(HashAlgorithm, Bytes)> {
        self.stream.digest()
    }

    /// Close the underlying source.
    pub(crate) fn close(&mut self) {
        self.stream.close();
    }

    /// Scan and return the next token.
    ///
    /// After the end of the document, this keeps returning `EndOfData`
    /// tokens indefinitely.
    pub(crate) fn next_token(&mut self) -> Result<Token, Error> {
        if let Some(token) = self.queue.pop_front() {
            return Ok(token);
        }
        if !self.initialized {
            self.initialized = true;
            self.advance()?;
        }
        if self.finished || self.current.is_end() {
            self.finished = true;
            return Ok(Token::end_of_data(self.current.position));
        }
        if self.multi_line.is_some() && self.at_line_start {
            return self.scan_multi_line_line();
        }
        self.scan_token()
    }

    /// Scan one token in normal mode.
    fn scan_token(&mut self) -> Result<Token, Error> {
        let c = self.current_char();
        if self.at_line_start {
            if is_spacing(c) {
                // An indented line continues the value of the previous line.
                let token = self.scan_spacing(TokenKind::Indentation)?;
                self.at_line_start = false;
                self.value_context = true;
                return Ok(token);
            }
            self.at_line_start = false;
            self.value_context = false;
        }
        if is_line_break(c) {
            return self.scan_line_break();
        }
        if is_spacing(c) {
            return self.scan_spacing(TokenKind::Spacing);
        }
        if c == '#' {
            return self.scan_comment();
        }
        if self.section_context {
            return self.scan_section_token();
        }
        if self.value_context {
            return self.scan_value_token();
        }
        self.scan_name_token()
    }

    /// Scan a token at the start of a line, outside of values.
    fn scan_name_token(&mut self) -> Result<Token, Error> {
        let begin = self.current.position;
        match self.current_char() {
            c if is_name_start(c) => self.scan_regular_name(),
            '@' => self.scan_meta_name(),
            '"' => self.scan_text_name(),
            '[' => {
                self.advance()?;
                self.section_context = true;
                Ok(self.token(TokenKind::SectionMapOpen, begin, "[", TokenContent::None))
            }
            '*' if self.peek_char(1)? == Some('[') => {
                self.advance()?;
                self.advance()?;
                self.section_context = true;
                Ok(self.token(TokenKind::SectionListOpen, begin, "*[", TokenContent::None))
            }
            ':' | '=' => {
                let raw = self.current_char().to_string();
                self.advance()?;
                self.value_context = true;
                Ok(self.token(TokenKind::NameValueSeparator, begin, raw, TokenContent::None))
            }
            c => Err(self.syntax_error_at(
                begin,
                format!("Unexpected character '{}' at the start of a line.", safe(c)),
            )),
        }
    }

    /// Scan a token inside a section header.
    fn scan_section_token(&mut self) -> Result<Token, Error> {
        let begin = self.current.position;
        match self.current_char() {
            c if is_name_start(c) => self.scan_regular_name(),
            '"' => self.scan_text_name(),
            '.' => {
                self.advance()?;
                Ok(self.token(TokenKind::NamePathSeparator, begin, ".", TokenContent::None))
            }
            ']' => {
                self.advance()?;
                if self.current_char() == '*' {
                    self.advance()?;
                    self.section_context = false;
                    return Ok(self.token(
                        TokenKind::SectionListClose,
                        begin,
                        "]*",
                        TokenContent::None,
                    ));
                }
                self.section_context = false;
                Ok(self.token(TokenKind::SectionMapClose, begin, "]", TokenContent::None))
            }
            c => Err(self.syntax_error_at(
                begin,
                format!("Unexpected character '{}' in a section header.", safe(c)),
            )),
        }
    }

    /// Scan a regular name, normalizing it on the fly.
    ///
    /// Spaces are part of a name when followed by more name characters, so
    /// the spacing before a separator is not consumed.
    fn scan_regular_name(&mut self) -> Result<Token, Error> {
        let begin = self.current.position;
        let mut raw = String::new();
        loop {
            let c = self.current_char_opt();
            match c {
                Some(c) if c.is_ascii_alphanumeric() || c == '_' => {
                    raw.push(c);
                    self.advance()?;
                }
                Some(' ') => {
                    // Consume the spaces only if more name characters follow.
                    let mut offset = 1;
                    while self.peek_char(offset)? == Some(' ') {
                        offset += 1;
                    }
                    match self.peek_char(offset)? {
                        Some(c) if c.is_ascii_alphanumeric() || c == '_' => {
                            for _ in 0..offset {
                                raw.push(self.current_char());
                                self.advance()?;
                            }
                        }
                        _ => break,
                    }
                }
                _ => break,
            }
        }
        let name = Name::regular(&raw)
            .map_err(|error| Error::from(error).at(self.location_at(begin)))?;
        let Some(text) = name.as_text() else {
            return Err(self.internal_error("A regular name without text."));
        };
        let content = TokenContent::Text(text.to_string());
        Ok(self.token(TokenKind::RegularName, begin, raw, content))
    }

    /// Scan a meta name, e.g. `@version`.
    fn scan_meta_name(&mut self) -> Result<Token, Error> {
        let begin = self.current.position;
        self.advance()?;
        let mut raw = String::from("@");
        while let Some(c) = self.current_char_opt() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            raw.push(c);
            self.advance()?;
        }
        let name =
            Name::meta(&raw).map_err(|error| Error::from(error).at(self.location_at(begin)))?;
        let Some(text) = name.as_text() else {
            return Err(self.internal_error("A meta name without text."));
        };
        let content = TokenContent::Text(text.to_string());
        Ok(self.token(TokenKind::MetaName, begin, raw, content))
    }

    /// Scan a double-quoted text name.
    fn scan_text_name(&mut self) -> Result<Token, Error> {
        let begin = self.current.position;
        let (raw, text) = self.scan_quoted_text()?;
        Ok(self.token(TokenKind::TextName, begin, raw, TokenContent::Text(text)))
    }

    /// Scan a double-quoted text, returning the raw and unescaped text.
    fn scan_quoted_text(&mut self) -> Result<(String, String), Error> {
        let begin = self.current.position;
        let mut raw = String::from("\"");
        self.advance()?; // the opening quote
        let mut inner = String::new();
        loop {
            match self.current_char_opt() {
                None => {
                    return Err(Error::with_location(
                        ErrorCategory::UnexpectedEnd,
                        "The document ends inside a text literal.",
                        self.location_at(begin),
                    ));
                }
                Some(c) if is_line_break(c) => {
                    return Err(self.syntax_error_at(
                        begin,
                        "A text literal is not closed before the end of the line.",
                    ));
                }
                Some('"') => {
                    raw.push('"');
                    self.advance()?;
                    break;
                }
                Some('\\') => {
                    raw.push('\\');
                    inner.push('\\');
                    self.advance()?;
                    if let Some(c) = self.current_char_opt() {
                        if !is_line_break(c) {
                            raw.push(c);
                            inner.push(c);
                            self.advance()?;
                        }
                    }
                }
                Some(c) => {
                    raw.push(c);
                    inner.push(c);
                    self.advance()?;
                }
            }
        }
        let text = elcl_types::escape::unescape_text(&inner)
            .map_err(|error| Error::from(error).at(self.location_at(begin)))?;
        Ok((raw, text))
    }

    /// Scan a run of spacing characters.
    fn scan_spacing(&mut self, kind: TokenKind) -> Result<Token, Error> {
        let begin = self.current.position;
        let mut raw = String::new();
        while let Some(c) = self.current_char_opt() {
            if !is_spacing(c) {
                break;
            }
            raw.push(c);
            self.advance()?;
        }
        Ok(self.token(kind, begin, raw, TokenContent::None))
    }

    /// Scan a line break, activating a pending multi-line block.
    fn scan_line_break(&mut self) -> Result<Token, Error> {
        let begin = self.current.position;
        let mut raw = self.current_char().to_string();
        let is_carriage_return = self.current_char() == '\r';
        self.advance()?;
        if is_carriage_return && self.current_char_opt() == Some('\n') {
            raw.push('\n');
            self.advance()?;
        }
        self.at_line_start = true;
        self.value_context = false;
        self.section_context = false;
        if let Some(kind) = self.pending_multi_line.take() {
            self.multi_line = Some(MultiLineState { kind, indent: None });
        }
        Ok(self.token(TokenKind::LineBreak, begin, raw, TokenContent::None))
    }

    /// Scan a comment up to the end of the line.
    fn scan_comment(&mut self) -> Result<Token, Error> {
        let begin = self.current.position;
        let mut raw = String::new();
        while let Some(c) = self.current_char_opt() {
            if is_line_break(c) {
                break;
            }
            raw.push(c);
            self.advance()?;
        }
        Ok(self.token(TokenKind::Comment, begin, raw, TokenContent::None))
    }

    /// The current character; end-of-data maps to a NUL character that
    /// matches no scanning rule.
    fn current_char(&self) -> char {
        self.current.c.unwrap_or('\u{0}')
    }

    fn current_char_opt(&self) -> Option<char> {
        self.current.c
    }

    /// Look ahead `offset` characters past the current one.
    fn peek_char(&mut self, offset: usize) -> Result<Option<char>, Error> {
        debug_assert!(offset >= 1);
        while self.peeked.len() < offset {
            let next = self.stream.next_char()?;
            self.peeked.push_back(next);
        }
        Ok(self.peeked[offset - 1].c)
    }

    /// Move to the next character.
    fn advance(&mut self) -> Result<(), Error> {
        self.current = match self.peeked.pop_front() {
            Some(decoded) => decoded,
            None => self.stream.next_char()?,
        };
        Ok(())
    }

    /// Build a token ending at the current position.
    fn token(
        &self,
        kind: TokenKind,
        begin: Position,
        raw: impl Into<String>,
        content: TokenContent,
    ) -> Token {
        Token {
            kind,
            begin,
            end: self.current.position,
            raw: raw.into(),
            content,
        }
    }

    /// The location of the given position in this document.
    fn location_at(&self, position: Position) -> Location {
        Location::new(self.stream.source_identifier(), position)
    }

    fn syntax_error_at(&self, position: Position, message: impl Into<String>) -> Error {
        Error::with_location(ErrorCategory::Syntax, message.into(), self.location_at(position))
    }

    fn internal_error(&self, message: impl Into<String>) -> Error {
        Error::with_location(
            ErrorCategory::Internal,
            message.into(),
            self.location_at(self.current.position),
        )
    }
}

/// Make a character safe for use in an error message.
fn safe(c: char) -> String {
    elcl_types::escape::escape_text(&c.to_string(), elcl_types::EscapeMode::ErrorText)
}
