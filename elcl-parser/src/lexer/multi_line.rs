//! Line-wise scanning of multi-line value blocks.

use elcl_types::Bytes;

use super::{Lexer, MultiLineKind};
use crate::chars::{is_line_break, is_spacing};
use crate::error::{Error, ErrorCategory};
use crate::limits::MAX_TEXT_LENGTH;
use crate::token::{Token, TokenContent, TokenKind};

impl Lexer {
    /// Scan one complete line of an active multi-line block.
    ///
    /// The tokens of the line are queued and the first one is returned.
    /// A non-indented line ends the block; the following tokens let the
    /// assignment stream report the unterminated block.
    pub(super) fn scan_multi_line_line(&mut self) -> Result<Token, Error> {
        let c = self.current_char();
        if is_line_break(c) {
            // An empty line inside the block.
            return self.scan_line_break();
        }
        if !is_spacing(c) {
            self.multi_line = None;
            return self.scan_token();
        }
        let Some(state) = self.multi_line.clone() else {
            return Err(self.internal_error("No multi-line state."));
        };
        self.at_line_start = false;
        match state.indent {
            None => self.scan_first_content_line(state.kind),
            Some(indent) => self.scan_content_line(state.kind, &indent),
        }
    }

    /// Scan the first indented line of a block, fixing the indentation.
    fn scan_first_content_line(&mut self, kind: MultiLineKind) -> Result<Token, Error> {
        let indentation = self.scan_spacing(TokenKind::Indentation)?;
        if matches!(self.current_char_opt(), Some(c) if is_line_break(c)) {
            // A line of pure spacing does not fix the indentation.
            return Ok(indentation);
        }
        if self.at_close_marker(kind)? {
            let close = self.scan_close_marker(kind)?;
            self.queue.push_back(close);
            return Ok(indentation);
        }
        if let Some(state) = self.multi_line.as_mut() {
            state.indent = Some(indentation.raw.clone());
        }
        let content = self.scan_content_rest(kind)?;
        self.queue.push_back(content);
        Ok(indentation)
    }

    /// Scan a content line against the established indentation.
    fn scan_content_line(&mut self, kind: MultiLineKind, indent: &str) -> Result<Token, Error> {
        let begin = self.current.position;
        let mut raw = String::new();
        for expected in indent.chars() {
            match self.current_char_opt() {
                Some(c) if c == expected => {
                    raw.push(c);
                    self.advance()?;
                }
                Some(c) if is_line_break(c) => {
                    // A line of pure spacing counts as an empty line.
                    let token =
                        self.token(TokenKind::Indentation, begin, raw, TokenContent::None);
                    return Ok(token);
                }
                None => {
                    return Ok(self.token(TokenKind::Indentation, begin, raw, TokenContent::None));
                }
                _ => {
                    // Spacing that diverges from the fixed indentation is
                    // only acceptable when the line has no content.
                    while matches!(self.current_char_opt(), Some(c) if is_spacing(c)) {
                        raw.push(self.current_char());
                        self.advance()?;
                    }
                    if self.current_char_opt().is_none()
                        || matches!(self.current_char_opt(), Some(c) if is_line_break(c))
                    {
                        let token =
                            self.token(TokenKind::Indentation, begin, raw, TokenContent::None);
                        return Ok(token);
                    }
                    return Err(self.syntax_error_at(
                        begin,
                        "The indentation of this line does not match the \
                         indentation of the multi-line value.",
                    ));
                }
            }
        }
        let indentation = self.token(TokenKind::Indentation, begin, raw, TokenContent::None);
        if matches!(self.current_char_opt(), Some(c) if is_line_break(c)) {
            return Ok(indentation);
        }
        if self.at_close_marker(kind)? {
            let close = self.scan_close_marker(kind)?;
            self.queue.push_back(close);
            return Ok(indentation);
        }
        let content = self.scan_content_rest(kind)?;
        self.queue.push_back(content);
        Ok(indentation)
    }

    /// Test if the current characters form the close marker of the block.
    fn at_close_marker(&mut self, kind: MultiLineKind) -> Result<bool, Error> {
        let marker = kind.close_marker();
        let mut chars = marker.chars();
        let first = chars.next();
        if self.current_char_opt() != first {
            return Ok(false);
        }
        for (offset, expected) in chars.enumerate() {
            if self.peek_char(offset + 1)? != Some(expected) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Consume the close marker and leave the multi-line mode.
    fn scan_close_marker(&mut self, kind: MultiLineKind) -> Result<Token, Error> {
        let begin = self.current.position;
        let marker = kind.close_marker();
        for _ in marker.chars() {
            self.advance()?;
        }
        self.multi_line = None;
        self.value_context = false;
        let token_kind = match kind {
            MultiLineKind::Text => TokenKind::MultiLineTextClose,
            MultiLineKind::Code => TokenKind::MultiLineCodeClose,
            MultiLineKind::Regex => TokenKind::MultiLineRegexClose,
            MultiLineKind::Bytes => TokenKind::MultiLineBytesClose,
        };
        Ok(self.token(token_kind, begin, marker, TokenContent::None))
    }

    /// Scan the content of the line after the indentation.
    fn scan_content_rest(&mut self, kind: MultiLineKind) -> Result<Token, Error> {
        let begin = self.current.position;
        let mut raw = String::new();
        while let Some(c) = self.current_char_opt() {
            if is_line_break(c) {
                break;
            }
            raw.push(c);
            self.advance()?;
        }
        if raw.len() > MAX_TEXT_LENGTH {
            return Err(Error::with_location(
                ErrorCategory::LimitExceeded,
                "The text exceeds the maximum length.",
                self.location_at(begin),
            ));
        }
        let (token_kind, content) = match kind {
            MultiLineKind::Text => {
                let text = elcl_types::escape::unescape_text(&raw)
                    .map_err(|error| Error::from(error).at(self.location_at(begin)))?;
                (TokenKind::MultiLineText, TokenContent::Text(text))
            }
            MultiLineKind::Code => (TokenKind::MultiLineCode, TokenContent::Text(raw.clone())),
            MultiLineKind::Regex => (TokenKind::MultiLineRegex, TokenContent::Text(raw.clone())),
            MultiLineKind::Bytes => {
                let bytes = Bytes::from_hex(&raw)
                    .map_err(|error| Error::from(error).at(self.location_at(begin)))?;
                (TokenKind::MultiLineBytes, TokenContent::Bytes(bytes))
            }
        };
        Ok(self.token(token_kind, begin, raw, content))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{collect_kinds, lexer_for};
    use super::*;

    fn content_texts(document: &str) -> Vec<String> {
        let mut lexer = lexer_for(document);
        let mut texts = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            match token.kind {
                TokenKind::EndOfData => break,
                TokenKind::MultiLineText | TokenKind::MultiLineCode | TokenKind::MultiLineRegex => {
                    texts.push(token.content.as_text().to_string());
                }
                _ => {}
            }
        }
        texts
    }

    #[test]
    fn multi_line_text_token_sequence() {
        use TokenKind::*;
        let document = "body:\n    \"\"\"\n    hello\n    world\n    \"\"\"\n";
        assert_eq!(
            collect_kinds(document),
            vec![
                RegularName,
                NameValueSeparator,
                LineBreak,
                Indentation,
                MultiLineTextOpen,
                LineBreak,
                Indentation,
                MultiLineText,
                LineBreak,
                Indentation,
                MultiLineText,
                LineBreak,
                Indentation,
                MultiLineTextClose,
                LineBreak,
            ]
        );
        assert_eq!(content_texts(document), vec!["hello", "world"]);
    }

    #[test]
    fn multi_line_code_with_language() {
        use TokenKind::*;
        let document = "code:\n    ```rust\n    let x = 1;\n    ```\n";
        assert_eq!(
            collect_kinds(document),
            vec![
                RegularName,
                NameValueSeparator,
                LineBreak,
                Indentation,
                MultiLineCodeOpen,
                MultiLineCodeLanguage,
                LineBreak,
                Indentation,
                MultiLineCode,
                LineBreak,
                Indentation,
                MultiLineCodeClose,
                LineBreak,
            ]
        );
        assert_eq!(content_texts(document), vec!["let x = 1;"]);
    }

    #[test]
    fn empty_lines_are_preserved() {
        use TokenKind::*;
        let document = "body:\n    \"\"\"\n    one\n\n    two\n    \"\"\"\n";
        assert_eq!(
            collect_kinds(document),
            vec![
                RegularName,
                NameValueSeparator,
                LineBreak,
                Indentation,
                MultiLineTextOpen,
                LineBreak,
                Indentation,
                MultiLineText,
                LineBreak,
                LineBreak,
                Indentation,
                MultiLineText,
                LineBreak,
                Indentation,
                MultiLineTextClose,
                LineBreak,
            ]
        );
    }

    #[test]
    fn inconsistent_indentation_is_an_error() {
        let document = "body:\n    \"\"\"\n    one\n  two\n    \"\"\"\n";
        let mut lexer = lexer_for(document);
        let error = loop {
            match lexer.next_token() {
                Ok(token) if token.kind == TokenKind::EndOfData => {
                    panic!("expected an error")
                }
                Ok(_) => {}
                Err(error) => break error,
            }
        };
        assert_eq!(error.category(), ErrorCategory::Syntax);
    }

    #[test]
    fn extra_spacing_belongs_to_the_content() {
        let document = "body:\n    \"\"\"\n    one\n      indented\n    \"\"\"\n";
        assert_eq!(content_texts(document), vec!["one", "  indented"]);
    }

    #[test]
    fn multi_line_bytes_with_format() {
        let document = "data:\n    <<<hex\n    0102\n    aabb\n    >>>\n";
        let mut lexer = lexer_for(document);
        let mut bytes = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            match token.kind {
                TokenKind::EndOfData => break,
                TokenKind::MultiLineBytes => {
                    let TokenContent::Bytes(data) = token.content else {
                        panic!("expected byte content");
                    };
                    bytes.push(data.to_hex());
                }
                TokenKind::MultiLineBytesFormat => {
                    assert_eq!(token.content.as_text(), "hex");
                }
                _ => {}
            }
        }
        assert_eq!(bytes, vec!["0102", "aabb"]);
    }

    #[test]
    fn multi_line_regex_content_is_raw() {
        let document = "pattern:\n    ///\n    \\d+ # digits\n    ///\n";
        assert_eq!(content_texts(document), vec!["\\d+ # digits"]);
    }
}
