//! The character stream: UTF-8 decoding, position tracking and hashing.

use std::sync::Arc;

use elcl_types::{Bytes, Location, Position, SourceIdentifier};

use crate::chars::is_valid_lang_char;
use crate::digest::{HashAlgorithm, RollingHash};
use crate::error::{Error, ErrorCategory};
use crate::limits::MAX_LINE_LENGTH;
use crate::source::Source;

/// A single decoded character with its document position.
///
/// The character is `None` when the end of the document was reached.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DecodedChar {
    /// The decoded character, or `None` at the end of the document.
    pub(crate) c: Option<char>,
    /// The position of the character in the document.
    pub(crate) position: Position,
}

impl DecodedChar {
    /// Test if this marks the end of the document.
    pub(crate) fn is_end(&self) -> bool {
        self.c.is_none()
    }
}

/// Decodes a document source into a lazy sequence of characters.
///
/// The stream reads one line at a time, validates the UTF-8 encoding and
/// the character set, tracks the position and feeds the raw line data
/// into the rolling document hash when hashing is enabled. Hashing is
/// enabled automatically when the first line of the document starts with
/// a `@signature` meta value.
#[derive(Debug)]
pub(crate) struct CharStream {
    source: Box<dyn Source>,
    line: Vec<u8>,
    line_index: usize,
    position: Position,
    end_of_data: bool,
    hash_enabled: bool,
    hash: Option<RollingHash>,
    digest: Option<(HashAlgorithm, Bytes)>,
}

impl CharStream {
    /// Create a new stream over an opened source.
    pub(crate) fn new(source: Box<dyn Source>) -> Self {
        Self {
            source,
            line: Vec::new(),
            line_index: 0,
            // Starts one line before the document; advanced on the first read.
            position: Position::new(0, 0),
            end_of_data: false,
            hash_enabled: false,
            hash: Some(RollingHash::new(HashAlgorithm::default())),
            digest: None,
        }
    }

    /// The identifier of the underlying source.
    pub(crate) fn source_identifier(&self) -> Arc<SourceIdentifier> {
        self.source.identifier()
    }

    /// Enable hashing regardless of a `@signature` line.
    ///
    /// Used to create the digest when signing a document. A `@signature`
    /// line at the start of the document is still excluded from the hash.
    pub(crate) fn enable_hashing(&mut self, algorithm: HashAlgorithm) {
        self.hash_enabled = true;
        self.hash = Some(RollingHash::new(algorithm));
    }

    /// The finalized digest, available after the end of the document was
    /// reached and only if hashing was enabled.
    pub(crate) fn digest(&self) -> Option<&(HashAlgorithm, Bytes)> {
        self.digest.as_ref()
    }

    /// Close the underlying source.
    pub(crate) fn close(&mut self) {
        self.source.close();
    }

    /// Decode and return the next character.
    pub(crate) fn next_char(&mut self) -> Result<DecodedChar, Error> {
        if self.end_of_data {
            return Ok(self.create_end_of_data());
        }
        if self.line_index >= self.line.len() {
            if self.source.at_end() {
                return Ok(self.create_end_of_data());
            }
            self.read_next_line()?;
            if self.line.is_empty() {
                return Ok(self.create_end_of_data());
            }
            self.position.next_line();
        } else {
            self.position.next_column();
        }
        let c = self.decode_next()?;
        if c == '\u{feff}' {
            if self.position == Position::new(1, 1) {
                // Skip a BOM at the very start of the document.
                return self.next_char();
            }
            return Err(self.encoding_error("Read a BOM in the middle of the document."));
        }
        if !is_valid_lang_char(c) {
            return Err(Error::with_location(
                ErrorCategory::Character,
                "Invalid control character.",
                self.location(),
            ));
        }
        Ok(DecodedChar {
            c: Some(c),
            position: self.position,
        })
    }

    /// Read the next line from the source and update the hash.
    fn read_next_line(&mut self) -> Result<(), Error> {
        self.source.read_line(&mut self.line)?;
        let content_length = self.line_content_length();
        if content_length > MAX_LINE_LENGTH {
            // The position still points at the previous line; report the
            // error at the start of the overlong line.
            self.position.next_line();
            return Err(self.encoding_error("The line exceeds the maximum length of 4000 bytes."));
        }
        if self.position.line() == 0 && self.is_signature_line() {
            // The first line carries a signature: enable hashing and
            // exclude this line from the digest.
            self.hash_enabled = true;
        } else if self.hash_enabled && !self.line.is_empty() {
            if let Some(hash) = self.hash.as_mut() {
                hash.update(&self.line);
            }
        }
        self.line_index = 0;
        Ok(())
    }

    /// The length of the current line without its terminator.
    fn line_content_length(&self) -> usize {
        let mut length = self.line.len();
        if length > 0 && self.line[length - 1] == b'\n' {
            length -= 1;
        }
        if length > 0 && self.line[length - 1] == b'\r' {
            length -= 1;
        }
        length
    }

    /// Decode the UTF-8 sequence at the current line index.
    fn decode_next(&mut self) -> Result<char, Error> {
        let first = self.line[self.line_index];
        let length = match first {
            0x00..=0x7f => 1,
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => {
                return Err(self.encoding_error("Invalid UTF-8 start byte."));
            }
        };
        if self.line_index + length > self.line.len() {
            return Err(self.encoding_error("Truncated UTF-8 sequence."));
        }
        let bytes = &self.line[self.line_index..self.line_index + length];
        let c = std::str::from_utf8(bytes)
            .ok()
            .and_then(|text| text.chars().next())
            .ok_or_else(|| self.encoding_error("Invalid UTF-8 sequence."))?;
        self.line_index += length;
        Ok(c)
    }

    /// Create the end-of-data sentinel and finalize the hash.
    fn create_end_of_data(&mut self) -> DecodedChar {
        if !self.end_of_data {
            if self.position.is_undefined() || self.position == Position::new(0, 0) {
                self.position = Position::new(1, 1);
            } else {
                self.position.next_column();
            }
            self.end_of_data = true;
            if self.hash_enabled {
                if let Some(hash) = self.hash.take() {
                    self.digest = Some((hash.algorithm(), hash.finalize()));
                }
            }
        }
        DecodedChar {
            c: None,
            position: self.position,
        }
    }

    /// Test if the current line starts with a `@signature` meta value.
    ///
    /// The detection works on raw bytes, accepts any letter case and
    /// skips a leading BOM.
    fn is_signature_line(&self) -> bool {
        const LOWER: &[u8] = b"@signature";
        const UPPER: &[u8] = b"@SIGNATURE";
        let mut start = 0;
        if self.line.starts_with(&[0xef, 0xbb, 0xbf]) {
            start = 3;
        }
        if self.line.len() < start + LOWER.len() {
            return false;
        }
        LOWER
            .iter()
            .zip(UPPER.iter())
            .enumerate()
            .all(|(index, (lower, upper))| {
                let byte = self.line[start + index];
                byte == *lower || byte == *upper
            })
    }

    /// The current location in the document.
    pub(crate) fn location(&self) -> Location {
        Location::new(self.source.identifier(), self.position)
    }

    fn encoding_error(&self, message: &str) -> Error {
        Error::with_location(ErrorCategory::Encoding, message, self.location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::TextSource;

    fn stream_for(text: &str) -> CharStream {
        let mut source = TextSource::new(text);
        source.open().unwrap();
        CharStream::new(Box::new(source))
    }

    fn collect_chars(stream: &mut CharStream) -> Vec<(char, i32, i32)> {
        let mut result = Vec::new();
        loop {
            let decoded = stream.next_char().unwrap();
            let Some(c) = decoded.c else {
                break;
            };
            result.push((c, decoded.position.line(), decoded.position.column()));
        }
        result
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let mut stream = stream_for("ab\ncd");
        let chars = collect_chars(&mut stream);
        assert_eq!(
            chars,
            vec![
                ('a', 1, 1),
                ('b', 1, 2),
                ('\n', 1, 3),
                ('c', 2, 1),
                ('d', 2, 2),
            ]
        );
    }

    #[test]
    fn end_of_data_repeats() {
        let mut stream = stream_for("");
        assert!(stream.next_char().unwrap().is_end());
        assert!(stream.next_char().unwrap().is_end());
    }

    #[test]
    fn bom_is_skipped_at_document_start() {
        let mut stream = stream_for("\u{feff}a");
        let decoded = stream.next_char().unwrap();
        assert_eq!(decoded.c, Some('a'));
    }

    #[test]
    fn bom_inside_document_is_an_error() {
        let mut stream = stream_for("a\u{feff}");
        stream.next_char().unwrap();
        let error = stream.next_char().unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Encoding);
    }

    #[test]
    fn control_characters_are_rejected() {
        let mut stream = stream_for("a\u{1b}b");
        stream.next_char().unwrap();
        let error = stream.next_char().unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Character);
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let mut source = TextSource::from_bytes(vec![b'a', 0xff, b'b']);
        source.open().unwrap();
        let mut stream = CharStream::new(Box::new(source));
        stream.next_char().unwrap();
        let error = stream.next_char().unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Encoding);
    }

    #[test]
    fn overlong_line_is_an_encoding_error() {
        let text = "x".repeat(MAX_LINE_LENGTH + 1);
        let mut stream = stream_for(&text);
        let error = stream.next_char().unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Encoding);
    }

    #[test]
    fn line_at_limit_is_accepted() {
        let text = "x".repeat(MAX_LINE_LENGTH);
        let mut stream = stream_for(&text);
        assert_eq!(stream.next_char().unwrap().c, Some('x'));
    }

    #[test]
    fn signature_line_enables_hashing() {
        let mut stream = stream_for("@signature: \"data\"\n[main]\n");
        while !stream.next_char().unwrap().is_end() {}
        let (algorithm, digest) = stream.digest().unwrap();
        assert_eq!(*algorithm, HashAlgorithm::Sha3_256);
        // Only the second line is part of the digest.
        let mut hash = RollingHash::new(HashAlgorithm::Sha3_256);
        hash.update(b"[main]\n");
        assert_eq!(*digest, hash.finalize());
    }

    #[test]
    fn without_signature_no_digest_is_created() {
        let mut stream = stream_for("[main]\n");
        while !stream.next_char().unwrap().is_end() {}
        assert!(stream.digest().is_none());
    }
}
