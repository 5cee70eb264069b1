//! Scanning of value literals.

use std::str::FromStr;

use elcl_types::{Bytes, Date, DateTime, Position, Time, TimeDelta, TimeUnit};

use super::{Lexer, MultiLineKind, safe};
use crate::chars::{
    is_format_identifier_char, is_integer_suffix_char, is_line_break, is_value_end_char,
};
use crate::error::{Error, ErrorCategory};
use crate::limits::{MAX_BINARY_DIGITS, MAX_DECIMAL_DIGITS, MAX_HEXADECIMAL_DIGITS};
use crate::token::{Token, TokenContent, TokenKind};

impl Lexer {
    /// Scan a token in value context.
    pub(super) fn scan_value_token(&mut self) -> Result<Token, Error> {
        let begin = self.current.position;
        match self.current_char() {
            '"' => {
                if self.peek_char(1)? == Some('"') && self.peek_char(2)? == Some('"') {
                    self.advance()?;
                    self.advance()?;
                    self.advance()?;
                    self.pending_multi_line = Some(MultiLineKind::Text);
                    return Ok(self.token(
                        TokenKind::MultiLineTextOpen,
                        begin,
                        "\"\"\"",
                        TokenContent::None,
                    ));
                }
                let (raw, text) = self.scan_quoted_text()?;
                Ok(self.token(TokenKind::Text, begin, raw, TokenContent::Text(text)))
            }
            '`' => {
                if self.peek_char(1)? == Some('`') && self.peek_char(2)? == Some('`') {
                    self.advance()?;
                    self.advance()?;
                    self.advance()?;
                    self.pending_multi_line = Some(MultiLineKind::Code);
                    let token =
                        self.token(TokenKind::MultiLineCodeOpen, begin, "```", TokenContent::None);
                    self.queue_identifier_token(TokenKind::MultiLineCodeLanguage)?;
                    return Ok(token);
                }
                self.scan_code_literal()
            }
            '/' => {
                if self.peek_char(1)? == Some('/') && self.peek_char(2)? == Some('/') {
                    self.advance()?;
                    self.advance()?;
                    self.advance()?;
                    self.pending_multi_line = Some(MultiLineKind::Regex);
                    return Ok(self.token(
                        TokenKind::MultiLineRegexOpen,
                        begin,
                        "///",
                        TokenContent::None,
                    ));
                }
                self.scan_regex_literal()
            }
            '<' => {
                if self.peek_char(1)? == Some('<') && self.peek_char(2)? == Some('<') {
                    self.advance()?;
                    self.advance()?;
                    self.advance()?;
                    self.pending_multi_line = Some(MultiLineKind::Bytes);
                    let token = self.token(
                        TokenKind::MultiLineBytesOpen,
                        begin,
                        "<<<",
                        TokenContent::None,
                    );
                    self.queue_identifier_token(TokenKind::MultiLineBytesFormat)?;
                    return Ok(token);
                }
                self.scan_bytes_literal()
            }
            ',' => {
                self.advance()?;
                Ok(self.token(TokenKind::ValueListSeparator, begin, ",", TokenContent::None))
            }
            '*' => {
                self.advance()?;
                Ok(self.token(
                    TokenKind::MultiLineValueListSeparator,
                    begin,
                    "*",
                    TokenContent::None,
                ))
            }
            c if c.is_ascii_digit() || c == '+' || c == '-' || c.is_ascii_alphabetic() => {
                self.scan_value_word()
            }
            c => Err(self.syntax_error_at(
                begin,
                format!("Unexpected character '{}' in a value.", safe(c)),
            )),
        }
    }

    /// Scan an identifier directly attached to a multi-line opening and
    /// queue it as a token of the given kind.
    fn queue_identifier_token(&mut self, kind: TokenKind) -> Result<(), Error> {
        let begin = self.current.position;
        let mut raw = String::new();
        while let Some(c) = self.current_char_opt() {
            if !is_format_identifier_char(c) {
                break;
            }
            raw.push(c);
            self.advance()?;
        }
        if raw.is_empty() {
            return Ok(());
        }
        if kind == TokenKind::MultiLineBytesFormat && !raw.eq_ignore_ascii_case("hex") {
            return Err(Error::with_location(
                ErrorCategory::Unsupported,
                format!("The byte-data format '{raw}' is not supported."),
                self.location_at(begin),
            ));
        }
        let content = TokenContent::Text(raw.to_ascii_lowercase());
        let token = self.token(kind, begin, raw, content);
        self.queue.push_back(token);
        Ok(())
    }

    /// Scan a single-line code literal in backticks; no escape sequences.
    fn scan_code_literal(&mut self) -> Result<Token, Error> {
        let begin = self.current.position;
        self.advance()?;
        let mut raw = String::from("`");
        let mut content = String::new();
        loop {
            match self.current_char_opt() {
                None => {
                    return Err(Error::with_location(
                        ErrorCategory::UnexpectedEnd,
                        "The document ends inside a code literal.",
                        self.location_at(begin),
                    ));
                }
                Some(c) if is_line_break(c) => {
                    return Err(self.syntax_error_at(
                        begin,
                        "A code literal is not closed before the end of the line.",
                    ));
                }
                Some('`') => {
                    raw.push('`');
                    self.advance()?;
                    break;
                }
                Some(c) => {
                    raw.push(c);
                    content.push(c);
                    self.advance()?;
                }
            }
        }
        Ok(self.token(TokenKind::Code, begin, raw, TokenContent::Text(content)))
    }

    /// Scan a single-line regular expression literal between slashes.
    ///
    /// A backslash keeps the following character verbatim; only `\/`
    /// unescapes into a plain slash.
    fn scan_regex_literal(&mut self) -> Result<Token, Error> {
        let begin = self.current.position;
        self.advance()?;
        let mut raw = String::from("/");
        let mut content = String::new();
        loop {
            match self.current_char_opt() {
                None => {
                    return Err(Error::with_location(
                        ErrorCategory::UnexpectedEnd,
                        "The document ends inside a regular expression literal.",
                        self.location_at(begin),
                    ));
                }
                Some(c) if is_line_break(c) => {
                    return Err(self.syntax_error_at(
                        begin,
                        "A regular expression is not closed before the end of the line.",
                    ));
                }
                Some('/') => {
                    raw.push('/');
                    self.advance()?;
                    break;
                }
                Some('\\') => {
                    raw.push('\\');
                    self.advance()?;
                    match self.current_char_opt() {
                        Some('/') => {
                            raw.push('/');
                            content.push('/');
                            self.advance()?;
                        }
                        Some(c) if !is_line_break(c) => {
                            raw.push(c);
                            content.push('\\');
                            content.push(c);
                            self.advance()?;
                        }
                        _ => content.push('\\'),
                    }
                }
                Some(c) => {
                    raw.push(c);
                    content.push(c);
                    self.advance()?;
                }
            }
        }
        Ok(self.token(TokenKind::Regex, begin, raw, TokenContent::Text(content)))
    }

    /// Scan a single-line byte-data literal between angle brackets.
    fn scan_bytes_literal(&mut self) -> Result<Token, Error> {
        let begin = self.current.position;
        self.advance()?;
        let mut raw = String::from("<");
        let mut hex = String::new();
        loop {
            match self.current_char_opt() {
                None => {
                    return Err(Error::with_location(
                        ErrorCategory::UnexpectedEnd,
                        "The document ends inside a byte-data literal.",
                        self.location_at(begin),
                    ));
                }
                Some(c) if is_line_break(c) => {
                    return Err(self.syntax_error_at(
                        begin,
                        "A byte-data literal is not closed before the end of the line.",
                    ));
                }
                Some('>') => {
                    raw.push('>');
                    self.advance()?;
                    break;
                }
                Some(c) => {
                    raw.push(c);
                    hex.push(c);
                    self.advance()?;
                }
            }
        }
        let bytes =
            Bytes::from_hex(&hex).map_err(|error| Error::from(error).at(self.location_at(begin)))?;
        Ok(self.token(TokenKind::Bytes, begin, raw, TokenContent::Bytes(bytes)))
    }

    /// Scan a bare value word and classify it.
    ///
    /// This covers booleans, `inf`/`nan`, integers with their suffixes,
    /// floats, dates, times, date-times and time-deltas.
    fn scan_value_word(&mut self) -> Result<Token, Error> {
        let begin = self.current.position;
        let word = self.scan_word()?;
        let lower = word.to_ascii_lowercase();
        match lower.as_str() {
            "true" | "yes" | "on" | "enabled" => {
                return Ok(self.token(
                    TokenKind::Boolean,
                    begin,
                    word,
                    TokenContent::Boolean(true),
                ));
            }
            "false" | "no" | "off" | "disabled" => {
                return Ok(self.token(
                    TokenKind::Boolean,
                    begin,
                    word,
                    TokenContent::Boolean(false),
                ));
            }
            "inf" | "+inf" => {
                return Ok(self.token(
                    TokenKind::Float,
                    begin,
                    word,
                    TokenContent::Float(f64::INFINITY),
                ));
            }
            "-inf" => {
                return Ok(self.token(
                    TokenKind::Float,
                    begin,
                    word,
                    TokenContent::Float(f64::NEG_INFINITY),
                ));
            }
            "nan" | "+nan" | "-nan" => {
                return Ok(self.token(TokenKind::Float, begin, word, TokenContent::Float(f64::NAN)));
            }
            _ => {}
        }
        if is_date_like(&word) {
            return self.scan_date_or_date_time(begin, word);
        }
        if is_time_like(&word) {
            let time = Time::from_str(&word)
                .map_err(|error| Error::from(error).at(self.location_at(begin)))?;
            return Ok(self.token(TokenKind::Time, begin, word, TokenContent::Time(time)));
        }
        self.scan_number(begin, word)
    }

    /// Scan characters up to the next value boundary.
    fn scan_word(&mut self) -> Result<String, Error> {
        let mut word = String::new();
        while let Some(c) = self.current_char_opt() {
            if is_value_end_char(c) {
                break;
            }
            word.push(c);
            self.advance()?;
        }
        Ok(word)
    }

    /// Classify a word starting like a date as a date or date-time.
    ///
    /// A date followed by a single space and a time merges into one
    /// date-time token.
    fn scan_date_or_date_time(&mut self, begin: Position, word: String) -> Result<Token, Error> {
        let location = self.location_at(begin);
        if word.len() > 10 {
            // The time part is attached with a `t` separator.
            let date_time =
                DateTime::from_str(&word).map_err(|error| Error::from(error).at(location))?;
            return Ok(self.token(
                TokenKind::DateTime,
                begin,
                word,
                TokenContent::DateTime(date_time),
            ));
        }
        let date = Date::from_str(&word).map_err(|error| Error::from(error).at(location))?;
        // A time may follow, separated by a single space.
        if self.current_char_opt() == Some(' ') {
            let mut time_follows = matches!(self.peek_char(1)?, Some(c) if c.is_ascii_digit());
            if !time_follows && matches!(self.peek_char(1)?, Some('t' | 'T')) {
                time_follows = matches!(self.peek_char(2)?, Some(c) if c.is_ascii_digit());
            }
            if time_follows {
                self.advance()?; // the space
                let time_word = self.scan_word()?;
                let combined = format!("{word} {time_word}");
                let date_time = DateTime::from_str(&combined)
                    .map_err(|error| Error::from(error).at(self.location_at(begin)))?;
                return Ok(self.token(
                    TokenKind::DateTime,
                    begin,
                    combined,
                    TokenContent::DateTime(date_time),
                ));
            }
        }
        Ok(self.token(TokenKind::Date, begin, word, TokenContent::Date(date)))
    }

    /// Parse an integer or float literal, including integer suffixes.
    fn scan_number(&mut self, begin: Position, word: String) -> Result<Token, Error> {
        let location = self.location_at(begin);
        let rest = word
            .strip_prefix(['+', '-'])
            .unwrap_or(word.as_str())
            .to_string();
        let negative = word.starts_with('-');
        let explicit_sign = word.starts_with(['+', '-']);
        if rest.starts_with("0x") || rest.starts_with("0X") {
            let digits = rest[2..].to_string();
            return self.radix_integer_token(
                begin,
                word.clone(),
                digits,
                negative,
                explicit_sign,
                16,
                MAX_HEXADECIMAL_DIGITS,
            );
        }
        if rest.starts_with("0b") || rest.starts_with("0B") {
            let digits = rest[2..].to_string();
            return self.radix_integer_token(
                begin,
                word.clone(),
                digits,
                negative,
                explicit_sign,
                2,
                MAX_BINARY_DIGITS,
            );
        }
        if rest.contains(['.', 'e', 'E']) {
            return self.float_token(begin, word);
        }
        // Split a trailing suffix, e.g. `10s` or `4kb`.
        let suffix_start = rest
            .char_indices()
            .find(|(_, c)| is_integer_suffix_char(*c))
            .map(|(index, _)| index)
            .unwrap_or(rest.len());
        let digits = rest[..suffix_start].to_string();
        let mut suffix = rest[suffix_start..].to_string();
        if digits.is_empty() {
            return Err(self.syntax_error_at(begin, format!("Invalid value '{word}'.")));
        }
        let digits = strip_digit_separators(&digits, &location)?;
        if digits.len() > MAX_DECIMAL_DIGITS {
            return Err(self.syntax_error_at(
                begin,
                "A decimal integer literal must not exceed 19 digits.",
            ));
        }
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(self.syntax_error_at(begin, format!("Invalid number '{word}'.")));
        }
        let magnitude: i128 = digits
            .parse()
            .map_err(|_| self.syntax_error_at(begin, format!("Invalid number '{word}'.")))?;
        let value = apply_sign(magnitude, negative, &location)?;
        // A suffix may also follow after a single space, e.g. `10 seconds`.
        let mut raw = word;
        if suffix.is_empty() {
            if let Some(spaced) = self.scan_spaced_suffix()? {
                raw.push(' ');
                raw.push_str(&spaced);
                suffix = spaced;
            }
        }
        if suffix.is_empty() {
            return Ok(self.token(TokenKind::Integer, begin, raw, TokenContent::Integer(value)));
        }
        self.suffixed_integer_token(begin, raw, value, &suffix)
    }

    /// Parse a hexadecimal or binary integer literal.
    #[allow(clippy::too_many_arguments)]
    fn radix_integer_token(
        &mut self,
        begin: Position,
        word: String,
        digits: String,
        negative: bool,
        explicit_sign: bool,
        radix: u32,
        max_digits: usize,
    ) -> Result<Token, Error> {
        let location = self.location_at(begin);
        let digits = strip_digit_separators(&digits, &location)?;
        if digits.is_empty() {
            return Err(self.syntax_error_at(begin, format!("Invalid number '{word}'.")));
        }
        if digits.len() > max_digits {
            let name = if radix == 16 { "hexadecimal" } else { "binary" };
            return Err(self.syntax_error_at(
                begin,
                format!("A {name} integer literal must not exceed {max_digits} digits."),
            ));
        }
        let magnitude = u64::from_str_radix(&digits, radix)
            .map_err(|_| self.syntax_error_at(begin, format!("Invalid number '{word}'.")))?;
        let value = if explicit_sign {
            apply_sign(i128::from(magnitude), negative, &location)?
        } else {
            // An unsigned literal is the raw two's-complement bit pattern.
            magnitude as i64
        };
        Ok(self.token(TokenKind::Integer, begin, word, TokenContent::Integer(value)))
    }

    /// Parse a float literal.
    fn float_token(&mut self, begin: Position, word: String) -> Result<Token, Error> {
        let location = self.location_at(begin);
        let unsigned = word.strip_prefix(['+', '-']).unwrap_or(word.as_str());
        if !unsigned.starts_with(|c: char| c.is_ascii_digit()) || word.ends_with('.') {
            return Err(self.syntax_error_at(begin, format!("Invalid number '{word}'.")));
        }
        let stripped = strip_digit_separators(&word, &location)?;
        let value: f64 = stripped
            .parse()
            .map_err(|_| self.syntax_error_at(begin, format!("Invalid number '{word}'.")))?;
        Ok(self.token(TokenKind::Float, begin, word, TokenContent::Float(value)))
    }

    /// Look ahead for a suffix after a single space and consume it if it
    /// is one.
    fn scan_spaced_suffix(&mut self) -> Result<Option<String>, Error> {
        if self.current_char_opt() != Some(' ') {
            return Ok(None);
        }
        let mut suffix = String::new();
        let mut offset = 1;
        loop {
            match self.peek_char(offset)? {
                Some(c) if is_integer_suffix_char(c) => {
                    suffix.push(c);
                    offset += 1;
                }
                Some(c) if is_value_end_char(c) => break,
                None => break,
                _ => return Ok(None),
            }
        }
        if suffix.is_empty() || !is_known_suffix(&suffix) {
            return Ok(None);
        }
        for _ in 0..offset {
            self.advance()?;
        }
        Ok(Some(suffix))
    }

    /// Turn an integer and its suffix into the final token.
    fn suffixed_integer_token(
        &mut self,
        begin: Position,
        raw: String,
        value: i64,
        suffix: &str,
    ) -> Result<Token, Error> {
        let normalized = lowercase_suffix(suffix);
        if let Some(unit) = TimeUnit::from_suffix(&normalized) {
            let delta = TimeDelta::from_count(unit, value);
            return Ok(self.token(
                TokenKind::TimeDelta,
                begin,
                raw,
                TokenContent::TimeDelta(delta),
            ));
        }
        if let Some(factor) = byte_count_factor(&normalized) {
            let scaled = value.checked_mul(factor).ok_or_else(|| {
                Error::with_location(
                    ErrorCategory::LimitExceeded,
                    format!("The byte count '{raw}' exceeds the integer range."),
                    self.location_at(begin),
                )
            })?;
            return Ok(self.token(
                TokenKind::Integer,
                begin,
                raw,
                TokenContent::Integer(scaled),
            ));
        }
        Err(Error::with_location(
            ErrorCategory::Unsupported,
            format!("The integer suffix '{suffix}' is not supported."),
            self.location_at(begin),
        ))
    }
}

/// Test if a word starts like a date literal: `DDDD-`.
fn is_date_like(word: &str) -> bool {
    let bytes = word.as_bytes();
    bytes.len() >= 10
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..7].iter().all(u8::is_ascii_digit)
}

/// Test if a word starts like a time literal: `HH:` or `tHH:`.
fn is_time_like(word: &str) -> bool {
    let bytes = word.as_bytes();
    let start = usize::from(bytes.first().is_some_and(|b| *b == b't' || *b == b'T'));
    bytes.len() >= start + 3
        && bytes[start..start + 2].iter().all(u8::is_ascii_digit)
        && bytes[start + 2] == b':'
}

/// Remove `'` digit separators, validating their placement.
fn strip_digit_separators(digits: &str, location: &elcl_types::Location) -> Result<String, Error> {
    if digits.contains('\'') {
        let mut previous_was_digit = false;
        for c in digits.chars() {
            if c == '\'' {
                if !previous_was_digit {
                    return Err(Error::with_location(
                        ErrorCategory::Syntax,
                        "A digit separator must stand between two digits.",
                        location.clone(),
                    ));
                }
                previous_was_digit = false;
            } else {
                previous_was_digit = true;
            }
        }
        if digits.ends_with('\'') {
            return Err(Error::with_location(
                ErrorCategory::Syntax,
                "A digit separator must stand between two digits.",
                location.clone(),
            ));
        }
    }
    Ok(digits.chars().filter(|c| *c != '\'').collect())
}

/// Apply the sign of a literal and check the 64-bit range.
fn apply_sign(magnitude: i128, negative: bool, location: &elcl_types::Location) -> Result<i64, Error> {
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).map_err(|_| {
        Error::with_location(
            ErrorCategory::Syntax,
            "The number is outside the 64-bit integer range.",
            location.clone(),
        )
    })
}

/// Map a suffix to lowercase; `µ` has no uppercase ASCII form.
fn lowercase_suffix(suffix: &str) -> String {
    suffix
        .chars()
        .map(|c| {
            if c.is_ascii() {
                c.to_ascii_lowercase()
            } else {
                c
            }
        })
        .collect()
}

/// Test if a suffix is a known time unit or byte count.
fn is_known_suffix(suffix: &str) -> bool {
    let normalized = lowercase_suffix(suffix);
    TimeUnit::from_suffix(&normalized).is_some() || byte_count_factor(&normalized).is_some()
}

/// The multiplication factor of a byte-count suffix.
fn byte_count_factor(suffix: &str) -> Option<i64> {
    Some(match suffix {
        "kb" => 1_000,
        "mb" => 1_000_000,
        "gb" => 1_000_000_000,
        "tb" => 1_000_000_000_000,
        "pb" => 1_000_000_000_000_000,
        "eb" => 1_000_000_000_000_000_000,
        "kib" => 1 << 10,
        "mib" => 1 << 20,
        "gib" => 1 << 30,
        "tib" => 1i64 << 40,
        "pib" => 1i64 << 50,
        "eib" => 1i64 << 60,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::super::tests::lexer_for;
    use super::*;

    fn first_value_token(value: &str) -> Result<Token, Error> {
        let mut lexer = lexer_for(&format!("value: {value}\n"));
        for _ in 0..3 {
            lexer.next_token()?; // name, separator, spacing
        }
        lexer.next_token()
    }

    #[track_caller]
    fn expect_content(value: &str, kind: TokenKind, content: TokenContent) {
        let token = first_value_token(value).unwrap();
        assert_eq!(token.kind, kind);
        assert_eq!(token.content, content);
    }

    #[track_caller]
    fn expect_error(value: &str, category: ErrorCategory) {
        let error = first_value_token(value).unwrap_err();
        assert_eq!(error.category(), category, "{error}");
    }

    #[test]
    fn integers() {
        expect_content("42", TokenKind::Integer, TokenContent::Integer(42));
        expect_content("-42", TokenKind::Integer, TokenContent::Integer(-42));
        expect_content("+42", TokenKind::Integer, TokenContent::Integer(42));
        expect_content("1'000'000", TokenKind::Integer, TokenContent::Integer(1_000_000));
        expect_content("0x1f", TokenKind::Integer, TokenContent::Integer(0x1f));
        expect_content("-0x10", TokenKind::Integer, TokenContent::Integer(-16));
        expect_content("0b1010", TokenKind::Integer, TokenContent::Integer(10));
        expect_content(
            "0xffffffffffffffff",
            TokenKind::Integer,
            TokenContent::Integer(-1),
        );
        expect_content(
            "9223372036854775807",
            TokenKind::Integer,
            TokenContent::Integer(i64::MAX),
        );
        expect_content(
            "-9223372036854775808",
            TokenKind::Integer,
            TokenContent::Integer(i64::MIN),
        );
    }

    #[test]
    fn integer_limits() {
        expect_error("12345678901234567890", ErrorCategory::Syntax);
        expect_error("9223372036854775808", ErrorCategory::Syntax);
        expect_error("0x1ffffffffffffffff", ErrorCategory::Syntax);
        expect_error("0b11111111111111111111111111111111111111111111111111111111111111111", ErrorCategory::Syntax);
        expect_error("1''0", ErrorCategory::Syntax);
        expect_error("'10", ErrorCategory::Syntax);
        expect_error("10'", ErrorCategory::Syntax);
    }

    #[test]
    fn floats() {
        expect_content("1.5", TokenKind::Float, TokenContent::Float(1.5));
        expect_content("-0.25", TokenKind::Float, TokenContent::Float(-0.25));
        expect_content("1e3", TokenKind::Float, TokenContent::Float(1000.0));
        expect_content("2.5E-1", TokenKind::Float, TokenContent::Float(0.25));
        expect_content("inf", TokenKind::Float, TokenContent::Float(f64::INFINITY));
        expect_content(
            "-INF",
            TokenKind::Float,
            TokenContent::Float(f64::NEG_INFINITY),
        );
        expect_error("1.", ErrorCategory::Syntax);
        expect_error(".5", ErrorCategory::Syntax);
    }

    #[test]
    fn nan_is_a_float() {
        let token = first_value_token("NaN").unwrap();
        assert_eq!(token.kind, TokenKind::Float);
        let TokenContent::Float(value) = token.content else {
            panic!("expected float content");
        };
        assert!(value.is_nan());
    }

    #[test]
    fn booleans() {
        expect_content("true", TokenKind::Boolean, TokenContent::Boolean(true));
        expect_content("Yes", TokenKind::Boolean, TokenContent::Boolean(true));
        expect_content("on", TokenKind::Boolean, TokenContent::Boolean(true));
        expect_content("enabled", TokenKind::Boolean, TokenContent::Boolean(true));
        expect_content("FALSE", TokenKind::Boolean, TokenContent::Boolean(false));
        expect_content("no", TokenKind::Boolean, TokenContent::Boolean(false));
        expect_content("off", TokenKind::Boolean, TokenContent::Boolean(false));
        expect_content("disabled", TokenKind::Boolean, TokenContent::Boolean(false));
    }

    #[test]
    fn dates_times_and_date_times() {
        expect_content(
            "2024-02-29",
            TokenKind::Date,
            TokenContent::Date(Date::new(2024, 2, 29).unwrap()),
        );
        expect_content(
            "16:45:00z",
            TokenKind::Time,
            TokenContent::Time(Time::from_str("16:45:00z").unwrap()),
        );
        expect_content(
            "2024-01-02 10:30:00",
            TokenKind::DateTime,
            TokenContent::DateTime(DateTime::from_str("2024-01-02 10:30:00").unwrap()),
        );
        expect_content(
            "2024-01-02T10:30:00",
            TokenKind::DateTime,
            TokenContent::DateTime(DateTime::from_str("2024-01-02 10:30:00").unwrap()),
        );
        expect_error("2024-13-01", ErrorCategory::Syntax);
        expect_error("25:00", ErrorCategory::Syntax);
    }

    #[test]
    fn time_deltas() {
        expect_content(
            "10s",
            TokenKind::TimeDelta,
            TokenContent::TimeDelta(TimeDelta::from_count(TimeUnit::Seconds, 10)),
        );
        expect_content(
            "-5ms",
            TokenKind::TimeDelta,
            TokenContent::TimeDelta(TimeDelta::from_count(TimeUnit::Milliseconds, -5)),
        );
        expect_content(
            "10 seconds",
            TokenKind::TimeDelta,
            TokenContent::TimeDelta(TimeDelta::from_count(TimeUnit::Seconds, 10)),
        );
        expect_content(
            "1 week",
            TokenKind::TimeDelta,
            TokenContent::TimeDelta(TimeDelta::from_count(TimeUnit::Weeks, 1)),
        );
        expect_content(
            "3 years",
            TokenKind::TimeDelta,
            TokenContent::TimeDelta(TimeDelta::from_count(TimeUnit::Years, 3)),
        );
    }

    #[test]
    fn byte_counts_scale_integers() {
        expect_content("4kb", TokenKind::Integer, TokenContent::Integer(4_000));
        expect_content("4KiB", TokenKind::Integer, TokenContent::Integer(4_096));
        expect_content("2 mb", TokenKind::Integer, TokenContent::Integer(2_000_000));
        expect_error("9000000000000000000kb", ErrorCategory::LimitExceeded);
    }

    #[test]
    fn unknown_suffix_is_unsupported() {
        expect_error("10parsec", ErrorCategory::Unsupported);
    }

    #[test]
    fn texts_and_codes() {
        expect_content(
            r#""hello\nworld""#,
            TokenKind::Text,
            TokenContent::Text(String::from("hello\nworld")),
        );
        expect_content(
            "`let x = 1;`",
            TokenKind::Code,
            TokenContent::Text(String::from("let x = 1;")),
        );
        expect_error("\"unterminated", ErrorCategory::Syntax);
    }

    #[test]
    fn regex_literal() {
        expect_content(
            r"/a+b\/c/",
            TokenKind::Regex,
            TokenContent::Text(String::from("a+b/c")),
        );
        expect_content(
            r"/\d+/",
            TokenKind::Regex,
            TokenContent::Text(String::from("\\d+")),
        );
    }

    #[test]
    fn bytes_literal() {
        expect_content(
            "<01 02 aF>",
            TokenKind::Bytes,
            TokenContent::Bytes(Bytes::from_hex("0102af").unwrap()),
        );
        expect_error("<012>", ErrorCategory::Syntax);
    }

    #[test]
    fn unexpected_word_is_an_error() {
        expect_error("hello", ErrorCategory::Syntax);
    }
}
