//! Escape handling for text literals and text names.

use crate::Error;

/// The context a text is escaped for.
///
/// The escape rules of the configuration language are identical for all
/// contexts, but the set of characters that must be escaped differs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum EscapeMode {
    /// Escaping for double-quoted text values.
    #[default]
    Text,
    /// Escaping for double-quoted text names, which also escapes
    /// characters that would be ambiguous in name paths.
    TextName,
    /// Conservative escaping for error messages and logs.
    ErrorText,
}

/// Encode a text with escape sequences for the given mode.
///
/// The surrounding double quotes are not added by this function.
#[must_use]
pub fn escape_text(text: &str, mode: EscapeMode) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '.' | ':' | '=' if mode == EscapeMode::TextName => {
                result.push_str(&format!("\\u{{{:x}}}", u32::from(c)));
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                result.push_str(&format!("\\u{{{:x}}}", u32::from(c)));
            }
            c if mode == EscapeMode::ErrorText && !c.is_ascii() => {
                result.push_str(&format!("\\u{{{:x}}}", u32::from(c)));
            }
            c => result.push(c),
        }
    }
    result
}

/// Decode all escape sequences in a text.
///
/// Expects the contents of a double-quoted literal, without the quotes.
/// Supported sequences are `\\`, `\"`, `\n`, `\r`, `\t` and `\u{…}` with
/// one to eight hex digits. The decoded code point must be valid and must
/// be neither zero nor the byte-order mark.
///
/// ## Examples
/// ```
/// use elcl_types::escape::unescape_text;
///
/// assert_eq!(unescape_text(r"one\ntwo").unwrap(), "one\ntwo");
/// assert_eq!(unescape_text(r"\u{41}").unwrap(), "A");
/// assert!(unescape_text(r"\u{0}").is_err());
/// assert!(unescape_text(r"\q").is_err());
/// ```
pub fn unescape_text(text: &str) -> Result<String, Error> {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('n' | 'N') => result.push('\n'),
            Some('r' | 'R') => result.push('\r'),
            Some('t' | 'T') => result.push('\t'),
            Some('u' | 'U') => {
                result.push(unescape_unicode(&mut chars)?);
            }
            Some(other) => {
                return Err(Error::InvalidEscape(format!("\\{other}")));
            }
            None => {
                return Err(Error::InvalidEscape(String::from(
                    "text ends in the middle of an escape sequence",
                )));
            }
        }
    }
    Ok(result)
}

/// Decode the `{…}` part of a unicode escape sequence.
fn unescape_unicode(chars: &mut std::str::Chars<'_>) -> Result<char, Error> {
    if chars.next() != Some('{') {
        return Err(Error::InvalidEscape(String::from(
            "expected '{' after '\\u'",
        )));
    }
    let mut digits = String::new();
    for c in chars.by_ref() {
        if c == '}' {
            if digits.is_empty() || digits.len() > 8 {
                return Err(Error::InvalidEscape(String::from(
                    "a unicode escape requires one to eight hex digits",
                )));
            }
            let code = u32::from_str_radix(&digits, 16)
                .map_err(|_| Error::InvalidEscape(digits.clone()))?;
            if code == 0 || code == 0xfeff {
                return Err(Error::InvalidEscape(format!(
                    "the code point u+{code:04x} is not allowed"
                )));
            }
            return char::from_u32(code).ok_or_else(|| {
                Error::InvalidEscape(format!("u+{code:04x} is no valid code point"))
            });
        }
        if !c.is_ascii_hexdigit() {
            return Err(Error::InvalidEscape(format!(
                "unexpected character '{c}' in unicode escape"
            )));
        }
        digits.push(c);
    }
    Err(Error::InvalidEscape(String::from(
        "unterminated unicode escape sequence",
    )))
}
