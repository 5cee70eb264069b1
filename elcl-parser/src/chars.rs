//! Character classification for the document syntax.

/// Test if a character is allowed in a configuration document.
///
/// The only control characters permitted are tab, carriage return and
/// newline; everything else in the C0 range, DEL and the C1 range is
/// rejected.
pub(crate) fn is_valid_lang_char(c: char) -> bool {
    let code = u32::from(c);
    if code < 0x20 {
        return c == '\t' || c == '\r' || c == '\n';
    }
    !(0x7f..=0xa0).contains(&code)
}

/// Space or tab.
pub(crate) fn is_spacing(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Carriage return or newline.
pub(crate) fn is_line_break(c: char) -> bool {
    c == '\r' || c == '\n'
}

/// A character that may start a regular name.
pub(crate) fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// A character that may be part of an identifier, as used for code
/// languages and byte-data formats.
pub(crate) fn is_format_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// A character that may be part of an integer suffix.
pub(crate) fn is_integer_suffix_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == 'µ'
}

/// A character that ends a value literal: spacing, a list separator, a
/// comment or the end of the line.
pub(crate) fn is_value_end_char(c: char) -> bool {
    is_spacing(c) || is_line_break(c) || c == ',' || c == '#'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_characters_are_rejected() {
        assert!(is_valid_lang_char('\t'));
        assert!(is_valid_lang_char('\n'));
        assert!(is_valid_lang_char('\r'));
        assert!(is_valid_lang_char('a'));
        assert!(is_valid_lang_char('ä'));
        assert!(!is_valid_lang_char('\u{0}'));
        assert!(!is_valid_lang_char('\u{1b}'));
        assert!(!is_valid_lang_char('\u{7f}'));
        assert!(!is_valid_lang_char('\u{a0}'));
        assert!(is_valid_lang_char('\u{a1}'));
    }
}
