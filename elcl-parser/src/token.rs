//! The tokens produced by the lexer.

use elcl_types::{Bytes, Date, DateTime, Position, Time, TimeDelta};

/// The kind of a lexer token.
///
/// The token stream covers the complete syntactic surface of a document,
/// including spacing and comments, so it can also drive tools like syntax
/// highlighters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub(crate) enum TokenKind {
    /// The end of a line.
    LineBreak,
    /// Spacing inside a line.
    Spacing,
    /// Spacing at the start of a continuation line.
    Indentation,
    /// A `#` comment, up to the end of the line.
    Comment,
    /// The `:` or `=` between a name and its value.
    NameValueSeparator,
    /// The `.` between the names of a name path.
    NamePathSeparator,
    /// The `,` between the values of an inline list.
    ValueListSeparator,
    /// The `*` bullet of a multi-line value list.
    MultiLineValueListSeparator,
    /// A regular name.
    RegularName,
    /// A double-quoted text name.
    TextName,
    /// A name starting with `@`.
    MetaName,
    /// The `[` opening a section map.
    SectionMapOpen,
    /// The `]` closing a section map.
    SectionMapClose,
    /// The `*[` opening a section list.
    SectionListOpen,
    /// The `]*` closing a section list.
    SectionListClose,
    /// An integer literal.
    Integer,
    /// A floating-point literal.
    Float,
    /// A boolean literal.
    Boolean,
    /// A single-line text literal.
    Text,
    /// A single-line code literal.
    Code,
    /// A single-line regular expression literal.
    Regex,
    /// A date literal.
    Date,
    /// A date-time literal.
    DateTime,
    /// A time literal.
    Time,
    /// A time-delta literal.
    TimeDelta,
    /// A single-line byte-data literal.
    Bytes,
    /// The `"""` opening a multi-line text.
    MultiLineTextOpen,
    /// The `"""` closing a multi-line text.
    MultiLineTextClose,
    /// One content line of a multi-line text.
    MultiLineText,
    /// The ``` opening a multi-line code block.
    MultiLineCodeOpen,
    /// The language identifier after a multi-line code opening.
    MultiLineCodeLanguage,
    /// The ``` closing a multi-line code block.
    MultiLineCodeClose,
    /// One content line of a multi-line code block.
    MultiLineCode,
    /// The `///` opening a multi-line regular expression.
    MultiLineRegexOpen,
    /// The `///` closing a multi-line regular expression.
    MultiLineRegexClose,
    /// One content line of a multi-line regular expression.
    MultiLineRegex,
    /// The `<<<` opening a multi-line byte-data block.
    MultiLineBytesOpen,
    /// The format identifier after a multi-line byte-data opening.
    MultiLineBytesFormat,
    /// The `>>>` closing a multi-line byte-data block.
    MultiLineBytesClose,
    /// One content line of a multi-line byte-data block.
    MultiLineBytes,
    /// The sentinel ending the token stream.
    EndOfData,
}

/// The typed content attached to a token.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) enum TokenContent {
    /// No content.
    #[default]
    None,
    /// Text content: names, text literals and multi-line content lines.
    Text(String),
    /// An integer value.
    Integer(i64),
    /// A floating-point value.
    Float(f64),
    /// A boolean value.
    Boolean(bool),
    /// A date value.
    Date(Date),
    /// A time value.
    Time(Time),
    /// A date-time value.
    DateTime(DateTime),
    /// A time-delta value.
    TimeDelta(TimeDelta),
    /// Byte data.
    Bytes(Bytes),
}

impl TokenContent {
    /// The text content, or an empty string for other content kinds.
    pub(crate) fn as_text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            _ => "",
        }
    }
}

/// A single token of the document syntax.
#[derive(Clone, Debug)]
pub(crate) struct Token {
    /// The kind of this token.
    pub(crate) kind: TokenKind,
    /// The position of the first character of the token.
    pub(crate) begin: Position,
    /// The position one character past the token.
    pub(crate) end: Position,
    /// The raw text of the token as written in the document.
    pub(crate) raw: String,
    /// The typed content of the token.
    pub(crate) content: TokenContent,
}

impl Token {
    /// Create the end-of-data sentinel token.
    pub(crate) fn end_of_data(position: Position) -> Self {
        Self {
            kind: TokenKind::EndOfData,
            begin: position,
            end: position,
            raw: String::new(),
            content: TokenContent::None,
        }
    }
}
