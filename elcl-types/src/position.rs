use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// A position in a document, in characters.
///
/// Lines and columns start counting from one. A default constructed
/// position is undefined, which is used for errors and generated values
/// that have no document context.
///
/// ## Examples
/// ```
/// use elcl_types::Position;
///
/// let mut position = Position::new(1, 1);
/// position.next_column();
/// assert_eq!(position, Position::new(1, 2));
/// position.next_line();
/// assert_eq!(position, Position::new(2, 1));
/// assert_eq!(format!("{position}"), "2:1");
/// assert!(Position::undefined().is_undefined());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Position {
    line: i32,
    column: i32,
}

impl Position {
    /// Create a new position from a line and column.
    #[must_use]
    pub const fn new(line: i32, column: i32) -> Self {
        Self { line, column }
    }

    /// Create an undefined position.
    #[must_use]
    pub const fn undefined() -> Self {
        Self {
            line: -1,
            column: -1,
        }
    }

    /// Test if this position is undefined.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        self.line < 0 || self.column < 0
    }

    /// The line, starting from one.
    #[must_use]
    pub const fn line(&self) -> i32 {
        self.line
    }

    /// The column, starting from one.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Advance to the first column of the next line.
    pub const fn next_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }

    /// Advance to the next column.
    pub const fn next_column(&mut self) {
        self.column += 1;
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::undefined()
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_undefined() {
            write!(f, "?:?")
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// The identifier of a document source.
///
/// A source identifier consists of a short name for the kind of source
/// (e.g. `file` or `text`) and a path that identifies the individual
/// source. Two identifiers are equal when both parts match exactly.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SourceIdentifier {
    name: String,
    path: String,
}

impl SourceIdentifier {
    /// Create a new source identifier from a source name and path.
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Create a new reference-counted identifier for a file source.
    #[must_use]
    pub fn for_file(path: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new("file", path))
    }

    /// Create a new reference-counted identifier for a text source.
    #[must_use]
    pub fn for_text() -> Arc<Self> {
        Arc::new(Self::new("text", String::new()))
    }

    /// The name of the source kind.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The path of the source.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Display for SourceIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.name, self.path)
        }
    }
}

/// A location in a document: the source identifier plus a position.
///
/// Locations are attached to values and errors. A location can exist
/// without a position (e.g. the location of the document root) and a
/// default constructed location is completely undefined.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Location {
    source: Option<Arc<SourceIdentifier>>,
    position: Position,
}

impl Location {
    /// Create a new location from a source identifier and a position.
    #[must_use]
    pub fn new(source: Arc<SourceIdentifier>, position: Position) -> Self {
        Self {
            source: Some(source),
            position,
        }
    }

    /// Create a location that only identifies a source, with no position.
    #[must_use]
    pub fn from_source(source: Arc<SourceIdentifier>) -> Self {
        Self {
            source: Some(source),
            position: Position::undefined(),
        }
    }

    /// Create an undefined location.
    #[must_use]
    pub fn undefined() -> Self {
        Self::default()
    }

    /// Test if this location is undefined.
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        self.source.is_none()
    }

    /// The source identifier, if the location is defined.
    #[must_use]
    pub fn source(&self) -> Option<&Arc<SourceIdentifier>> {
        self.source.as_ref()
    }

    /// The position within the source.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            None => write!(f, "<undefined>"),
            Some(source) => {
                if self.position.is_undefined() {
                    write!(f, "{source}")
                } else {
                    write!(f, "{source}:{}", self.position)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Position::new(1, 1), "1:1")]
    #[case(Position::new(12, 40), "12:40")]
    #[case(Position::undefined(), "?:?")]
    fn position_format(#[case] position: Position, #[case] expected: &str) {
        assert_eq!(format!("{position}"), expected);
    }

    #[test]
    fn location_format() {
        let source = SourceIdentifier::for_file("/etc/app.elcl");
        let location = Location::new(source.clone(), Position::new(3, 7));
        assert_eq!(format!("{location}"), "file:/etc/app.elcl:3:7");
        let location = Location::from_source(source);
        assert_eq!(format!("{location}"), "file:/etc/app.elcl");
        assert_eq!(format!("{}", Location::undefined()), "<undefined>");
    }

    #[test]
    fn source_identifier_compares_by_name_and_path() {
        assert_eq!(
            SourceIdentifier::new("file", "/a"),
            SourceIdentifier::new("file", "/a")
        );
        assert_ne!(
            SourceIdentifier::new("file", "/a"),
            SourceIdentifier::new("text", "/a")
        );
    }
}
