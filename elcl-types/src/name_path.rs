use std::fmt::{Display, Formatter};

use winnow::Parser;
use winnow::ascii::space0;
use winnow::combinator::{eof, opt};
use winnow::error::{ContextError, ErrMode};
use winnow::token::take_while;

use crate::escape::unescape_text;
use crate::{Error, Name};

type PathResult<T> = Result<T, ErrMode<ContextError>>;

/// The maximum length of a name path in a section definition.
pub const MAX_NAME_PATH_LENGTH: usize = 10;

/// The maximum length of a name path text.
const MAX_PATH_TEXT_LENGTH: usize = 4000;

/// An ordered sequence of names, identifying a node in the value tree.
///
/// Name paths are produced by the parser for sections and values, and
/// they are accepted by all lookup functions. The textual form separates
/// names with `.`, supports double-quoted text names with escape
/// sequences, `[n]` index elements and `""[n]` text-index elements.
///
/// ## Examples
/// ```
/// use elcl_types::{Name, NamePath};
///
/// let path = NamePath::from_text("servers.workers[0].id").unwrap();
/// assert_eq!(path.len(), 4);
/// assert_eq!(path.at(1), Some(&Name::regular("workers").unwrap()));
/// assert_eq!(path.at(2), Some(&Name::index(0)));
/// assert_eq!(format!("{path}"), "servers.workers[0].id");
///
/// let path = NamePath::from_text(r#"translations."hello world""#).unwrap();
/// assert_eq!(path.at(1), Some(&Name::text("hello world")));
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct NamePath {
    elements: Vec<Name>,
}

impl NamePath {
    /// Create an empty name path.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    /// Create a name path with a single element.
    #[must_use]
    pub fn from_name(name: Name) -> Self {
        Self {
            elements: vec![name],
        }
    }

    /// Parse a name path from its textual form.
    ///
    /// Leading, trailing and double separators are not allowed, and an
    /// index element must not directly follow a separator.
    pub fn from_text(text: &str) -> Result<Self, Error> {
        if text.len() > MAX_PATH_TEXT_LENGTH {
            return Err(Error::InvalidNamePath(String::from(
                "the name path text is too long",
            )));
        }
        name_path
            .parse(text)
            .map_err(|_| Error::InvalidNamePath(text.to_string()))
    }

    /// The number of elements in this path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Test if this path has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The element at the given position.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&Name> {
        self.elements.get(index)
    }

    /// The first element of the path.
    #[must_use]
    pub fn first(&self) -> Option<&Name> {
        self.elements.first()
    }

    /// The last element of the path.
    #[must_use]
    pub fn last(&self) -> Option<&Name> {
        self.elements.last()
    }

    /// Append a name to the end of this path.
    pub fn append(&mut self, name: Name) {
        self.elements.push(name);
    }

    /// Insert all elements of the given path before this path.
    pub fn prepend(&mut self, prefix: &Self) {
        let mut elements = prefix.elements.clone();
        elements.append(&mut self.elements);
        self.elements = elements;
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<Name> {
        self.elements.pop()
    }

    /// Test if any element of this path is an index or text-index.
    #[must_use]
    pub fn contains_index(&self) -> bool {
        self.elements.iter().any(Name::is_index)
    }

    /// Iterate over the elements of this path.
    pub fn iter(&self) -> std::slice::Iter<'_, Name> {
        self.elements.iter()
    }

    /// The path without its last element.
    #[must_use]
    pub fn parent(&self) -> Self {
        let mut elements = self.elements.clone();
        elements.pop();
        Self { elements }
    }
}

impl Display for NamePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, name) in self.elements.iter().enumerate() {
            // Index elements attach directly to the preceding name.
            if index > 0 && !matches!(name, Name::Index(_)) {
                write!(f, ".")?;
            }
            write!(f, "{name}")?;
        }
        Ok(())
    }
}

impl From<Name> for NamePath {
    fn from(name: Name) -> Self {
        Self::from_name(name)
    }
}

impl FromIterator<Name> for NamePath {
    fn from_iter<T: IntoIterator<Item = Name>>(iter: T) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a NamePath {
    type Item = &'a Name;
    type IntoIter = std::slice::Iter<'a, Name>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl std::str::FromStr for NamePath {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::from_text(input)
    }
}

/// Conversion of the accepted path-like arguments into a [`NamePath`].
///
/// Lookup functions accept anything implementing this trait: a path, a
/// single [`Name`], a numeric index, or a string in the path-text syntax.
pub trait IntoNamePath {
    /// Convert this value into a name path.
    fn into_name_path(self) -> Result<NamePath, Error>;
}

impl IntoNamePath for NamePath {
    fn into_name_path(self) -> Result<NamePath, Error> {
        Ok(self)
    }
}

impl IntoNamePath for &NamePath {
    fn into_name_path(self) -> Result<NamePath, Error> {
        Ok(self.clone())
    }
}

impl IntoNamePath for Name {
    fn into_name_path(self) -> Result<NamePath, Error> {
        Ok(NamePath::from_name(self))
    }
}

impl IntoNamePath for &Name {
    fn into_name_path(self) -> Result<NamePath, Error> {
        Ok(NamePath::from_name(self.clone()))
    }
}

impl IntoNamePath for usize {
    fn into_name_path(self) -> Result<NamePath, Error> {
        Ok(NamePath::from_name(Name::index(self)))
    }
}

impl IntoNamePath for &str {
    fn into_name_path(self) -> Result<NamePath, Error> {
        NamePath::from_text(self)
    }
}

impl IntoNamePath for &String {
    fn into_name_path(self) -> Result<NamePath, Error> {
        NamePath::from_text(self)
    }
}

impl IntoNamePath for String {
    fn into_name_path(self) -> Result<NamePath, Error> {
        NamePath::from_text(&self)
    }
}

/// Parse a complete name path text.
fn name_path(input: &mut &str) -> PathResult<NamePath> {
    let mut path = NamePath::new();
    space0.parse_next(input)?;
    path_element(input, &mut path, true)?;
    loop {
        space0.parse_next(input)?;
        if opt('.').parse_next(input)?.is_some() {
            space0.parse_next(input)?;
            path_element(input, &mut path, false)?;
        } else if input.starts_with('[') {
            let index = index_element(input)?;
            path.append(Name::index(index));
        } else {
            break;
        }
    }
    space0.parse_next(input)?;
    eof.parse_next(input)?;
    Ok(path)
}

/// Parse a single path element and append it to `path`.
///
/// A bare index element is only allowed at the start of the path, never
/// directly after a separator.
fn path_element(input: &mut &str, path: &mut NamePath, is_first: bool) -> PathResult<()> {
    if input.starts_with('"') {
        let text = quoted_text(input)?;
        if text.is_empty() && input.starts_with('[') {
            let index = index_element(input)?;
            path.append(Name::text_index(index));
        } else {
            path.append(Name::text(text));
        }
        return Ok(());
    }
    if input.starts_with('[') {
        if !is_first {
            return Err(cut_error());
        }
        let index = index_element(input)?;
        path.append(Name::index(index));
        return Ok(());
    }
    let is_meta = opt('@').parse_next(input)?.is_some();
    let raw = take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_')
        .parse_next(input)?;
    let name = if is_meta {
        Name::meta(raw)
    } else {
        Name::regular(raw)
    };
    path.append(name.map_err(|_| cut_error())?);
    Ok(())
}

/// Parse an `[n]` index element.
fn index_element(input: &mut &str) -> PathResult<usize> {
    '['.parse_next(input)?;
    space0.parse_next(input)?;
    let digits = take_while(1.., |c: char| c.is_ascii_digit() || c == '\'').parse_next(input)?;
    space0.parse_next(input)?;
    ']'.parse_next(input)?;
    parse_separated_number(digits).ok_or_else(cut_error)
}

/// Parse a decimal number that may contain `'` digit separators.
fn parse_separated_number(digits: &str) -> Option<usize> {
    if digits.starts_with('\'') || digits.ends_with('\'') || digits.contains("''") {
        return None;
    }
    let cleaned: String = digits.chars().filter(|c| *c != '\'').collect();
    cleaned.parse().ok()
}

/// Parse a double-quoted text with escape sequences.
fn quoted_text(input: &mut &str) -> PathResult<String> {
    '"'.parse_next(input)?;
    let mut escaped = false;
    let mut end = None;
    for (offset, c) in input.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            end = Some(offset);
            break;
        }
    }
    let Some(end) = end else {
        return Err(cut_error());
    };
    let raw = &input[..end];
    *input = &input[end + 1..];
    unescape_text(raw).map_err(|_| cut_error())
}

fn cut_error() -> ErrMode<ContextError> {
    ErrMode::Cut(ContextError::new())
}
