use std::fmt::{Display, Formatter};

use crate::Error;
use crate::escape::{EscapeMode, escape_text};

/// The maximum length of a regular name in characters.
pub const MAX_NAME_LENGTH: usize = 100;

/// A single name, used as the key of a value in its enclosing container.
///
/// Regular names are identifiers that are normalized on creation:
/// uppercase letters are lowercased and spaces become underscores. After
/// normalization a regular name must match `[a-z][a-z0-9]*(_[a-z0-9]+)*`
/// and must not exceed 100 characters. Meta names are regular names with
/// an `@` prefix. Text names are arbitrary strings, and index names
/// address positional children.
///
/// ## Examples
/// ```
/// use elcl_types::Name;
///
/// assert_eq!(Name::regular("Server Name").unwrap(), Name::regular("server_name").unwrap());
/// assert!(Name::regular("_name").is_err());
/// assert!(Name::regular("two__underscores").is_err());
/// assert_eq!(format!("{}", Name::meta("version").unwrap()), "@version");
/// assert_eq!(format!("{}", Name::index(3)), "[3]");
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Name {
    /// A normalized lowercase identifier.
    Regular(String),
    /// A regular name with an `@` prefix, directing parser behavior.
    Meta(String),
    /// An arbitrary text used as a key, possibly empty.
    Text(String),
    /// A position in a list or section list.
    Index(usize),
    /// A position within a section with text names.
    TextIndex(usize),
}

impl Name {
    /// Create a regular name, normalizing and validating the input.
    pub fn regular(name: &str) -> Result<Self, Error> {
        Ok(Self::Regular(normalize_regular_name(name)?))
    }

    /// Create a meta name, with or without the leading `@`.
    pub fn meta(name: &str) -> Result<Self, Error> {
        let name = name.strip_prefix('@').unwrap_or(name);
        Ok(Self::Meta(normalize_regular_name(name)?))
    }

    /// Create a text name.
    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self::Text(name.into())
    }

    /// Create an index name.
    #[must_use]
    pub const fn index(index: usize) -> Self {
        Self::Index(index)
    }

    /// Create a text-index name.
    #[must_use]
    pub const fn text_index(index: usize) -> Self {
        Self::TextIndex(index)
    }

    /// The `@version` meta name.
    #[must_use]
    pub fn meta_version() -> Self {
        Self::Meta(String::from("version"))
    }

    /// The `@features` meta name.
    #[must_use]
    pub fn meta_features() -> Self {
        Self::Meta(String::from("features"))
    }

    /// The `@include` meta name.
    #[must_use]
    pub fn meta_include() -> Self {
        Self::Meta(String::from("include"))
    }

    /// The `@signature` meta name.
    #[must_use]
    pub fn meta_signature() -> Self {
        Self::Meta(String::from("signature"))
    }

    /// All meta names this implementation understands.
    #[must_use]
    pub fn all_meta_names() -> [Self; 4] {
        [
            Self::meta_version(),
            Self::meta_features(),
            Self::meta_include(),
            Self::meta_signature(),
        ]
    }

    /// Test if this is a regular name.
    #[must_use]
    pub const fn is_regular(&self) -> bool {
        matches!(self, Self::Regular(_))
    }

    /// Test if this is a meta name.
    #[must_use]
    pub const fn is_meta(&self) -> bool {
        matches!(self, Self::Meta(_))
    }

    /// Test if this is a text name.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Test if this is an index or text-index name.
    #[must_use]
    pub const fn is_index(&self) -> bool {
        matches!(self, Self::Index(_) | Self::TextIndex(_))
    }

    /// The index of an index or text-index name.
    #[must_use]
    pub const fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(index) | Self::TextIndex(index) => Some(*index),
            _ => None,
        }
    }

    /// The textual content of a regular, meta or text name.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Regular(text) | Self::Meta(text) | Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Regular(name) => write!(f, "{name}"),
            Self::Meta(name) => write!(f, "@{name}"),
            Self::Text(name) => write!(f, "\"{}\"", escape_text(name, EscapeMode::TextName)),
            Self::Index(index) => write!(f, "[{index}]"),
            Self::TextIndex(index) => write!(f, "\"\"[{index}]"),
        }
    }
}

/// Normalize a regular name and verify the result.
///
/// Lowercases `A`-`Z` and maps spaces to underscores. The normalized name
/// must start with a letter, contain only letters, digits and single
/// underscores, and must not exceed [`MAX_NAME_LENGTH`] characters.
fn normalize_regular_name(name: &str) -> Result<String, Error> {
    if name.is_empty() {
        return Err(Error::InvalidName(String::from("a name must not be empty")));
    }
    let mut result = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            'a'..='z' | '0'..='9' => result.push(c),
            'A'..='Z' => result.push(c.to_ascii_lowercase()),
            '_' | ' ' => result.push('_'),
            _ => {
                return Err(Error::InvalidName(format!(
                    "unexpected character '{}' in name",
                    escape_text(&c.to_string(), EscapeMode::ErrorText)
                )));
            }
        }
    }
    if result.len() > MAX_NAME_LENGTH {
        return Err(Error::NameTooLong(result));
    }
    if !result.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err(Error::InvalidName(format!(
            "the name '{result}' must start with a letter"
        )));
    }
    if result.ends_with('_') {
        return Err(Error::InvalidName(format!(
            "the name '{result}' must not end with an underscore or space"
        )));
    }
    if result.contains("__") {
        return Err(Error::InvalidName(format!(
            "the name '{result}' must not contain consecutive underscores or spaces"
        )));
    }
    Ok(result)
}
