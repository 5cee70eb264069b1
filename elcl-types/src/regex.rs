use std::fmt::{Display, Formatter};

/// A regular expression value.
///
/// The parser stores the pattern text verbatim and does not compile it;
/// matching is left to the application. The multi-line flag records
/// whether the pattern came from a multi-line literal, where whitespace
/// is usually meant to be ignored by the consuming engine.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Regex {
    pattern: String,
    multi_line: bool,
}

impl Regex {
    /// Create a new regular expression value.
    #[must_use]
    pub fn new(pattern: impl Into<String>, multi_line: bool) -> Self {
        Self {
            pattern: pattern.into(),
            multi_line,
        }
    }

    /// The pattern text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Test if the pattern came from a multi-line literal.
    #[must_use]
    pub const fn is_multi_line(&self) -> bool {
        self.multi_line
    }
}

impl Display for Regex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pattern)
    }
}
