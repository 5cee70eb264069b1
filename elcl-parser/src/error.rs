use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use elcl_types::{Location, NamePath};

/// The category of an [`Error`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// A problem reading data from a source.
    #[strum(serialize = "IO")]
    Io,
    /// Invalid UTF-8 data or an exceeded line length.
    Encoding,
    /// The document ended in the middle of a construct.
    UnexpectedEnd,
    /// A control character that is not allowed in documents.
    Character,
    /// A violation of the document syntax.
    Syntax,
    /// One of the documented limits was exceeded.
    LimitExceeded,
    /// A name clashes with an existing element of the document.
    NameConflict,
    /// A valid construct this parser does not support.
    Unsupported,
    /// A document signature that could not be verified.
    Signature,
    /// Access to a source was denied.
    Access,
    /// A requested value does not exist.
    ValueNotFound,
    /// A value exists but has an incompatible type.
    TypeMismatch,
    /// An internal error; a defect in this library.
    Internal,
}

/// The error type of the parser and the value tree.
///
/// Every error has a [`ErrorCategory`] and a message; depending on where
/// it occurred it also carries the document location, the name path of
/// the affected element, a filesystem path and the underlying I/O error.
#[derive(Debug)]
pub struct Error {
    category: ErrorCategory,
    message: String,
    location: Option<Location>,
    name_path: Option<NamePath>,
    path: Option<PathBuf>,
    io_error: Option<std::io::Error>,
}

impl Error {
    /// Create a new error from a category and message.
    #[must_use]
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            location: None,
            name_path: None,
            path: None,
            io_error: None,
        }
    }

    /// Create a new error with a document location.
    #[must_use]
    pub fn with_location(
        category: ErrorCategory,
        message: impl Into<String>,
        location: Location,
    ) -> Self {
        Self::new(category, message).at(location)
    }

    /// Add a location to this error, replacing an existing one.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Add a location to this error if it has none yet.
    #[must_use]
    pub fn at_if_missing(mut self, location: Location) -> Self {
        if self.location.is_none() {
            self.location = Some(location);
        }
        self
    }

    /// Add a name path to this error.
    #[must_use]
    pub fn with_name_path(mut self, name_path: NamePath) -> Self {
        self.name_path = Some(name_path);
        self
    }

    /// Add a filesystem path to this error.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add the underlying I/O error.
    #[must_use]
    pub fn with_io_error(mut self, io_error: std::io::Error) -> Self {
        self.io_error = Some(io_error);
        self
    }

    /// The category of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    /// The message of this error, without the added context.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The document location, if one is known.
    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// The name path of the affected element, if one is known.
    #[must_use]
    pub fn name_path(&self) -> Option<&NamePath> {
        self.name_path.as_ref()
    }

    /// The filesystem path related to this error, if one is known.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.category, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " At {location}.")?;
        }
        if let Some(name_path) = &self.name_path {
            write!(f, " Name path: {name_path}.")?;
        }
        if let Some(path) = &self.path {
            write!(f, " Path: {}.", path.display())?;
        }
        if let Some(io_error) = &self.io_error {
            write!(f, " Cause: {io_error}.")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.io_error
            .as_ref()
            .map(|error| error as &(dyn std::error::Error + 'static))
    }
}

impl From<elcl_types::Error> for Error {
    /// Primitive parse errors surface as syntax errors; only an exceeded
    /// name length is a limit error.
    fn from(error: elcl_types::Error) -> Self {
        let category = match &error {
            elcl_types::Error::NameTooLong(_) => ErrorCategory::LimitExceeded,
            _ => ErrorCategory::Syntax,
        };
        Self::new(category, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elcl_types::{Position, SourceIdentifier};

    #[test]
    fn error_format_with_context() {
        let source = SourceIdentifier::for_file("/etc/app.elcl");
        let error = Error::new(ErrorCategory::NameConflict, "A value already exists.")
            .at(Location::new(source, Position::new(2, 1)))
            .with_name_path(NamePath::from_text("main.value").unwrap());
        assert_eq!(
            format!("{error}"),
            "NameConflict: A value already exists. At file:/etc/app.elcl:2:1. \
             Name path: main.value."
        );
    }

    #[test]
    fn category_format() {
        assert_eq!(format!("{}", ErrorCategory::Io), "IO");
        assert_eq!(format!("{}", ErrorCategory::LimitExceeded), "LimitExceeded");
    }

    #[test]
    fn type_errors_convert_to_syntax() {
        let error: Error = elcl_types::Error::InvalidDate(String::from("x")).into();
        assert_eq!(error.category(), ErrorCategory::Syntax);
        let error: Error = elcl_types::Error::NameTooLong(String::from("x")).into();
        assert_eq!(error.category(), ErrorCategory::LimitExceeded);
    }
}
