//! The limits of the configuration language.

/// The maximum size of a configuration document in bytes.
pub const MAX_DOCUMENT_SIZE: u64 = 100_000_000;

/// The maximum length of a line in bytes, excluding the line terminator.
pub const MAX_LINE_LENGTH: usize = 4000;

/// The maximum length of text, code or byte-data embedded in a document.
pub const MAX_TEXT_LENGTH: usize = 10_000_000;

/// The maximum number of digits in a decimal integer literal.
pub const MAX_DECIMAL_DIGITS: usize = 19;

/// The maximum number of digits in a hexadecimal integer literal.
pub const MAX_HEXADECIMAL_DIGITS: usize = 16;

/// The maximum number of digits in a binary integer literal.
pub const MAX_BINARY_DIGITS: usize = 64;

/// The maximum depth of nested documents via `@include`.
pub const MAX_DOCUMENT_NESTING: usize = 5;

/// The maximum number of sources a single include directive may resolve to.
pub const MAX_INCLUDE_SOURCES: usize = 100;
