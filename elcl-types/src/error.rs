use thiserror::Error;

/// The error that can occur when creating or parsing one of the primitive types.
///
/// All variants carry the offending input text, so the message can be shown
/// to a user without additional context.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// An invalid calendar date.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// An invalid time of day.
    #[error("Invalid time: {0}")]
    InvalidTime(String),

    /// An invalid time offset.
    #[error("Invalid time offset: {0}")]
    InvalidTimeOffset(String),

    /// An invalid date-time combination.
    #[error("Invalid date-time: {0}")]
    InvalidDateTime(String),

    /// An invalid time-delta expression.
    #[error("Invalid time-delta: {0}")]
    InvalidTimeDelta(String),

    /// A count in a time-delta does not fit the target unit.
    #[error("Time-delta overflow: {0}")]
    TimeDeltaOverflow(String),

    /// An invalid sequence of hexadecimal byte digits.
    #[error("Invalid byte-data: {0}")]
    InvalidBytes(String),

    /// A name that does not follow the naming rules.
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// A name that exceeds the maximum length of 100 characters.
    #[error("Name exceeds the maximum length of 100 characters: {0}")]
    NameTooLong(String),

    /// A name path that does not follow the path syntax.
    #[error("Invalid name path: {0}")]
    InvalidNamePath(String),

    /// An invalid or incomplete escape sequence in a text.
    #[error("Invalid escape sequence: {0}")]
    InvalidEscape(String),
}
