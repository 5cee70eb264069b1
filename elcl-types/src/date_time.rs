use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use winnow::Parser;
use winnow::token::one_of;

use crate::date::date_literal;
use crate::time::{NANOSECONDS_PER_DAY, time_literal};
use crate::{Date, Error, Time};

/// A combination of a date and a time of day.
///
/// Date-times compare by their UTC-equivalent instant: the time offset is
/// subtracted before comparing, and local times compare like UTC.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
/// use elcl_types::DateTime;
///
/// let a = DateTime::from_str("2024-01-01 01:00:00+01").unwrap();
/// let b = DateTime::from_str("2024-01-01 00:00:00z").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(format!("{a}"), "2024-01-01 01:00:00+01:00");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct DateTime {
    date: Date,
    time: Time,
}

impl DateTime {
    /// Create a new date-time from a date and a time.
    #[must_use]
    pub const fn new(date: Date, time: Time) -> Self {
        Self { date, time }
    }

    /// Create an undefined date-time.
    #[must_use]
    pub const fn undefined() -> Self {
        Self {
            date: Date::undefined(),
            time: Time::undefined(),
        }
    }

    /// Test if this date-time is undefined.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        self.date.is_undefined() || self.time.is_undefined()
    }

    /// The date part.
    #[must_use]
    pub const fn date(&self) -> Date {
        self.date
    }

    /// The time part.
    #[must_use]
    pub const fn time(&self) -> Time {
        self.time
    }

    /// The UTC-normalized instant used for comparisons, in nanoseconds
    /// since the epoch. Local times are treated like UTC.
    fn instant(&self) -> i128 {
        if self.is_undefined() {
            return i128::MIN;
        }
        i128::from(self.date.to_days_since_epoch()) * i128::from(NANOSECONDS_PER_DAY)
            + i128::from(self.time.to_nanoseconds())
            - i128::from(self.time.offset().total_seconds()) * 1_000_000_000
    }
}

impl PartialEq for DateTime {
    fn eq(&self, other: &Self) -> bool {
        self.instant() == other.instant()
    }
}

impl Eq for DateTime {}

impl PartialOrd for DateTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant().cmp(&other.instant())
    }
}

impl Hash for DateTime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.instant().hash(state);
    }
}

impl Display for DateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_undefined() {
            return Ok(());
        }
        write!(f, "{} {}", self.date, self.time)
    }
}

impl FromStr for DateTime {
    type Err = Error;

    /// Parse a date-time in the form `<date>[T| ]<time>`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parse_error = || Error::InvalidDateTime(input.to_string());
        let ((year, month, day), _, time) = (date_literal, one_of(['t', 'T', ' ']), time_literal)
            .parse(input)
            .map_err(|_| parse_error())?;
        let date = Date::new(year, month, day)?;
        Ok(Self::new(date, time?))
    }
}
