use std::fmt::{Display, Formatter};
use std::str::FromStr;

use winnow::Parser;
use winnow::combinator::{alt, opt, preceded};
use winnow::token::{one_of, take_while};

use crate::Error;
use crate::date::fixed_digits;

/// The number of nanoseconds in one day.
pub const NANOSECONDS_PER_DAY: i64 = 86_400_000_000_000;

/// The sentinel stored for local time, distinct from any valid offset.
const LOCAL_TIME_OFFSET: i32 = i32::MAX;

/// The maximum magnitude of a time offset in seconds.
const MAX_OFFSET_SECONDS: i32 = 86_399;

/// The precision used when rendering a time offset as text.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TimeOffsetPrecision {
    /// Choose the shortest form that preserves all non-zero components.
    #[default]
    Automatic,
    /// Render only hours.
    Hours,
    /// Render hours and minutes.
    Minutes,
    /// Render hours, minutes and seconds.
    Seconds,
}

/// The offset of a time towards UTC.
///
/// An offset is either *local time* (no offset given), UTC, or a signed
/// number of seconds in the open interval (−86400, +86400).
///
/// ## Examples
/// ```
/// use elcl_types::TimeOffset;
///
/// assert_eq!(format!("{}", TimeOffset::utc()), "z");
/// assert_eq!(format!("{}", TimeOffset::local()), "");
/// assert_eq!(format!("{}", TimeOffset::from_seconds(3600).unwrap()), "+01");
/// assert_eq!(format!("{}", TimeOffset::from_seconds(-4530).unwrap()), "-01:15:30");
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TimeOffset {
    seconds: i32,
}

impl TimeOffset {
    /// Create a local-time offset.
    #[must_use]
    pub const fn local() -> Self {
        Self {
            seconds: LOCAL_TIME_OFFSET,
        }
    }

    /// Create the UTC offset.
    #[must_use]
    pub const fn utc() -> Self {
        Self { seconds: 0 }
    }

    /// Create an offset from a signed number of seconds.
    pub fn from_seconds(seconds: i32) -> Result<Self, Error> {
        if !(-MAX_OFFSET_SECONDS..=MAX_OFFSET_SECONDS).contains(&seconds) {
            return Err(Error::InvalidTimeOffset(format!("{seconds} seconds")));
        }
        Ok(Self { seconds })
    }

    /// Test if this is the local-time offset.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        self.seconds == LOCAL_TIME_OFFSET
    }

    /// Test if this is the UTC offset.
    #[must_use]
    pub const fn is_utc(&self) -> bool {
        self.seconds == 0
    }

    /// Test if this offset is negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        !self.is_local() && self.seconds < 0
    }

    /// The total number of seconds; zero for local time.
    #[must_use]
    pub const fn total_seconds(&self) -> i32 {
        if self.is_local() { 0 } else { self.seconds }
    }

    /// The hour component of the offset magnitude.
    #[must_use]
    pub const fn hours(&self) -> i32 {
        self.total_seconds().abs() / 3600
    }

    /// The minute component of the offset magnitude.
    #[must_use]
    pub const fn minutes(&self) -> i32 {
        (self.total_seconds().abs() / 60) % 60
    }

    /// The second component of the offset magnitude.
    #[must_use]
    pub const fn seconds(&self) -> i32 {
        self.total_seconds().abs() % 60
    }

    /// Render this offset with the given precision.
    ///
    /// Local time renders as an empty string and UTC renders as `z`.
    #[must_use]
    pub fn to_text(&self, precision: TimeOffsetPrecision) -> String {
        if self.is_local() {
            return String::new();
        }
        if self.is_utc() {
            return String::from("z");
        }
        let precision = match precision {
            TimeOffsetPrecision::Automatic => {
                if self.seconds() != 0 {
                    TimeOffsetPrecision::Seconds
                } else if self.minutes() != 0 {
                    TimeOffsetPrecision::Minutes
                } else {
                    TimeOffsetPrecision::Hours
                }
            }
            other => other,
        };
        let mut result = String::from(if self.is_negative() { "-" } else { "+" });
        result.push_str(&format!("{:02}", self.hours()));
        if matches!(
            precision,
            TimeOffsetPrecision::Minutes | TimeOffsetPrecision::Seconds
        ) {
            result.push_str(&format!(":{:02}", self.minutes()));
            if precision == TimeOffsetPrecision::Seconds {
                result.push_str(&format!(":{:02}", self.seconds()));
            }
        }
        result
    }
}

impl Default for TimeOffset {
    fn default() -> Self {
        Self::local()
    }
}

impl Display for TimeOffset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_text(TimeOffsetPrecision::Automatic))
    }
}

/// A time of day with nanosecond resolution and a time offset.
///
/// The time is stored as nanoseconds since midnight; a negative count
/// means the time is undefined.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
/// use elcl_types::{Time, TimeOffset};
///
/// let time = Time::from_str("16:45:30.5z").unwrap();
/// assert_eq!(time.hour(), 16);
/// assert_eq!(time.second_fraction(), 500_000_000);
/// assert!(time.offset().is_utc());
/// assert_eq!(format!("{time}"), "16:45:30.5z");
///
/// let time = Time::from_str("08:30").unwrap();
/// assert!(time.offset().is_local());
/// assert_eq!(format!("{time}"), "08:30:00");
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Time {
    nanoseconds: i64,
    offset: TimeOffset,
}

impl Time {
    /// Create a new time from its components.
    pub fn new(
        hour: i32,
        minute: i32,
        second: i32,
        nanosecond: i64,
        offset: TimeOffset,
    ) -> Result<Self, Error> {
        if !(0..=23).contains(&hour)
            || !(0..=59).contains(&minute)
            || !(0..=59).contains(&second)
            || !(0..=999_999_999).contains(&nanosecond)
        {
            return Err(Error::InvalidTime(format!(
                "{hour:02}:{minute:02}:{second:02}.{nanosecond}"
            )));
        }
        let nanoseconds = nanosecond
            + (i64::from(second) + i64::from(minute) * 60 + i64::from(hour) * 3600)
                * 1_000_000_000;
        Ok(Self {
            nanoseconds,
            offset,
        })
    }

    /// Create a time from a number of nanoseconds since midnight.
    pub fn from_nanoseconds(nanoseconds: i64, offset: TimeOffset) -> Result<Self, Error> {
        if !(0..NANOSECONDS_PER_DAY).contains(&nanoseconds) {
            return Err(Error::InvalidTime(format!("{nanoseconds} nanoseconds")));
        }
        Ok(Self {
            nanoseconds,
            offset,
        })
    }

    /// Create an undefined time.
    #[must_use]
    pub const fn undefined() -> Self {
        Self {
            nanoseconds: -1,
            offset: TimeOffset::local(),
        }
    }

    /// Test if this time is undefined.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        self.nanoseconds < 0
    }

    /// The hour, or zero if the time is undefined.
    #[must_use]
    pub const fn hour(&self) -> i32 {
        if self.is_undefined() {
            return 0;
        }
        (self.nanoseconds / 3_600_000_000_000) as i32
    }

    /// The minute, or zero if the time is undefined.
    #[must_use]
    pub const fn minute(&self) -> i32 {
        if self.is_undefined() {
            return 0;
        }
        ((self.nanoseconds / 60_000_000_000) % 60) as i32
    }

    /// The second, or zero if the time is undefined.
    #[must_use]
    pub const fn second(&self) -> i32 {
        if self.is_undefined() {
            return 0;
        }
        ((self.nanoseconds / 1_000_000_000) % 60) as i32
    }

    /// The fraction of the second in nanoseconds.
    #[must_use]
    pub const fn second_fraction(&self) -> i64 {
        if self.is_undefined() {
            return 0;
        }
        self.nanoseconds % 1_000_000_000
    }

    /// The time offset.
    #[must_use]
    pub const fn offset(&self) -> TimeOffset {
        self.offset
    }

    /// The nanoseconds since midnight, or zero if undefined.
    #[must_use]
    pub const fn to_nanoseconds(&self) -> i64 {
        if self.is_undefined() {
            return 0;
        }
        self.nanoseconds
    }
}

impl Display for Time {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_undefined() {
            return Ok(());
        }
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )?;
        let fraction = self.second_fraction();
        if fraction != 0 {
            let fraction = format!("{fraction:09}");
            write!(f, ".{}", fraction.trim_end_matches('0'))?;
        }
        if !self.offset.is_local() {
            write!(f, "{}", self.offset.to_text(TimeOffsetPrecision::Automatic))?;
        }
        Ok(())
    }
}

impl FromStr for Time {
    type Err = Error;

    /// Parse a time in the form `HH:MM[:SS[.fraction]][z|±HH[:MM[:SS]]]`,
    /// optionally prefixed with `t` or `T`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        time_literal
            .parse(input)
            .map_err(|_| Error::InvalidTime(input.to_string()))?
            .map_err(|_| Error::InvalidTime(input.to_string()))
    }
}

/// Recognize a complete time literal.
///
/// Returns an inner result so the caller can distinguish between a
/// malformed literal and valid syntax with out-of-range components.
pub(crate) fn time_literal(input: &mut &str) -> winnow::ModalResult<Result<Time, Error>> {
    let _ = opt(one_of(['t', 'T'])).parse_next(input)?;
    let hour = fixed_digits(input, 2)?;
    ':'.parse_next(input)?;
    let minute = fixed_digits(input, 2)?;
    let mut second = 0;
    let mut nanosecond = 0i64;
    if opt(':').parse_next(input)?.is_some() {
        second = fixed_digits(input, 2)?;
        if opt('.').parse_next(input)?.is_some() {
            let digits = take_while(1..=9, |c: char| c.is_ascii_digit()).parse_next(input)?;
            let mut value: i64 = digits.parse().unwrap_or(0);
            for _ in digits.len()..9 {
                value *= 10;
            }
            nanosecond = value;
        }
    }
    let offset = opt(offset_literal).parse_next(input)?;
    match offset.unwrap_or(Ok(TimeOffset::local())) {
        Ok(offset) => Ok(Time::new(hour, minute, second, nanosecond, offset)),
        Err(error) => Ok(Err(error)),
    }
}

/// Recognize a time offset: `z`, `Z` or `±HH[:MM[:SS]]`.
fn offset_literal(input: &mut &str) -> winnow::ModalResult<Result<TimeOffset, Error>> {
    alt((
        one_of(['z', 'Z']).map(|_| Ok(TimeOffset::utc())),
        (
            one_of(['+', '-']),
            two_digits,
            opt(preceded(':', two_digits)),
            opt(preceded(':', two_digits)),
        )
            .map(|(sign, hours, minutes, seconds)| {
                // A seconds component requires a minutes component.
                let (minutes, seconds) = match (minutes, seconds) {
                    (Some(minutes), Some(seconds)) => (minutes, seconds),
                    (Some(minutes), None) => (minutes, 0),
                    _ => (0, 0),
                };
                if hours > 23 || minutes > 59 || seconds > 59 {
                    return Err(Error::InvalidTimeOffset(format!(
                        "{sign}{hours:02}:{minutes:02}:{seconds:02}"
                    )));
                }
                let mut total = hours * 3600 + minutes * 60 + seconds;
                if sign == '-' {
                    total = -total;
                }
                TimeOffset::from_seconds(total)
            }),
    ))
    .parse_next(input)
}

fn two_digits(input: &mut &str) -> winnow::ModalResult<i32> {
    fixed_digits(input, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TimeOffset::utc(), "z")]
    #[case(TimeOffset::local(), "")]
    #[case(TimeOffset::from_seconds(3600).unwrap(), "+01")]
    #[case(TimeOffset::from_seconds(-3600).unwrap(), "-01")]
    #[case(TimeOffset::from_seconds(5400).unwrap(), "+01:30")]
    #[case(TimeOffset::from_seconds(-86399).unwrap(), "-23:59:59")]
    fn offset_automatic_format(#[case] offset: TimeOffset, #[case] expected: &str) {
        assert_eq!(offset.to_text(TimeOffsetPrecision::Automatic), expected);
    }

    #[test]
    fn offset_range() {
        assert!(TimeOffset::from_seconds(86_399).is_ok());
        assert!(TimeOffset::from_seconds(86_400).is_err());
        assert!(TimeOffset::from_seconds(-86_400).is_err());
    }

    #[rstest]
    #[case("01:02:03", 1, 2, 3, 0, TimeOffset::local())]
    #[case("t01:02:03", 1, 2, 3, 0, TimeOffset::local())]
    #[case("23:59", 23, 59, 0, 0, TimeOffset::local())]
    #[case("12:00:00z", 12, 0, 0, 0, TimeOffset::utc())]
    #[case("12:00:00Z", 12, 0, 0, 0, TimeOffset::utc())]
    #[case("12:00:00.25", 12, 0, 0, 250_000_000, TimeOffset::local())]
    #[case("12:00:00.000000001", 12, 0, 0, 1, TimeOffset::local())]
    #[case("12:00:00+01", 12, 0, 0, 0, TimeOffset::from_seconds(3600).unwrap())]
    #[case("12:00:00-01:30", 12, 0, 0, 0, TimeOffset::from_seconds(-5400).unwrap())]
    #[case("12:00:00+01:30:30", 12, 0, 0, 0, TimeOffset::from_seconds(5430).unwrap())]
    fn parse_valid(
        #[case] text: &str,
        #[case] hour: i32,
        #[case] minute: i32,
        #[case] second: i32,
        #[case] fraction: i64,
        #[case] offset: TimeOffset,
    ) {
        let time = Time::from_str(text).unwrap();
        assert_eq!(time.hour(), hour);
        assert_eq!(time.minute(), minute);
        assert_eq!(time.second(), second);
        assert_eq!(time.second_fraction(), fraction);
        assert_eq!(time.offset(), offset);
    }

    #[rstest]
    #[case("24:00")]
    #[case("12:60")]
    #[case("12:00:61")]
    #[case("12:00:00.0000000001")]
    #[case("12:00:00+24")]
    #[case("12")]
    #[case("12:0")]
    #[case("12:00x")]
    fn parse_invalid(#[case] text: &str) {
        assert!(Time::from_str(text).is_err());
    }

    #[rstest]
    #[case("16:45:30.5z")]
    #[case("08:30:00")]
    #[case("23:59:59.999999999+01:30")]
    fn format_round_trip(#[case] text: &str) {
        let time = Time::from_str(text).unwrap();
        assert_eq!(format!("{time}"), text);
    }
}
