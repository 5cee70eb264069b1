use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use strum::{EnumIter, IntoEnumIterator};

use crate::Error;

/// The units a time-delta can count.
///
/// Months and years use the approximate factors of 2 628 000 and
/// 31 557 600 seconds for conversions.
#[derive(Clone, Copy, Debug, EnumIter, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum TimeUnit {
    /// Nanoseconds (`ns`).
    Nanoseconds,
    /// Microseconds (`µs`/`us`).
    Microseconds,
    /// Milliseconds (`ms`).
    Milliseconds,
    /// Seconds (`s`).
    Seconds,
    /// Minutes (`m`).
    Minutes,
    /// Hours (`h`).
    Hours,
    /// Days (`d`).
    Days,
    /// Weeks.
    Weeks,
    /// Months, as an approximate unit.
    Months,
    /// Years, as an approximate unit.
    Years,
}

impl TimeUnit {
    /// All units, from the smallest to the largest.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// The short suffix of this unit, or an empty string if it has none.
    #[must_use]
    pub const fn short_text(&self) -> &'static str {
        match self {
            Self::Nanoseconds => "ns",
            Self::Microseconds => "µs",
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
            Self::Minutes => "m",
            Self::Hours => "h",
            Self::Days => "d",
            Self::Weeks | Self::Months | Self::Years => "",
        }
    }

    /// The lowercase plural name of this unit.
    #[must_use]
    pub const fn long_text(&self) -> &'static str {
        match self {
            Self::Nanoseconds => "nanoseconds",
            Self::Microseconds => "microseconds",
            Self::Milliseconds => "milliseconds",
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
            Self::Years => "years",
        }
    }

    /// The lowercase singular name of this unit.
    #[must_use]
    pub const fn singular_text(&self) -> &'static str {
        match self {
            Self::Nanoseconds => "nanosecond",
            Self::Microseconds => "microsecond",
            Self::Milliseconds => "millisecond",
            Self::Seconds => "second",
            Self::Minutes => "minute",
            Self::Hours => "hour",
            Self::Days => "day",
            Self::Weeks => "week",
            Self::Months => "month",
            Self::Years => "year",
        }
    }

    /// The factor to convert a count of this unit into seconds.
    #[must_use]
    pub const fn second_factor(&self) -> f64 {
        match self {
            Self::Nanoseconds => 1e-9,
            Self::Microseconds => 1e-6,
            Self::Milliseconds => 1e-3,
            Self::Seconds => 1.0,
            Self::Minutes => 60.0,
            Self::Hours => 3_600.0,
            Self::Days => 86_400.0,
            Self::Weeks => 604_800.0,
            Self::Months => 2_628_000.0,
            Self::Years => 31_557_600.0,
        }
    }

    /// The factor to convert a count of this unit into nanoseconds.
    #[must_use]
    pub const fn nanoseconds_factor(&self) -> i64 {
        match self {
            Self::Nanoseconds => 1,
            Self::Microseconds => 1_000,
            Self::Milliseconds => 1_000_000,
            Self::Seconds => 1_000_000_000,
            Self::Minutes => 60_000_000_000,
            Self::Hours => 3_600_000_000_000,
            Self::Days => 86_400_000_000_000,
            Self::Weeks => 604_800_000_000_000,
            Self::Months => 2_628_000_000_000_000,
            Self::Years => 31_557_600_000_000_000,
        }
    }

    /// Look up a unit from a literal suffix.
    ///
    /// Accepts the short suffixes (`us` as an ASCII alternative for `µs`)
    /// and the singular and plural long names.
    #[must_use]
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "ns" => Some(Self::Nanoseconds),
            "us" | "µs" => Some(Self::Microseconds),
            "ms" => Some(Self::Milliseconds),
            "s" => Some(Self::Seconds),
            "m" => Some(Self::Minutes),
            "h" => Some(Self::Hours),
            "d" => Some(Self::Days),
            _ => Self::all()
                .find(|unit| unit.long_text() == suffix || unit.singular_text() == suffix),
        }
    }
}

impl Display for TimeUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.long_text())
    }
}

/// A signed duration, expressed as counts of individual time units.
///
/// A time-delta keeps the counts for each unit separate: `1 month` stays
/// one month and is only converted into seconds or nanoseconds on demand.
/// Equality and ordering compare the total length in seconds with a
/// tolerance of one nanosecond.
///
/// ## Examples
/// ```
/// use elcl_types::{TimeDelta, TimeUnit};
///
/// let mut delta = TimeDelta::from_count(TimeUnit::Hours, 2);
/// delta += TimeDelta::from_count(TimeUnit::Minutes, 30);
/// assert_eq!(delta.to_seconds(), 9000.0);
/// assert_eq!(format!("{delta}"), "30m, 2h");
/// assert_eq!(-delta.clone(), TimeDelta::from_count(TimeUnit::Minutes, -150));
/// ```
#[derive(Clone, Debug, Default)]
pub struct TimeDelta {
    counts: BTreeMap<TimeUnit, i64>,
}

impl TimeDelta {
    /// Create an empty time-delta.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a time-delta with a single unit count.
    #[must_use]
    pub fn from_count(unit: TimeUnit, count: i64) -> Self {
        let mut result = Self::new();
        result.set_count(unit, count);
        result
    }

    /// Test if all unit counts are zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The count for the given unit.
    #[must_use]
    pub fn count(&self, unit: TimeUnit) -> i64 {
        self.counts.get(&unit).copied().unwrap_or(0)
    }

    /// Set the count for the given unit; a zero count removes the unit.
    pub fn set_count(&mut self, unit: TimeUnit, count: i64) {
        if count == 0 {
            self.counts.remove(&unit);
        } else {
            self.counts.insert(unit, count);
        }
    }

    /// The number of units with a non-zero count.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.counts.len()
    }

    /// Iterate over all non-zero unit counts, smallest unit first.
    pub fn iter(&self) -> impl Iterator<Item = (TimeUnit, i64)> + '_ {
        self.counts.iter().map(|(unit, count)| (*unit, *count))
    }

    /// The approximate total length of this delta in seconds.
    #[must_use]
    pub fn to_seconds(&self) -> f64 {
        self.iter()
            .map(|(unit, count)| count as f64 * unit.second_factor())
            .sum()
    }

    /// The exact total length of this delta in nanoseconds.
    ///
    /// Fails if the result exceeds the 64-bit signed range.
    pub fn to_nanoseconds(&self) -> Result<i64, Error> {
        let mut result = 0i64;
        for (unit, count) in self.iter() {
            let delta = count
                .checked_mul(unit.nanoseconds_factor())
                .ok_or_else(|| overflow_error(unit, count))?;
            result = result
                .checked_add(delta)
                .ok_or_else(|| overflow_error(unit, count))?;
        }
        Ok(result)
    }
}

fn overflow_error(unit: TimeUnit, count: i64) -> Error {
    Error::TimeDeltaOverflow(format!("{count} {unit} exceed the nanosecond range"))
}

impl PartialEq for TimeDelta {
    fn eq(&self, other: &Self) -> bool {
        (self.to_seconds() - other.to_seconds()).abs() < 1e-9
    }
}

impl PartialOrd for TimeDelta {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        if self == other {
            return Some(std::cmp::Ordering::Equal);
        }
        self.to_seconds().partial_cmp(&other.to_seconds())
    }
}

impl Add for TimeDelta {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        let mut result = Self::new();
        for unit in TimeUnit::all() {
            result.set_count(unit, self.count(unit) + other.count(unit));
        }
        result
    }
}

impl Sub for TimeDelta {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        let mut result = Self::new();
        for unit in TimeUnit::all() {
            result.set_count(unit, self.count(unit) - other.count(unit));
        }
        result
    }
}

impl AddAssign for TimeDelta {
    fn add_assign(&mut self, other: Self) {
        *self = self.clone() + other;
    }
}

impl SubAssign for TimeDelta {
    fn sub_assign(&mut self, other: Self) {
        *self = self.clone() - other;
    }
}

impl Neg for TimeDelta {
    type Output = Self;

    fn neg(self) -> Self {
        let mut result = Self::new();
        for (unit, count) in self.iter() {
            result.set_count(unit, -count);
        }
        result
    }
}

impl Display for TimeDelta {
    /// Render the counts as a comma-separated list, e.g. `2h, 30m, 1 week`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (unit, count) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            if unit.short_text().is_empty() {
                let name = if count.abs() == 1 {
                    unit.singular_text()
                } else {
                    unit.long_text()
                };
                write!(f, "{count} {name}")?;
            } else {
                write!(f, "{count}{}", unit.short_text())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ns", Some(TimeUnit::Nanoseconds))]
    #[case("us", Some(TimeUnit::Microseconds))]
    #[case("µs", Some(TimeUnit::Microseconds))]
    #[case("s", Some(TimeUnit::Seconds))]
    #[case("second", Some(TimeUnit::Seconds))]
    #[case("seconds", Some(TimeUnit::Seconds))]
    #[case("week", Some(TimeUnit::Weeks))]
    #[case("years", Some(TimeUnit::Years))]
    #[case("w", None)]
    #[case("sec", None)]
    #[case("", None)]
    fn unit_from_suffix(#[case] suffix: &str, #[case] expected: Option<TimeUnit>) {
        assert_eq!(TimeUnit::from_suffix(suffix), expected);
    }

    #[test]
    fn unit_factors_are_consistent() {
        for unit in TimeUnit::all() {
            let from_nanoseconds = unit.nanoseconds_factor() as f64 * 1e-9;
            assert!((from_nanoseconds - unit.second_factor()).abs() < 1e-12);
        }
    }

    #[test]
    fn arithmetic_combines_per_unit() {
        let a = TimeDelta::from_count(TimeUnit::Hours, 2);
        let b = TimeDelta::from_count(TimeUnit::Minutes, 30);
        let sum = a.clone() + b.clone();
        assert_eq!(sum.count(TimeUnit::Hours), 2);
        assert_eq!(sum.count(TimeUnit::Minutes), 30);
        let difference = sum - b;
        assert_eq!(difference, a);
        assert_eq!(difference.unit_count(), 1);
    }

    #[test]
    fn zero_counts_are_dropped() {
        let mut delta = TimeDelta::from_count(TimeUnit::Seconds, 5);
        delta -= TimeDelta::from_count(TimeUnit::Seconds, 5);
        assert!(delta.is_empty());
    }

    #[test]
    fn equality_uses_seconds() {
        let minutes = TimeDelta::from_count(TimeUnit::Minutes, 60);
        let hour = TimeDelta::from_count(TimeUnit::Hours, 1);
        assert_eq!(minutes, hour);
        assert!(TimeDelta::from_count(TimeUnit::Seconds, 1) > TimeDelta::new());
    }

    #[test]
    fn nanoseconds_overflow_is_detected() {
        let delta = TimeDelta::from_count(TimeUnit::Years, 1_000_000);
        assert!(delta.to_nanoseconds().is_err());
        let delta = TimeDelta::from_count(TimeUnit::Seconds, 10);
        assert_eq!(delta.to_nanoseconds().unwrap(), 10_000_000_000);
    }

    #[rstest]
    #[case(TimeDelta::from_count(TimeUnit::Seconds, 5), "5s")]
    #[case(TimeDelta::from_count(TimeUnit::Weeks, 1), "1 week")]
    #[case(TimeDelta::from_count(TimeUnit::Months, -2), "-2 months")]
    #[case(
        TimeDelta::from_count(TimeUnit::Hours, 1) + TimeDelta::from_count(TimeUnit::Minutes, 30),
        "30m, 1h"
    )]
    fn format(#[case] delta: TimeDelta, #[case] expected: &str) {
        assert_eq!(format!("{delta}"), expected);
    }
}
