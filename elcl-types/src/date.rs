use std::fmt::{Display, Formatter};
use std::str::FromStr;

use winnow::Parser;
use winnow::token::take_while;

use crate::Error;

// The proleptic Gregorian calendar repeats in 400-year cycles. The fictive
// epoch 0000-01-01 starts such a cycle with a leap year.
const DAYS_PER_CYCLE_4: i64 = 1_461;
const DAYS_PER_CYCLE_100: i64 = 36_524;
const DAYS_PER_CYCLE_400: i64 = 146_097;
const MAXIMUM_DAYS_SINCE_EPOCH: i64 = 3_652_425;

// First day of the year for each month, starting at zero.
const DAY_OF_YEAR: [i32; 13] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334, 365];
const DAY_OF_LEAP_YEAR: [i32; 13] = [0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335, 366];

/// A date in the proleptic Gregorian calendar.
///
/// Valid dates range from year 1 to year 9999. The date is stored as the
/// number of days since the fictive epoch 0000-01-01; zero or negative
/// values mean the date is undefined.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
/// use elcl_types::Date;
///
/// let date = Date::new(2024, 2, 29).unwrap();
/// assert_eq!(format!("{date}"), "2024-02-29");
/// assert_eq!(Date::from_str("2024-02-29").unwrap(), date);
/// assert!(Date::new(2023, 2, 29).is_err());
/// assert!(Date::undefined().is_undefined());
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Date {
    days_since_epoch: i64,
}

impl Date {
    /// Create a new date from a year, month and day.
    pub fn new(year: i32, month: i32, day: i32) -> Result<Self, Error> {
        if !Self::is_valid(year, month, day) {
            return Err(Error::InvalidDate(format!("{year:04}-{month:02}-{day:02}")));
        }
        Ok(Self {
            days_since_epoch: days_since_epoch(year, month, day),
        })
    }

    /// Create an undefined date.
    #[must_use]
    pub const fn undefined() -> Self {
        Self {
            days_since_epoch: 0,
        }
    }

    /// Create a date from a number of days since the epoch 0000-01-01.
    #[must_use]
    pub const fn from_days_since_epoch(days_since_epoch: i64) -> Self {
        Self { days_since_epoch }
    }

    /// Test if the given combination of year, month and day is valid.
    #[must_use]
    pub fn is_valid(year: i32, month: i32, day: i32) -> bool {
        year >= 1
            && year <= 9999
            && month >= 1
            && month <= 12
            && day >= 1
            && day <= days_in_month(year, month)
    }

    /// Test if this date is undefined.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        self.days_since_epoch <= 0
    }

    /// The number of days since the epoch 0000-01-01.
    #[must_use]
    pub const fn to_days_since_epoch(&self) -> i64 {
        self.days_since_epoch
    }

    /// The year of this date, or zero if the date is undefined.
    #[must_use]
    pub fn year(&self) -> i32 {
        if self.is_undefined() {
            return 0;
        }
        extract_year_and_days(self.days_since_epoch).0
    }

    /// The month of this date, or zero if the date is undefined.
    #[must_use]
    pub fn month(&self) -> i32 {
        if self.is_undefined() {
            return 0;
        }
        let (year, day_of_year) = extract_year_and_days(self.days_since_epoch);
        extract_month_and_day(year, day_of_year).0
    }

    /// The day of this date, or zero if the date is undefined.
    #[must_use]
    pub fn day(&self) -> i32 {
        if self.is_undefined() {
            return 0;
        }
        let (year, day_of_year) = extract_year_and_days(self.days_since_epoch);
        extract_month_and_day(year, day_of_year).1
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_undefined() {
            return Ok(());
        }
        let (year, day_of_year) = extract_year_and_days(self.days_since_epoch);
        let (month, day) = extract_month_and_day(year, day_of_year);
        write!(f, "{year:04}-{month:02}-{day:02}")
    }
}

impl FromStr for Date {
    type Err = Error;

    /// Parse a date in the form `YYYY-MM-DD`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (year, month, day) = date_literal
            .parse(input)
            .map_err(|_| Error::InvalidDate(input.to_string()))?;
        Self::new(year, month, day)
    }
}

/// Recognize the digits of a `YYYY-MM-DD` literal.
pub(crate) fn date_literal(input: &mut &str) -> winnow::ModalResult<(i32, i32, i32)> {
    let year = fixed_digits(input, 4)?;
    '-'.parse_next(input)?;
    let month = fixed_digits(input, 2)?;
    '-'.parse_next(input)?;
    let day = fixed_digits(input, 2)?;
    Ok((year, month, day))
}

/// Parse an exact number of decimal digits.
pub(crate) fn fixed_digits(input: &mut &str, count: usize) -> winnow::ModalResult<i32> {
    take_while(count..=count, |c: char| c.is_ascii_digit())
        .parse_to()
        .parse_next(input)
}

/// Test if the given year is a leap year.
#[must_use]
pub fn is_leap_year(year: i32) -> bool {
    if !(0..=9999).contains(&year) {
        return false;
    }
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// The number of days in the given month.
#[must_use]
pub fn days_in_month(year: i32, month: i32) -> i32 {
    if !(0..=9999).contains(&year) || !(1..=12).contains(&month) {
        return 0;
    }
    if month == 2 {
        return if is_leap_year(year) { 29 } else { 28 };
    }
    const MONTHS: [i32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    MONTHS[(month - 1) as usize]
}

/// The number of days between the epoch and the first day of the year.
fn days_since_epoch_for_year(year: i32) -> i64 {
    if !(0..=9999).contains(&year) {
        return 0;
    }
    let mut days = 0i64;
    let mut years = i64::from(year);
    let cycles_400 = years / 400;
    years %= 400;
    days += DAYS_PER_CYCLE_400 * cycles_400;
    if years > 0 {
        days += 1; // the leap year starting the 400-year cycle
    }
    let cycles_100 = years / 100;
    years %= 100;
    days += DAYS_PER_CYCLE_100 * cycles_100;
    if years > 0 {
        days -= 1; // the exceptional non-leap year of the 100-year cycle
    }
    let cycles_4 = years / 4;
    years %= 4;
    days += DAYS_PER_CYCLE_4 * cycles_4;
    if years > 0 {
        days += 1; // the leap year starting the 4-year cycle
    }
    days + years * 365
}

/// The number of days since the epoch for a year, month and day.
fn days_since_epoch(year: i32, month: i32, day: i32) -> i64 {
    if !(0..=9999).contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return 0;
    }
    let day_of_year = if is_leap_year(year) {
        DAY_OF_LEAP_YEAR[(month - 1) as usize]
    } else {
        DAY_OF_YEAR[(month - 1) as usize]
    };
    days_since_epoch_for_year(year) + i64::from(day_of_year) + i64::from(day) - 1
}

/// Extract the year and zero-based day of the year, clamping out-of-range
/// day counts to the valid date range.
fn extract_year_and_days(days_since_epoch: i64) -> (i32, i32) {
    if days_since_epoch <= 0 {
        return (0, 0);
    }
    if days_since_epoch >= MAXIMUM_DAYS_SINCE_EPOCH {
        return (9999, 364);
    }
    let mut days = days_since_epoch;
    let years_400 = days / DAYS_PER_CYCLE_400;
    days %= DAYS_PER_CYCLE_400;
    if days < 366 {
        // Still within the leap year that starts the 400-year cycle.
        return ((years_400 * 400) as i32, days as i32);
    }
    days -= 1;
    let years_100 = days / DAYS_PER_CYCLE_100;
    days %= DAYS_PER_CYCLE_100;
    if days < 365 {
        // The exceptional non-leap year of the 100-year cycle.
        return ((years_400 * 400 + years_100 * 100) as i32, days as i32);
    }
    days += 1;
    let years_4 = days / DAYS_PER_CYCLE_4;
    days %= DAYS_PER_CYCLE_4;
    let mut years = years_400 * 400 + years_100 * 100 + years_4 * 4;
    if days >= 366 {
        days -= 1;
        years += days / 365;
        days %= 365;
    }
    if years > 9999 {
        return (9999, 364);
    }
    (years as i32, days as i32)
}

/// Extract the month and day from a year and a zero-based day of the year.
fn extract_month_and_day(year: i32, day_of_year: i32) -> (i32, i32) {
    if !(0..=9999).contains(&year) {
        return (0, 0);
    }
    let table = if is_leap_year(year) {
        &DAY_OF_LEAP_YEAR
    } else {
        &DAY_OF_YEAR
    };
    if day_of_year < 0 || day_of_year >= table[12] {
        return (0, 0);
    }
    for month in 1..=12usize {
        if day_of_year < table[month] {
            return (month as i32, day_of_year - table[month - 1] + 1);
        }
    }
    (0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(2024, true)]
    #[case(2023, false)]
    #[case(2000, true)]
    #[case(1900, false)]
    #[case(1600, true)]
    fn leap_years(#[case] year: i32, #[case] expected: bool) {
        assert_eq!(is_leap_year(year), expected);
    }

    #[rstest]
    #[case(2024, 2, 29)]
    #[case(2023, 2, 28)]
    #[case(2023, 1, 31)]
    #[case(2023, 4, 30)]
    fn month_lengths(#[case] year: i32, #[case] month: i32, #[case] expected: i32) {
        assert_eq!(days_in_month(year, month), expected);
    }

    #[rstest]
    #[case("0001-01-01", 1, 1, 1)]
    #[case("2024-02-29", 2024, 2, 29)]
    #[case("9999-12-31", 9999, 12, 31)]
    #[case("1970-01-01", 1970, 1, 1)]
    fn parse_and_extract(
        #[case] text: &str,
        #[case] year: i32,
        #[case] month: i32,
        #[case] day: i32,
    ) {
        let date = Date::from_str(text).unwrap();
        assert_eq!(date.year(), year);
        assert_eq!(date.month(), month);
        assert_eq!(date.day(), day);
        assert_eq!(format!("{date}"), text);
    }

    #[rstest]
    #[case("2023-02-29")]
    #[case("0000-01-01")]
    #[case("2023-13-01")]
    #[case("2023-00-01")]
    #[case("2023-01-00")]
    #[case("2023-01-32")]
    #[case("23-01-01")]
    #[case("2023-1-01")]
    #[case("2023-01-01x")]
    fn parse_invalid(#[case] text: &str) {
        assert!(Date::from_str(text).is_err());
    }

    #[test]
    fn ordering_follows_calendar() {
        let a = Date::new(2023, 12, 31).unwrap();
        let b = Date::new(2024, 1, 1).unwrap();
        assert!(a < b);
    }

    proptest! {
        #[test]
        fn days_since_epoch_round_trip(year in 1i32..=9999, month in 1i32..=12, day in 1i32..=28) {
            let date = Date::new(year, month, day).unwrap();
            let restored = Date::from_days_since_epoch(date.to_days_since_epoch());
            prop_assert_eq!(restored.year(), year);
            prop_assert_eq!(restored.month(), month);
            prop_assert_eq!(restored.day(), day);
        }
    }
}
