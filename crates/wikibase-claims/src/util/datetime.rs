//! Wikibase time string parsing and formatting.
//!
//! The wire form looks like ISO 8601 with a mandatory sign and a year of at
//! least four digits:
//! - `+1969-07-20T00:00:00Z`
//! - `-0044-03-15T00:00:00Z`
//! - `-13798000000-00-00T00:00:00Z`
//!
//! Which components are meaningful depends on the precision code. Anything
//! finer than the precision is written as zero and never read back.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use lazy_static::lazy_static;
use num_bigint::{BigInt, Sign};
use regex::Regex;

use crate::model::TimePrecision;

lazy_static! {
    static ref YEAR: Regex = Regex::new(r"^([+-])([0-9]+)").unwrap();
    static ref YEAR_MONTH: Regex = Regex::new(r"^([+-])([0-9]+)-([0-9]+)").unwrap();
    static ref DATE_TIME: Regex = Regex::new(
        r"^([+-])([0-9]+)-([0-9]{2})-([0-9]{2})T([0-9]{2}):([0-9]{2}):([0-9]{2})Z?$"
    )
    .unwrap();
}

/// Error type for time string parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeParseError {
    pub message: String,
}

impl std::fmt::Display for DateTimeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DateTimeParseError {}

fn parse_error(message: &str) -> DateTimeParseError {
    DateTimeParseError {
        message: message.to_string(),
    }
}

/// Calendar components read from a time string.
///
/// `year` keeps the sign as written: `-0044` is 44 BCE and is stored as -44,
/// with no astronomical year-zero offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireTime {
    pub year: BigInt,
    pub month: Option<u8>,
    pub day: Option<u8>,
    pub time_of_day: Option<NaiveTime>,
}

/// Reads a signed year. `-0000` is rejected: there is no BCE year zero, and
/// the sign could not be kept in a `BigInt`.
fn signed_year(sign: &str, digits: &str) -> Result<BigInt, DateTimeParseError> {
    let magnitude = BigInt::from_str(digits).map_err(|_| parse_error("invalid year digits"))?;
    if sign != "-" {
        return Ok(magnitude);
    }
    if magnitude.sign() == Sign::NoSign {
        return Err(parse_error("year zero has no BCE form"));
    }
    Ok(-magnitude)
}

/// Reads a two-digit field already validated by the pattern.
fn two_digits(field: &str) -> u32 {
    field.bytes().fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
}

/// Parses a wire time string at the given precision.
///
/// - Coarser than month: only the sign and year digits are read.
/// - Month: sign, year and month; the day and time of day are not read.
/// - Day or finer: the full date and time are parsed and validated as a
///   proleptic Gregorian date. A negative sign means BCE, checked on the
///   astronomical year `1 - y`.
pub fn parse_wire_time(
    value: &str,
    precision: TimePrecision,
) -> Result<WireTime, DateTimeParseError> {
    if precision < TimePrecision::Month {
        let caps = YEAR
            .captures(value)
            .ok_or_else(|| parse_error("expected a signed year"))?;
        return Ok(WireTime {
            year: signed_year(&caps[1], &caps[2])?,
            month: None,
            day: None,
            time_of_day: None,
        });
    }

    if precision == TimePrecision::Month {
        let caps = YEAR_MONTH
            .captures(value)
            .ok_or_else(|| parse_error("expected a signed year and month"))?;
        let month = caps[3]
            .parse::<u8>()
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| parse_error("month out of range"))?;
        return Ok(WireTime {
            year: signed_year(&caps[1], &caps[2])?,
            month: Some(month),
            day: None,
            time_of_day: None,
        });
    }

    let caps = DATE_TIME
        .captures(value)
        .ok_or_else(|| parse_error("expected a signed date and time"))?;
    let year = signed_year(&caps[1], &caps[2])?;
    let year_of_era: i32 = caps[2]
        .parse()
        .map_err(|_| parse_error("year too large for day precision"))?;
    let astronomical_year = if year.sign() == Sign::Minus {
        1 - year_of_era
    } else {
        year_of_era
    };
    let date = NaiveDate::from_ymd_opt(astronomical_year, two_digits(&caps[3]), two_digits(&caps[4]))
        .ok_or_else(|| parse_error("no such calendar date"))?;
    let time_of_day = NaiveTime::from_hms_opt(
        two_digits(&caps[5]),
        two_digits(&caps[6]),
        two_digits(&caps[7]),
    )
    .ok_or_else(|| parse_error("no such time of day"))?;

    Ok(WireTime {
        year,
        month: Some(date.month() as u8),
        day: Some(date.day() as u8),
        time_of_day: Some(time_of_day),
    })
}

/// Formats components as a wire time string.
///
/// Components finer than `precision` are written as zero.
pub fn format_wire_time(
    year: &BigInt,
    month: Option<u8>,
    day: Option<u8>,
    time_of_day: Option<NaiveTime>,
    precision: TimePrecision,
) -> String {
    let sign = if year.sign() == Sign::Minus { '-' } else { '+' };
    let digits = year.magnitude().to_string();

    let (month, day) = if precision < TimePrecision::Month {
        (0, 0)
    } else if precision == TimePrecision::Month {
        (month.unwrap_or(0), 0)
    } else {
        (month.unwrap_or(0), day.unwrap_or(0))
    };
    let (hour, minute, second) = match time_of_day {
        Some(t) if precision > TimePrecision::Month => (t.hour(), t.minute(), t.second()),
        _ => (0, 0, 0),
    };

    format!("{sign}{digits:0>4}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}Z")
}
