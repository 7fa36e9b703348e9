//! Time axis normalisation
//!
//! Observation times arrive in several shapes: serial day numbers, calendar
//! triples, formatted strings or `chrono` values. Everything is normalised to
//! a continuous day number where day 1 is 0000-01-01 in the proleptic
//! Gregorian calendar (so 2000-01-01 is day 730486) and fractional days carry
//! the time of day.
//!
//! # Examples
//!
//! ```rust
//! use amo_core::time::{to_day_number, TimeAxis, TimeValue};
//!
//! assert_eq!(to_day_number(&TimeValue::from((2000, 1, 1))).unwrap(), 730486.0);
//! assert_eq!(to_day_number(&TimeValue::from("2000-01-01 12:00:00")).unwrap(), 730486.5);
//!
//! // Day numbers pass through untouched
//! assert_eq!(to_day_number(&TimeValue::from(730486.25)).unwrap(), 730486.25);
//!
//! let axis = TimeAxis::new(vec!["2000-01-15", "2000-02-15"]).unwrap();
//! assert_eq!(axis.len(), 2);
//! assert_eq!(axis.months(), vec![1, 2]);
//! ```

use crate::errors::{AmoError, AmoResult};
use crate::timeseries::FloatValue;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Offset between chrono's days-from-CE count (0001-01-01 is day 1) and the
/// serial day number (0000-01-01 is day 1). Year 0 is a leap year.
const DAY_NUMBER_OFFSET: i64 = 366;

const SECONDS_PER_DAY: FloatValue = 86_400.0;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d-%b-%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d-%b-%Y", "%d %b %Y"];

/// A single observation time in any supported representation.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeValue {
    /// Serial day number, passed through unchanged
    DayNumber(FloatValue),
    /// Calendar date as year, month (1-12) and day (1-31)
    Calendar { year: i32, month: u32, day: u32 },
    /// Formatted date or date-time string, e.g. `2001-03-15` or `15-Mar-2001 06:00:00`
    Text(String),
    /// Date and time of day
    DateTime(NaiveDateTime),
}

impl From<FloatValue> for TimeValue {
    fn from(value: FloatValue) -> Self {
        TimeValue::DayNumber(value)
    }
}

impl From<(i32, u32, u32)> for TimeValue {
    fn from((year, month, day): (i32, u32, u32)) -> Self {
        TimeValue::Calendar { year, month, day }
    }
}

impl From<&str> for TimeValue {
    fn from(value: &str) -> Self {
        TimeValue::Text(value.to_string())
    }
}

impl From<String> for TimeValue {
    fn from(value: String) -> Self {
        TimeValue::Text(value)
    }
}

impl From<NaiveDate> for TimeValue {
    fn from(value: NaiveDate) -> Self {
        TimeValue::DateTime(value.and_time(NaiveTime::MIN))
    }
}

impl From<NaiveDateTime> for TimeValue {
    fn from(value: NaiveDateTime) -> Self {
        TimeValue::DateTime(value)
    }
}

fn invalid(value: &TimeValue, reason: &str) -> AmoError {
    let value = match value {
        TimeValue::DayNumber(v) => v.to_string(),
        TimeValue::Calendar { year, month, day } => format!("{year:04}-{month:02}-{day:02}"),
        TimeValue::Text(s) => s.clone(),
        TimeValue::DateTime(dt) => dt.to_string(),
    };
    AmoError::InvalidTime {
        value,
        reason: reason.to_string(),
    }
}

fn date_to_day_number(date: NaiveDate) -> FloatValue {
    (date.num_days_from_ce() as i64 + DAY_NUMBER_OFFSET) as FloatValue
}

fn datetime_to_day_number(datetime: NaiveDateTime) -> FloatValue {
    let time = datetime.time();
    let seconds = time.num_seconds_from_midnight() as FloatValue
        + time.nanosecond() as FloatValue * 1e-9;
    date_to_day_number(datetime.date()) + seconds / SECONDS_PER_DAY
}

fn parse_text(text: &str) -> Option<FloatValue> {
    let text = text.trim();

    if let Ok(value) = text.parse::<FloatValue>() {
        return value.is_finite().then_some(value);
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime_to_day_number(dt));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date_to_day_number(date));
        }
    }
    None
}

/// Normalise a time value to a continuous day number.
///
/// Day numbers are returned unchanged, so the conversion is idempotent.
///
/// # Errors
///
/// [`AmoError::InvalidTime`] if the value is non-finite, names an impossible
/// calendar date, or is a string in none of the supported formats.
pub fn to_day_number(value: &TimeValue) -> AmoResult<FloatValue> {
    match value {
        TimeValue::DayNumber(v) if v.is_finite() => Ok(*v),
        TimeValue::DayNumber(_) => Err(invalid(value, "day number must be finite")),
        TimeValue::Calendar { year, month, day } => NaiveDate::from_ymd_opt(*year, *month, *day)
            .map(date_to_day_number)
            .ok_or_else(|| invalid(value, "not a valid calendar date")),
        TimeValue::Text(text) => {
            parse_text(text).ok_or_else(|| invalid(value, "unrecognised date format"))
        }
        TimeValue::DateTime(dt) => Ok(datetime_to_day_number(*dt)),
    }
}

/// Calendar date containing the given day number, if it is representable.
pub fn date_from_day_number(day_number: FloatValue) -> Option<NaiveDate> {
    if !day_number.is_finite() {
        return None;
    }
    let days_from_ce = day_number.floor() as i64 - DAY_NUMBER_OFFSET;
    i32::try_from(days_from_ce)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}

/// Ordered observation times, normalised to day numbers.
///
/// Built once per computation and immutable afterwards. Each point also keeps
/// the calendar date it falls on so that seasonal phases can be looked up
/// without further fallible conversions.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    day_numbers: Vec<FloatValue>,
    dates: Vec<NaiveDate>,
}

impl TimeAxis {
    /// Build a time axis from any mix of supported representations.
    pub fn new<I, T>(values: I) -> AmoResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<TimeValue>,
    {
        let day_numbers = values
            .into_iter()
            .map(|v| to_day_number(&v.into()))
            .collect::<AmoResult<Vec<_>>>()?;
        Self::from_day_numbers(day_numbers)
    }

    /// Build a time axis from serial day numbers.
    pub fn from_day_numbers(day_numbers: Vec<FloatValue>) -> AmoResult<Self> {
        let dates = day_numbers
            .iter()
            .map(|&d| {
                date_from_day_number(d).ok_or_else(|| {
                    invalid(
                        &TimeValue::DayNumber(d),
                        "outside the representable calendar range",
                    )
                })
            })
            .collect::<AmoResult<Vec<_>>>()?;

        Ok(Self { day_numbers, dates })
    }

    pub fn len(&self) -> usize {
        self.day_numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.day_numbers.is_empty()
    }

    pub fn day_numbers(&self) -> &[FloatValue] {
        &self.day_numbers
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Calendar month (1-12) of every time point
    pub fn months(&self) -> Vec<u32> {
        self.dates.iter().map(|d| d.month()).collect()
    }

    /// Ordinal day of year (1-366) of every time point
    pub fn days_of_year(&self) -> Vec<u32> {
        self.dates.iter().map(|d| d.ordinal()).collect()
    }
}
