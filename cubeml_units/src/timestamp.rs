//! Calendar-agnostic timestamps.

use std::fmt::Display;
use std::str::FromStr;

use crate::TimestampParseError;

/// A broken-down date and time of day.
///
/// A timestamp is not tied to a calendar, so `2000-02-30` is representable.
/// Use [`Calendar::validate`](crate::Calendar::validate) to check it against a calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp {
    /// The year.
    pub year: i32,
    /// The month, `1..=12`.
    pub month: u32,
    /// The day of the month, from 1.
    pub day: u32,
    /// The hour, `0..=23`.
    pub hour: u32,
    /// The minute, `0..=59`.
    pub minute: u32,
    /// The second, `0..=59`.
    pub second: u32,
    /// The microsecond, `0..=999_999`.
    pub microsecond: u32,
}

impl Timestamp {
    /// Create a timestamp at midnight of a date.
    #[must_use]
    pub const fn from_date(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
            microsecond: 0,
        }
    }

    /// Set the time of day.
    #[must_use]
    pub const fn with_time(mut self, hour: u32, minute: u32, second: u32) -> Self {
        self.hour = hour;
        self.minute = minute;
        self.second = second;
        self
    }

    /// Whole seconds elapsed since midnight.
    #[must_use]
    pub fn seconds_of_day(&self) -> i64 {
        i64::from(self.hour) * 3600 + i64::from(self.minute) * 60 + i64::from(self.second)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )?;
        if self.microsecond != 0 {
            write!(f, ".{:06}", self.microsecond)?;
        }
        Ok(())
    }
}

fn parse_field<T: FromStr>(
    text: &str,
    field: &str,
    original: &str,
) -> Result<T, TimestampParseError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimestampParseError::new(original, format!("invalid {field} `{text}`")));
    }
    text.parse::<T>()
        .map_err(|_| TimestampParseError::new(original, format!("invalid {field} `{text}`")))
}

/// Zero offsets accepted after the time of day.
const UTC_SUFFIXES: [&str; 6] = ["UTC", "Z", "0:00", "00:00", "+0:00", "+00:00"];

impl FromStr for Timestamp {
    type Err = TimestampParseError;

    /// Parse `YYYY-MM-DD`, optionally followed by ` HH:MM[:SS[.ffffff]]` (or `T` as the
    /// separator) and a zero UTC offset.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let text = text.strip_suffix('Z').unwrap_or(text);
        let (date, rest) = match text.find(['T', ' ']) {
            Some(index) => (&text[..index], text[index + 1..].trim()),
            None => (text, ""),
        };

        let (negative, date) = match date.strip_prefix('-') {
            Some(date) => (true, date),
            None => (false, date),
        };
        let date_fields: Vec<&str> = date.split('-').collect();
        let [year, month, day] = date_fields.as_slice() else {
            return Err(TimestampParseError::new(s, "expected a `YYYY-MM-DD` date"));
        };
        let mut year: i32 = parse_field(year, "year", s)?;
        if negative {
            year = -year;
        }
        let mut timestamp = Self::from_date(
            year,
            parse_field(month, "month", s)?,
            parse_field(day, "day", s)?,
        );

        let mut tokens = rest.split_whitespace();
        if let Some(time) = tokens.next() {
            let time_fields: Vec<&str> = time.split(':').collect();
            let (hour, minute, second) = match time_fields.as_slice() {
                [hour, minute] => (*hour, *minute, "0"),
                [hour, minute, second] => (*hour, *minute, *second),
                _ => return Err(TimestampParseError::new(s, "expected a `HH:MM[:SS]` time")),
            };
            timestamp.hour = parse_field(hour, "hour", s)?;
            timestamp.minute = parse_field(minute, "minute", s)?;
            let (second, fraction) = second.split_once('.').unwrap_or((second, ""));
            timestamp.second = parse_field(second, "second", s)?;
            if !fraction.is_empty() {
                if fraction.len() > 6 {
                    return Err(TimestampParseError::new(
                        s,
                        "fractional seconds beyond microseconds are not supported",
                    ));
                }
                let digits: u32 = parse_field(fraction, "fractional second", s)?;
                let scale = 10u32.pow(6 - u32::try_from(fraction.len()).unwrap_or(6));
                timestamp.microsecond = digits * scale;
            }
        }
        for token in tokens {
            if !UTC_SUFFIXES.contains(&token) {
                return Err(TimestampParseError::new(
                    s,
                    format!("unsupported time zone `{token}`"),
                ));
            }
        }
        Ok(timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_parse() {
        let timestamp: Timestamp = "1970-01-01 00:00:00".parse().unwrap();
        assert_eq!(timestamp, Timestamp::from_date(1970, 1, 1));
        assert_eq!(timestamp.to_string(), "1970-01-01 00:00:00");

        let timestamp: Timestamp = "1859-12-1T6:30Z".parse().unwrap();
        assert_eq!(timestamp, Timestamp::from_date(1859, 12, 1).with_time(6, 30, 0));

        let timestamp: Timestamp = "2000-02-30 12:00:00.5 UTC".parse().unwrap();
        assert_eq!(timestamp.microsecond, 500_000);
        assert_eq!(timestamp.to_string(), "2000-02-30 12:00:00.500000");

        let timestamp: Timestamp = "1970-01-01 00:00:00 0:00".parse().unwrap();
        assert_eq!(timestamp, Timestamp::from_date(1970, 1, 1));
    }

    #[test]
    fn timestamp_parse_invalid() {
        assert!("1970".parse::<Timestamp>().is_err());
        assert!("1970-01-xx".parse::<Timestamp>().is_err());
        assert!("1970-01-01 00".parse::<Timestamp>().is_err());
        assert!("1970-01-01 00:00:00 +05:00".parse::<Timestamp>().is_err());
        assert!("1970-01-01 00:00:00.1234567".parse::<Timestamp>().is_err());
    }
}
