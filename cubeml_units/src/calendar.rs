//! Calendars governing time-reference arithmetic.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use derive_more::Display;

use crate::{InvalidTimestampError, Timestamp, UnknownCalendarError};

const SECONDS_PER_DAY: i64 = 86_400;

const CUMULATIVE_DAYS_365: [u32; 13] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334, 365];
const CUMULATIVE_DAYS_366: [u32; 13] = [0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335, 366];

/// A named day/time convention.
///
/// The `gregorian` calendar is treated as proleptic, so it shares its arithmetic with
/// `proleptic_gregorian` while keeping its own name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum Calendar {
    /// The `gregorian` (alias `standard`) calendar.
    #[default]
    #[display("gregorian")]
    Gregorian,
    /// The `proleptic_gregorian` calendar.
    #[display("proleptic_gregorian")]
    ProlepticGregorian,
    /// The `julian` calendar, a leap year every fourth year.
    #[display("julian")]
    Julian,
    /// Twelve 30 day months.
    #[display("360_day")]
    Day360,
    /// No leap years (alias `noleap`).
    #[display("365_day")]
    Day365,
    /// Every year is a leap year (alias `all_leap`).
    #[display("366_day")]
    Day366,
}

impl FromStr for Calendar {
    type Err = UnknownCalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gregorian" | "standard" => Ok(Self::Gregorian),
            "proleptic_gregorian" => Ok(Self::ProlepticGregorian),
            "julian" => Ok(Self::Julian),
            "360_day" => Ok(Self::Day360),
            "365_day" | "noleap" => Ok(Self::Day365),
            "366_day" | "all_leap" => Ok(Self::Day366),
            _ => Err(UnknownCalendarError(s.to_string())),
        }
    }
}

impl Calendar {
    /// Returns true if `year` is a leap year in this calendar.
    #[must_use]
    pub fn is_leap_year(self, year: i32) -> bool {
        match self {
            Self::Gregorian | Self::ProlepticGregorian => {
                year.rem_euclid(4) == 0 && (year.rem_euclid(100) != 0 || year.rem_euclid(400) == 0)
            }
            Self::Julian => year.rem_euclid(4) == 0,
            Self::Day360 | Self::Day365 => false,
            Self::Day366 => true,
        }
    }

    /// The number of days in `month` (1-based) of `year`, or zero for an invalid month.
    #[must_use]
    pub fn days_in_month(self, year: i32, month: u32) -> u32 {
        if !(1..=12).contains(&month) {
            return 0;
        }
        if self == Self::Day360 {
            return 30;
        }
        let cumulative = if self.is_leap_year(year) {
            &CUMULATIVE_DAYS_366
        } else {
            &CUMULATIVE_DAYS_365
        };
        let month = month as usize;
        cumulative[month] - cumulative[month - 1]
    }

    /// Check that `timestamp` names a real instant in this calendar.
    ///
    /// # Errors
    /// Returns [`InvalidTimestampError`] if a field is out of range.
    pub fn validate(self, timestamp: &Timestamp) -> Result<(), InvalidTimestampError> {
        let invalid = |reason: &str| InvalidTimestampError {
            timestamp: timestamp.to_string(),
            calendar: self,
            reason: reason.to_string(),
        };
        if !(1..=12).contains(&timestamp.month) {
            return Err(invalid("month must be in 1..=12"));
        }
        let days = self.days_in_month(timestamp.year, timestamp.month);
        if timestamp.day == 0 || timestamp.day > days {
            return Err(invalid(&format!("day must be in 1..={days}")));
        }
        if timestamp.hour > 23 {
            return Err(invalid("hour must be in 0..=23"));
        }
        if timestamp.minute > 59 {
            return Err(invalid("minute must be in 0..=59"));
        }
        if timestamp.second > 59 {
            return Err(invalid("second must be in 0..=59"));
        }
        if timestamp.microsecond > 999_999 {
            return Err(invalid("microsecond must be in 0..=999999"));
        }
        Ok(())
    }

    /// The number of whole days between this calendar's epoch and the date of `timestamp`.
    ///
    /// Only differences between two day counts in the same calendar are meaningful.
    ///
    /// # Errors
    /// Returns [`InvalidTimestampError`] if `timestamp` is not valid in this calendar.
    pub fn day_number(self, timestamp: &Timestamp) -> Result<i64, InvalidTimestampError> {
        self.validate(timestamp)?;
        let (year, month, day) = (timestamp.year, timestamp.month, timestamp.day);
        let day_number = match self {
            Self::Gregorian | Self::ProlepticGregorian => NaiveDate::from_ymd_opt(year, month, day)
                .map(|date| i64::from(date.num_days_from_ce()))
                .ok_or_else(|| InvalidTimestampError {
                    timestamp: timestamp.to_string(),
                    calendar: self,
                    reason: "date is out of the supported range".to_string(),
                })?,
            Self::Julian => {
                let a = (14 - i64::from(month)) / 12;
                let y = i64::from(year) + 4800 - a;
                let m = i64::from(month) + 12 * a - 3;
                i64::from(day) + (153 * m + 2) / 5 + 365 * y + y.div_euclid(4) - 32083
            }
            Self::Day360 => i64::from(year) * 360 + i64::from(month - 1) * 30 + i64::from(day - 1),
            Self::Day365 => {
                i64::from(year) * 365
                    + i64::from(CUMULATIVE_DAYS_365[month as usize - 1])
                    + i64::from(day - 1)
            }
            Self::Day366 => {
                i64::from(year) * 366
                    + i64::from(CUMULATIVE_DAYS_366[month as usize - 1])
                    + i64::from(day - 1)
            }
        };
        Ok(day_number)
    }

    /// The inverse of [`Calendar::day_number`], returning `(year, month, day)`.
    #[must_use]
    pub fn date_from_day_number(self, day_number: i64) -> Option<(i32, u32, u32)> {
        match self {
            Self::Gregorian | Self::ProlepticGregorian => {
                let days = i32::try_from(day_number).ok()?;
                let date = NaiveDate::from_num_days_from_ce_opt(days)?;
                Some((date.year(), date.month(), date.day()))
            }
            Self::Julian => {
                let c = day_number + 32082;
                let d = (4 * c + 3).div_euclid(1461);
                let e = c - (1461 * d).div_euclid(4);
                let m = (5 * e + 2) / 153;
                let day = e - (153 * m + 2) / 5 + 1;
                let month = m + 3 - 12 * (m / 10);
                let year = d - 4800 + m / 10;
                Some((
                    i32::try_from(year).ok()?,
                    u32::try_from(month).ok()?,
                    u32::try_from(day).ok()?,
                ))
            }
            Self::Day360 => {
                let year = day_number.div_euclid(360);
                let remainder = day_number.rem_euclid(360);
                Some((
                    i32::try_from(year).ok()?,
                    u32::try_from(remainder / 30 + 1).ok()?,
                    u32::try_from(remainder % 30 + 1).ok()?,
                ))
            }
            Self::Day365 | Self::Day366 => {
                let (length, cumulative) = if self == Self::Day365 {
                    (365, &CUMULATIVE_DAYS_365)
                } else {
                    (366, &CUMULATIVE_DAYS_366)
                };
                let year = day_number.div_euclid(length);
                let remainder = u32::try_from(day_number.rem_euclid(length)).ok()?;
                let month = cumulative.iter().rposition(|&start| start <= remainder)?;
                let month = u32::try_from(month).ok()?;
                Some((
                    i32::try_from(year).ok()?,
                    month + 1,
                    remainder - cumulative[month as usize] + 1,
                ))
            }
        }
    }

    /// Seconds between this calendar's epoch and `timestamp`.
    ///
    /// # Errors
    /// Returns [`InvalidTimestampError`] if `timestamp` is not valid in this calendar.
    pub fn seconds_since_epoch(self, timestamp: &Timestamp) -> Result<f64, InvalidTimestampError> {
        let days = self.day_number(timestamp)?;
        #[allow(clippy::cast_precision_loss)]
        let whole = (days * SECONDS_PER_DAY + timestamp.seconds_of_day()) as f64;
        Ok(whole + f64::from(timestamp.microsecond) * 1e-6)
    }

    /// The timestamp `seconds` after this calendar's epoch, rounded to the microsecond.
    #[must_use]
    pub fn timestamp_from_seconds(self, seconds: f64) -> Option<Timestamp> {
        if !seconds.is_finite() {
            return None;
        }
        let whole = seconds.floor();
        #[allow(clippy::cast_possible_truncation)]
        let micros = whole as i64 * 1_000_000 + ((seconds - whole) * 1e6).round() as i64;
        let micros_per_day = SECONDS_PER_DAY * 1_000_000;
        let day_number = micros.div_euclid(micros_per_day);
        let mut remainder = micros.rem_euclid(micros_per_day);
        let (year, month, day) = self.date_from_day_number(day_number)?;
        let microsecond = u32::try_from(remainder % 1_000_000).ok()?;
        remainder /= 1_000_000;
        let second = u32::try_from(remainder % 60).ok()?;
        remainder /= 60;
        let minute = u32::try_from(remainder % 60).ok()?;
        let hour = u32::try_from(remainder / 60).ok()?;
        Some(Timestamp {
            year,
            month,
            day,
            hour,
            minute,
            second,
            microsecond,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_aliases() {
        assert_eq!("standard".parse::<Calendar>().unwrap(), Calendar::Gregorian);
        assert_eq!("noleap".parse::<Calendar>().unwrap(), Calendar::Day365);
        assert_eq!("ALL_LEAP".parse::<Calendar>().unwrap(), Calendar::Day366);
        assert_eq!(Calendar::Day360.to_string(), "360_day");
        assert!("lunar".parse::<Calendar>().is_err());
    }

    #[test]
    fn calendar_leap_years() {
        assert!(Calendar::Gregorian.is_leap_year(2000));
        assert!(!Calendar::Gregorian.is_leap_year(1900));
        assert!(Calendar::Julian.is_leap_year(1900));
        assert!(!Calendar::Day365.is_leap_year(2000));
        assert_eq!(Calendar::Day360.days_in_month(2001, 2), 30);
        assert_eq!(Calendar::Gregorian.days_in_month(2001, 2), 28);
        assert_eq!(Calendar::Day366.days_in_month(2001, 2), 29);
    }

    #[test]
    fn calendar_validate() {
        let feb_30 = Timestamp::from_date(2000, 2, 30);
        assert!(Calendar::Day360.validate(&feb_30).is_ok());
        assert!(Calendar::Gregorian.validate(&feb_30).is_err());
        assert!(Calendar::Day365
            .validate(&Timestamp::from_date(2000, 13, 1))
            .is_err());
    }

    #[test]
    fn calendar_day_number_round_trip() {
        for calendar in [
            Calendar::Gregorian,
            Calendar::Julian,
            Calendar::Day360,
            Calendar::Day365,
            Calendar::Day366,
        ] {
            for (year, month, day) in [(1970, 1, 1), (2000, 2, 28), (1859, 12, 30), (2023, 7, 15)] {
                let timestamp = Timestamp::from_date(year, month, day);
                let day_number = calendar.day_number(&timestamp).unwrap();
                assert_eq!(
                    calendar.date_from_day_number(day_number),
                    Some((year, month, day)),
                    "{calendar}"
                );
            }
        }
    }

    #[test]
    fn calendar_day_number_differences() {
        let start = Timestamp::from_date(2000, 1, 1);
        let end = Timestamp::from_date(2001, 1, 1);
        let span = |calendar: Calendar| {
            calendar.day_number(&end).unwrap() - calendar.day_number(&start).unwrap()
        };
        assert_eq!(span(Calendar::Gregorian), 366);
        assert_eq!(span(Calendar::Day360), 360);
        assert_eq!(span(Calendar::Day365), 365);
        assert_eq!(span(Calendar::Day366), 366);
        assert_eq!(span(Calendar::Julian), 366);
    }

    #[test]
    fn calendar_seconds_round_trip() {
        let timestamp: Timestamp = "1970-01-02 06:30:15.25".parse().unwrap();
        let seconds = Calendar::Day360.seconds_since_epoch(&timestamp).unwrap();
        assert_eq!(
            Calendar::Day360.timestamp_from_seconds(seconds),
            Some(timestamp)
        );
    }
}
