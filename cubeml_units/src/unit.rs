//! Physical units.

mod definitions;

use std::str::FromStr;

use derive_more::Display;

pub use definitions::Dimension;
use definitions::UnitDefinition;

use crate::{Calendar, InvalidTimestampError, Timestamp, UnitConversionError, UnitParseError};

/// The step of a time-reference unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TimeStep {
    /// Seconds.
    #[display("seconds")]
    Seconds,
    /// Minutes.
    #[display("minutes")]
    Minutes,
    /// Hours.
    #[display("hours")]
    Hours,
    /// Days.
    #[display("days")]
    Days,
}

impl TimeStep {
    fn parse(step: &str) -> Option<Self> {
        match step {
            "s" | "sec" | "secs" | "second" | "seconds" => Some(Self::Seconds),
            "min" | "mins" | "minute" | "minutes" => Some(Self::Minutes),
            "h" | "hr" | "hrs" | "hour" | "hours" => Some(Self::Hours),
            "d" | "day" | "days" => Some(Self::Days),
            _ => None,
        }
    }

    /// The length of the step in seconds.
    #[must_use]
    pub const fn seconds(self) -> f64 {
        match self {
            Self::Seconds => 1.0,
            Self::Minutes => 60.0,
            Self::Hours => 3600.0,
            Self::Days => 86400.0,
        }
    }
}

/// A `<step> since <origin>` unit in a calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeReference {
    step: TimeStep,
    origin: Timestamp,
    calendar: Calendar,
}

impl TimeReference {
    /// Create a new time reference.
    ///
    /// # Errors
    /// Returns [`InvalidTimestampError`] if `origin` does not exist in `calendar`.
    pub fn new(
        step: TimeStep,
        origin: Timestamp,
        calendar: Calendar,
    ) -> Result<Self, InvalidTimestampError> {
        calendar.validate(&origin)?;
        Ok(Self {
            step,
            origin,
            calendar,
        })
    }

    /// The time step.
    #[must_use]
    pub const fn step(&self) -> TimeStep {
        self.step
    }

    /// The origin.
    #[must_use]
    pub const fn origin(&self) -> &Timestamp {
        &self.origin
    }

    /// The calendar.
    #[must_use]
    pub const fn calendar(&self) -> Calendar {
        self.calendar
    }

    fn origin_seconds(&self) -> f64 {
        // The origin was validated on construction.
        self.calendar
            .seconds_since_epoch(&self.origin)
            .unwrap_or_default()
    }

    /// Convert an offset in this unit to a timestamp.
    #[must_use]
    pub fn num2date(&self, value: f64) -> Option<Timestamp> {
        self.calendar
            .timestamp_from_seconds(self.origin_seconds() + value * self.step.seconds())
    }

    /// Convert a timestamp to an offset in this unit.
    ///
    /// # Errors
    /// Returns [`InvalidTimestampError`] if `timestamp` does not exist in the calendar.
    pub fn date2num(&self, timestamp: &Timestamp) -> Result<f64, InvalidTimestampError> {
        let seconds = self.calendar.seconds_since_epoch(timestamp)?;
        Ok((seconds - self.origin_seconds()) / self.step.seconds())
    }
}

impl std::fmt::Display for TimeReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} since {}", self.step, self.origin)
    }
}

/// A physical unit in canonical form.
///
/// Construct units with [`Unit::parse`] so that equal units compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Unit {
    /// The unit is not known.
    #[default]
    Unknown,
    /// The quantity has no unit (e.g. a category label).
    NoUnit,
    /// A symbolic unit such as `m`, `K` or `1`.
    Symbol(String),
    /// A calendar-relative time unit.
    TimeReference(TimeReference),
}

fn is_unit_character(c: char) -> bool {
    c.is_alphanumeric()
        || matches!(
            c,
            ' ' | '_' | '-' | '+' | '/' | '.' | '^' | '*' | '%' | '(' | ')' | '°'
        )
}

impl Unit {
    /// The dimensionless unit `1`.
    #[must_use]
    pub fn dimensionless() -> Self {
        Self::Symbol("1".to_string())
    }

    /// The angular unit `radians`.
    #[must_use]
    pub fn radians() -> Self {
        Self::Symbol("radians".to_string())
    }

    /// Parse a unit in the `gregorian` calendar.
    ///
    /// # Errors
    /// Returns [`UnitParseError`] if `unit` is neither a symbolic unit nor a valid `<step> since <timestamp>` unit.
    pub fn parse(unit: &str) -> Result<Self, UnitParseError> {
        Self::parse_with_calendar(unit, None)
    }

    /// Parse a unit, using `calendar` for time-reference units.
    ///
    /// The calendar is ignored for other units.
    ///
    /// # Errors
    /// Returns [`UnitParseError`] if `unit` is neither a symbolic unit nor a valid `<step> since <timestamp>` unit,
    /// or the origin does not exist in the calendar.
    pub fn parse_with_calendar(
        unit: &str,
        calendar: Option<Calendar>,
    ) -> Result<Self, UnitParseError> {
        let normalised = unit.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalised.is_empty() {
            return Err(UnitParseError::Empty);
        }

        if let Some((step, origin)) = split_since(&normalised) {
            let step = TimeStep::parse(step).ok_or_else(|| UnitParseError::InvalidTimeStep {
                unit: unit.to_string(),
                step: step.to_string(),
            })?;
            if origin.is_empty() {
                return Err(UnitParseError::MissingOrigin(unit.to_string()));
            }
            let origin: Timestamp = origin.parse()?;
            let reference = TimeReference::new(step, origin, calendar.unwrap_or_default())?;
            return Ok(Self::TimeReference(reference));
        }

        if let Some(character) = normalised.chars().find(|c| !is_unit_character(*c)) {
            return Err(UnitParseError::InvalidCharacter {
                unit: unit.to_string(),
                character,
            });
        }
        Ok(match normalised.as_str() {
            "unknown" | "?" => Self::Unknown,
            "no_unit" | "no unit" => Self::NoUnit,
            symbol => Self::Symbol(
                definitions::lookup(symbol)
                    .map_or(normalised.clone(), |definition| definition.symbol.to_string()),
            ),
        })
    }

    fn definition(&self) -> Option<&'static UnitDefinition> {
        match self {
            Self::Symbol(symbol) => definitions::lookup(symbol),
            Self::Unknown | Self::NoUnit | Self::TimeReference(_) => None,
        }
    }

    /// The physical dimension, if the unit is known.
    #[must_use]
    pub fn dimension(&self) -> Option<Dimension> {
        match self {
            Self::TimeReference(_) => Some(Dimension::Time),
            _ => self.definition().map(|definition| definition.dimension),
        }
    }

    /// Returns true for `unknown`.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Returns true for `no_unit`.
    #[must_use]
    pub fn is_no_unit(&self) -> bool {
        matches!(self, Self::NoUnit)
    }

    /// Returns true for `1` and `%`.
    #[must_use]
    pub fn is_dimensionless(&self) -> bool {
        self.dimension() == Some(Dimension::Dimensionless)
    }

    /// Returns true for a `<step> since <origin>` unit.
    #[must_use]
    pub fn is_time_reference(&self) -> bool {
        matches!(self, Self::TimeReference(_))
    }

    /// The time reference of a `<step> since <origin>` unit.
    #[must_use]
    pub fn time_reference(&self) -> Option<&TimeReference> {
        match self {
            Self::TimeReference(reference) => Some(reference),
            _ => None,
        }
    }

    /// The origin of a time-reference unit.
    #[must_use]
    pub fn origin(&self) -> Option<&Timestamp> {
        self.time_reference().map(TimeReference::origin)
    }

    /// The calendar of a time-reference unit.
    #[must_use]
    pub fn calendar(&self) -> Option<Calendar> {
        self.time_reference().map(TimeReference::calendar)
    }

    /// The value after which the unit wraps around, for angles.
    #[must_use]
    pub fn modulus(&self) -> Option<f64> {
        match self.definition().map(|definition| definition.symbol) {
            Some("degrees") => Some(360.0),
            Some("radians") => Some(std::f64::consts::TAU),
            _ => None,
        }
    }

    /// Returns true if values in this unit can be converted to `other`.
    #[must_use]
    pub fn is_convertible(&self, other: &Self) -> bool {
        if self == other {
            return true;
        }
        match (self, other) {
            (Self::TimeReference(a), Self::TimeReference(b)) => a.calendar == b.calendar,
            _ => match (self.definition(), other.definition()) {
                (Some(a), Some(b)) => a.dimension == b.dimension,
                _ => false,
            },
        }
    }

    /// Convert `value` from this unit to `other`.
    ///
    /// # Errors
    /// Returns [`UnitConversionError`] if the units are not convertible.
    pub fn convert(&self, value: f64, other: &Self) -> Result<f64, UnitConversionError> {
        if self == other {
            return Ok(value);
        }
        let error = || UnitConversionError {
            from: self.to_string(),
            to: other.to_string(),
        };
        match (self, other) {
            (Self::TimeReference(from), Self::TimeReference(to)) => {
                if from.calendar != to.calendar {
                    return Err(error());
                }
                let seconds = from.origin_seconds() + value * from.step.seconds();
                Ok((seconds - to.origin_seconds()) / to.step.seconds())
            }
            _ => match (self.definition(), other.definition()) {
                (Some(from), Some(to)) if from.dimension == to.dimension => {
                    Ok((value * from.scale + from.offset - to.offset) / to.scale)
                }
                _ => Err(error()),
            },
        }
    }
}

/// Split `<step> since <origin>` into its parts.
fn split_since(unit: &str) -> Option<(&str, &str)> {
    let lower = unit.to_ascii_lowercase();
    if let Some(index) = lower.find(" since") {
        let origin = unit[index + " since".len()..].trim();
        return Some((unit[..index].trim(), origin));
    }
    lower.strip_prefix("since").map(|_| ("", unit["since".len()..].trim()))
}

impl FromStr for Unit {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::NoUnit => write!(f, "no_unit"),
            Self::Symbol(symbol) => write!(f, "{symbol}"),
            Self::TimeReference(reference) => write!(f, "{reference}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_symbolic() {
        assert_eq!(Unit::parse("meter").unwrap(), Unit::parse("m").unwrap());
        assert_eq!(Unit::parse("  kelvin ").unwrap().to_string(), "K");
        assert_eq!(Unit::parse("degree").unwrap().to_string(), "degrees");
        assert_eq!(Unit::parse("kg  m-2 s-1").unwrap().to_string(), "kg m-2 s-1");
        assert_eq!(Unit::parse("unknown").unwrap(), Unit::Unknown);
        assert_eq!(Unit::parse("no_unit").unwrap(), Unit::NoUnit);
        assert!(Unit::parse("1").unwrap().is_dimensionless());
        assert_ne!(Unit::parse("m").unwrap(), Unit::parse("km").unwrap());
    }

    #[test]
    fn unit_parse_errors() {
        assert_eq!(Unit::parse("   "), Err(UnitParseError::Empty));
        assert!(matches!(
            Unit::parse("m;drop"),
            Err(UnitParseError::InvalidCharacter { character: ';', .. })
        ));
        assert!(matches!(
            Unit::parse("metres since 1970-01-01"),
            Err(UnitParseError::InvalidTimeStep { .. })
        ));
        assert!(matches!(
            Unit::parse("hours since"),
            Err(UnitParseError::MissingOrigin(_))
        ));
        assert!(matches!(
            Unit::parse("hours since yesterday"),
            Err(UnitParseError::Timestamp(_))
        ));
        assert!(matches!(
            Unit::parse("days since 2000-02-30"),
            Err(UnitParseError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn unit_time_reference() {
        let unit = Unit::parse_with_calendar(
            "hour since 1970-01-01 00:00:00",
            Some(Calendar::Day360),
        )
        .unwrap();
        assert!(unit.is_time_reference());
        assert_eq!(unit.to_string(), "hours since 1970-01-01 00:00:00");
        assert_eq!(unit.calendar(), Some(Calendar::Day360));
        assert_eq!(unit.origin(), Some(&Timestamp::from_date(1970, 1, 1)));

        let gregorian = Unit::parse("hours since 1970-01-01 00:00:00").unwrap();
        assert_ne!(unit, gregorian);
        assert_eq!(
            gregorian,
            Unit::parse_with_calendar("hours since 1970-1-1", Some(Calendar::Gregorian)).unwrap()
        );
        assert_ne!(
            gregorian,
            Unit::parse("hours since 1970-01-01 00:00:01").unwrap()
        );
        assert!(Unit::parse_with_calendar("days since 2000-02-30", Some(Calendar::Day360)).is_ok());
    }

    #[test]
    fn unit_convert() {
        let m = Unit::parse("m").unwrap();
        let km = Unit::parse("km").unwrap();
        assert!((m.convert(1500.0, &km).unwrap() - 1.5).abs() < 1e-12);

        let kelvin = Unit::parse("K").unwrap();
        let celsius = Unit::parse("celsius").unwrap();
        assert!((celsius.convert(0.0, &kelvin).unwrap() - 273.15).abs() < 1e-9);
        let fahrenheit = Unit::parse("degF").unwrap();
        assert!((fahrenheit.convert(212.0, &celsius).unwrap() - 100.0).abs() < 1e-9);

        let degrees = Unit::parse("degrees").unwrap();
        let radians = Unit::parse("radians").unwrap();
        assert!((degrees.convert(180.0, &radians).unwrap() - std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(degrees.modulus(), Some(360.0));
        assert!(m.modulus().is_none());

        assert!(m.convert(1.0, &kelvin).is_err());
        assert!(!m.is_convertible(&Unit::Unknown));
    }

    #[test]
    fn unit_convert_time_reference() {
        let hours = Unit::parse("hours since 1970-01-01 00:00:00").unwrap();
        let days = Unit::parse("days since 1970-01-02").unwrap();
        assert!((hours.convert(48.0, &days).unwrap() - 1.0).abs() < 1e-12);

        let days_360 =
            Unit::parse_with_calendar("days since 1970-01-02", Some(Calendar::Day360)).unwrap();
        assert!(!hours.is_convertible(&days_360));
        assert!(hours.convert(48.0, &days_360).is_err());
    }

    #[test]
    fn time_reference_dates() {
        let unit = Unit::parse_with_calendar("days since 2000-01-01", Some(Calendar::Day360))
            .unwrap();
        let reference = unit.time_reference().unwrap();
        assert_eq!(
            reference.num2date(59.5),
            Some(Timestamp::from_date(2000, 2, 30).with_time(12, 0, 0))
        );
        assert_eq!(
            reference.date2num(&Timestamp::from_date(2001, 1, 1)).unwrap(),
            360.0
        );
        assert!(reference
            .date2num(&Timestamp::from_date(2001, 1, 31))
            .is_err());
    }
}
