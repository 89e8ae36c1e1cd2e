use thiserror::Error;

use crate::Calendar;

/// An unknown calendar name.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown calendar `{0}`")]
pub struct UnknownCalendarError(pub String);

/// A timestamp that could not be parsed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid timestamp `{timestamp}`: {reason}")]
pub struct TimestampParseError {
    timestamp: String,
    reason: String,
}

impl TimestampParseError {
    /// Create a new timestamp parse error.
    #[must_use]
    pub fn new(timestamp: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            reason: reason.into(),
        }
    }
}

/// A timestamp that does not exist in a calendar.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("timestamp `{timestamp}` is not valid in the `{calendar}` calendar: {reason}")]
pub struct InvalidTimestampError {
    /// The timestamp.
    pub timestamp: String,
    /// The calendar.
    pub calendar: Calendar,
    /// Why it is invalid.
    pub reason: String,
}

/// A unit parse error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum UnitParseError {
    /// The unit string is empty.
    #[error("unit string is empty")]
    Empty,
    /// The unit string contains a character that cannot appear in a unit.
    #[error("invalid character {character:?} in unit `{unit}`")]
    InvalidCharacter {
        /// The unit string.
        unit: String,
        /// The offending character.
        character: char,
    },
    /// The unit before `since` is not a time step.
    #[error("`{step}` is not a time step in time unit `{unit}`")]
    InvalidTimeStep {
        /// The unit string.
        unit: String,
        /// The step.
        step: String,
    },
    /// A `since` clause with no origin.
    #[error("time unit `{0}` has no origin after `since`")]
    MissingOrigin(String),
    /// The origin could not be parsed.
    #[error(transparent)]
    Timestamp(#[from] TimestampParseError),
    /// The origin does not exist in the calendar.
    #[error(transparent)]
    InvalidTimestamp(#[from] InvalidTimestampError),
    /// The calendar is unknown.
    #[error(transparent)]
    Calendar(#[from] UnknownCalendarError),
}

/// Two units that cannot be converted between.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("cannot convert from `{from}` to `{to}`")]
pub struct UnitConversionError {
    /// The source unit.
    pub from: String,
    /// The target unit.
    pub to: String,
}
