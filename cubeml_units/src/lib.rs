//! Physical units, calendars and time-reference units for the [`cubeml`](https://docs.rs/cubeml/latest/cubeml/index.html) crate.
//!
//! A [`Unit`] is either a symbolic unit (`m`, `K`, `degrees`, `1`, ...), one of the special
//! units `unknown` and `no_unit`, or a calendar-relative time unit such as
//! `hours since 1970-01-01 00:00:00` in the `360_day` [`Calendar`].
//!
//! ```rust
//! # use cubeml_units::{Calendar, Unit};
//! let unit = Unit::parse_with_calendar("hour since 1970-1-1", Some(Calendar::Day360))?;
//! assert_eq!(unit.to_string(), "hours since 1970-01-01 00:00:00");
//! assert_eq!(unit.calendar(), Some(Calendar::Day360));
//!
//! let kelvin = Unit::parse("kelvin")?;
//! assert_eq!(kelvin.convert(0.0, &Unit::parse("celsius")?)?, -273.15);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Licence
//! `cubeml_units` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

mod calendar;
mod timestamp;
mod unit;
mod unit_errors;

pub use calendar::Calendar;
pub use timestamp::Timestamp;
pub use unit::{Dimension, TimeReference, TimeStep, Unit};
pub use unit_errors::{
    InvalidTimestampError, TimestampParseError, UnitConversionError, UnitParseError,
    UnknownCalendarError,
};
