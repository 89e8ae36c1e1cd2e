use std::f64::consts::PI;

/// The physical dimension shared by convertible units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// A pure number.
    Dimensionless,
    /// Length.
    Length,
    /// Mass.
    Mass,
    /// Time.
    Time,
    /// Thermodynamic temperature.
    Temperature,
    /// Pressure.
    Pressure,
    /// Plane angle.
    Angle,
    /// Speed.
    Speed,
}

/// A known unit: `base = value * scale + offset`.
#[derive(Debug)]
pub(crate) struct UnitDefinition {
    pub(crate) symbol: &'static str,
    pub(crate) aliases: &'static [&'static str],
    pub(crate) dimension: Dimension,
    pub(crate) scale: f64,
    pub(crate) offset: f64,
}

macro_rules! unit {
    ($symbol:literal, [$($alias:literal),*], $dimension:ident, $scale:expr) => {
        unit!($symbol, [$($alias),*], $dimension, $scale, 0.0)
    };
    ($symbol:literal, [$($alias:literal),*], $dimension:ident, $scale:expr, $offset:expr) => {
        UnitDefinition {
            symbol: $symbol,
            aliases: &[$($alias),*],
            dimension: Dimension::$dimension,
            scale: $scale,
            offset: $offset,
        }
    };
}

pub(crate) static DEFINITIONS: &[UnitDefinition] = &[
    unit!("1", [], Dimensionless, 1.0),
    unit!("%", ["percent"], Dimensionless, 0.01),
    unit!("m", ["meter", "meters", "metre", "metres"], Length, 1.0),
    unit!("km", ["kilometer", "kilometers", "kilometre", "kilometres"], Length, 1e3),
    unit!("cm", ["centimeter", "centimeters", "centimetre", "centimetres"], Length, 1e-2),
    unit!("mm", ["millimeter", "millimeters", "millimetre", "millimetres"], Length, 1e-3),
    unit!("kg", ["kilogram", "kilograms"], Mass, 1.0),
    unit!("g", ["gram", "grams"], Mass, 1e-3),
    unit!("s", ["second", "seconds", "sec", "secs"], Time, 1.0),
    unit!("min", ["minute", "minutes", "mins"], Time, 60.0),
    unit!("h", ["hour", "hours", "hr", "hrs"], Time, 3600.0),
    unit!("day", ["days", "d"], Time, 86400.0),
    unit!("K", ["kelvin", "kelvins", "degK"], Temperature, 1.0),
    unit!(
        "degC",
        ["celsius", "degree_Celsius", "degrees_Celsius", "deg_C", "degreeC"],
        Temperature,
        1.0,
        273.15
    ),
    unit!(
        "degF",
        ["fahrenheit", "degree_Fahrenheit", "degrees_Fahrenheit", "deg_F", "degreeF"],
        Temperature,
        5.0 / 9.0,
        459.67 * 5.0 / 9.0
    ),
    unit!("Pa", ["pascal", "pascals"], Pressure, 1.0),
    unit!("hPa", ["hectopascal", "hectopascals"], Pressure, 1e2),
    unit!("kPa", ["kilopascal", "kilopascals"], Pressure, 1e3),
    unit!("mbar", ["millibar", "millibars", "mb"], Pressure, 1e2),
    unit!("bar", ["bars"], Pressure, 1e5),
    unit!(
        "degrees",
        [
            "degree",
            "deg",
            "degrees_north",
            "degrees_east",
            "degree_north",
            "degree_east",
            "degrees_N",
            "degrees_E"
        ],
        Angle,
        PI / 180.0
    ),
    unit!("radians", ["radian", "rad"], Angle, 1.0),
    unit!("m s-1", ["m/s", "m s^-1", "m.s-1", "meters per second"], Speed, 1.0),
    unit!("km h-1", ["km/h", "kph"], Speed, 1.0 / 3.6),
];

/// Look up a unit by canonical symbol or alias.
pub(crate) fn lookup(symbol: &str) -> Option<&'static UnitDefinition> {
    DEFINITIONS
        .iter()
        .find(|definition| definition.symbol == symbol || definition.aliases.contains(&symbol))
}
