//! Coordinates.
//!
//! A [`Coord`] labels one or more dimensions of a [`Cube`](crate::Cube) with points,
//! optional cell bounds, a [`Unit`] and an optional [`CoordSystem`].
//!
//! Coordinates are created with a [`CoordBuilder`], which validates the points against the shape and value type,
//! and the bounds against the points.
//!
//! ```rust
//! # use cubeml::{CoordBuilder, units::Unit};
//! let latitude = CoordBuilder::new(vec![-45.0, 0.0, 45.0])
//!     .standard_name("latitude")
//!     .units(Unit::parse("degrees")?)
//!     .bounds(vec![-90.0, -22.5, -22.5, 22.5, 22.5, 90.0])
//!     .build()?;
//! assert_eq!(latitude.len(), 3);
//! assert!(latitude.has_bounds());
//! assert_eq!(latitude.name(), "latitude");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod coord_builder;
mod coord_errors;
mod coord_ops;

pub use coord_builder::CoordBuilder;
pub use coord_errors::{CoordOpError, CoordValidationError};

use std::fmt::Write as _;

use cubeml_units::Unit;

use crate::{
    attributes::{self, Attributes},
    cml::{
        cml_format::{elided_list, format_items, nest},
        CmlOptions,
    },
    values::{ValueArray, Values},
    Checksum, CoordSystem, DataType,
};

/// A coordinate.
#[derive(Debug, Clone)]
pub struct Coord {
    standard_name: Option<String>,
    long_name: Option<String>,
    var_name: Option<String>,
    units: Unit,
    attributes: Attributes,
    points: ValueArray,
    bounds: Option<ValueArray>,
    nbounds: usize,
    shape: Vec<usize>,
    value_type: DataType,
    coord_system: Option<CoordSystem>,
    circular: bool,
}

/// Equality is structural over the names, units, attributes, shape, points, bounds and coordinate system.
///
/// The `circular` flag and the value type do not take part: an `int32` and a `float64` coordinate with the same numbers are equal.
/// Elided points or bounds are compared by length and checksum.
impl PartialEq for Coord {
    fn eq(&self, other: &Self) -> bool {
        let bounds_eq = match (&self.bounds, &other.bounds) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                self.nbounds == other.nbounds
                    && a.equivalent(self.bounds_value_type(), b, other.bounds_value_type())
            }
            _ => false,
        };
        self.standard_name == other.standard_name
            && self.long_name == other.long_name
            && self.var_name == other.var_name
            && self.units == other.units
            && self.attributes == other.attributes
            && self.shape == other.shape
            && self.coord_system == other.coord_system
            && self
                .points
                .equivalent(self.value_type, &other.points, other.value_type)
            && bounds_eq
    }
}

impl Coord {
    /// The standard name.
    #[must_use]
    pub fn standard_name(&self) -> Option<&str> {
        self.standard_name.as_deref()
    }

    /// The long name.
    #[must_use]
    pub fn long_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }

    /// The variable name.
    #[must_use]
    pub fn var_name(&self) -> Option<&str> {
        self.var_name.as_deref()
    }

    /// A human-readable name: the standard name, long name or variable name, else `unknown`.
    #[must_use]
    pub fn name(&self) -> &str {
        resolve_name(
            self.standard_name.as_deref(),
            self.long_name.as_deref(),
            self.var_name.as_deref(),
        )
    }

    /// The units.
    #[must_use]
    pub fn units(&self) -> &Unit {
        &self.units
    }

    /// The attributes.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// The points.
    #[must_use]
    pub fn points(&self) -> &ValueArray {
        &self.points
    }

    /// The points, if they are held in full.
    #[must_use]
    pub fn explicit_points(&self) -> Option<&Values> {
        self.points.explicit()
    }

    /// The bounds in C order with shape `[..shape, nbounds]`.
    #[must_use]
    pub fn bounds(&self) -> Option<&ValueArray> {
        self.bounds.as_ref()
    }

    /// The number of bounds per cell, or zero without bounds.
    #[must_use]
    pub fn nbounds(&self) -> usize {
        if self.bounds.is_some() {
            self.nbounds
        } else {
            0
        }
    }

    /// Returns true if the coordinate has bounds.
    #[must_use]
    pub fn has_bounds(&self) -> bool {
        self.bounds.is_some()
    }

    /// The shape of the points.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The number of dimensions of the points.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// The number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false, a coordinate has at least one point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns true if the coordinate has a single point.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.len() == 1
    }

    /// The value type of the points.
    #[must_use]
    pub fn value_type(&self) -> DataType {
        self.value_type
    }

    /// The value type of the bounds.
    ///
    /// Integer bounds share an integer value type. Non-integral bounds of an integer coordinate are `float64`.
    #[must_use]
    pub fn bounds_value_type(&self) -> DataType {
        let bounds_are_float = match &self.bounds {
            Some(ValueArray::Explicit(values)) => matches!(values, Values::Float(_)),
            Some(ValueArray::Elided(elided)) => matches!(elided.head(), Values::Float(_)),
            None => self.value_type.is_float(),
        };
        match (bounds_are_float, self.value_type.is_float()) {
            (true, true) | (false, false) => self.value_type,
            (true, false) => DataType::Float64,
            (false, true) => DataType::Int64,
        }
    }

    /// The coordinate system.
    #[must_use]
    pub fn coord_system(&self) -> Option<&CoordSystem> {
        self.coord_system.as_ref()
    }

    /// Returns true if the coordinate wraps around its unit modulus.
    #[must_use]
    pub fn is_circular(&self) -> bool {
        self.circular
    }

    /// Set whether the coordinate wraps around its unit modulus.
    pub fn set_circular(&mut self, circular: bool) -> &mut Self {
        self.circular = circular;
        self
    }

    /// Set the units.
    pub fn set_units(&mut self, units: Unit) -> &mut Self {
        self.units = units;
        self
    }

    /// Set the variable name.
    pub fn set_var_name(&mut self, var_name: Option<String>) -> &mut Self {
        self.var_name = var_name.filter(|name| !name.is_empty());
        self
    }

    /// Rename the coordinate.
    ///
    /// The name becomes the long name, and the standard name and variable name are cleared.
    pub fn rename(&mut self, name: impl Into<String>) -> &mut Self {
        self.standard_name = None;
        self.long_name = Some(name.into()).filter(|name| !name.is_empty());
        self.var_name = None;
        self
    }

    /// The checksum of the points encoded as their value type.
    #[must_use]
    pub fn points_checksum(&self) -> Checksum {
        self.points.checksum(self.value_type)
    }

    /// The checksum of the bounds encoded as their value type.
    #[must_use]
    pub fn bounds_checksum(&self) -> Option<Checksum> {
        self.bounds
            .as_ref()
            .map(|bounds| bounds.checksum(self.bounds_value_type()))
    }

    /// A hash of the coordinate definition: the names, units, attributes and coordinate system.
    ///
    /// Coordinates describing the same quantity on different points share an identity.
    #[must_use]
    pub fn identity(&self) -> u32 {
        let mut definition = String::new();
        for name in [&self.standard_name, &self.long_name, &self.var_name] {
            definition.push_str(name.as_deref().unwrap_or_default());
            definition.push('\0');
        }
        let _ = write!(
            definition,
            "{}\0{}\0{}\0",
            self.units,
            self.units.calendar().map(|c| c.to_string()).unwrap_or_default(),
            attributes::to_sorted_json(&self.attributes)
        );
        if let Some(coord_system) = &self.coord_system {
            let _ = write!(definition, "{coord_system}");
        }
        Checksum::from_bytes(definition.as_bytes()).value()
    }

    /// Check the coordinate can describe a dimension.
    ///
    /// A dimension coordinate is one-dimensional and numeric, with strictly monotonic points
    /// and bounds that are monotonic in the same direction.
    /// Elided values are assumed to be monotonic.
    ///
    /// # Errors
    /// Returns a [`CoordValidationError`] describing the first failed rule.
    pub fn check_dim_coord(&self) -> Result<(), CoordValidationError> {
        let name = || self.name().to_string();
        if self.ndim() != 1 {
            return Err(CoordValidationError::NotOneDimensional {
                coord: name(),
                shape: self.shape.clone(),
            });
        }
        if !self.points.is_numeric() {
            return Err(CoordValidationError::NotNumeric(name()));
        }
        let Some(points) = self.points.explicit().and_then(Values::to_f64) else {
            return Ok(());
        };
        let direction = monotonic_direction(&points, true)
            .ok_or_else(|| CoordValidationError::NotMonotonic(name()))?;

        if let Some(bounds) = self.bounds.as_ref().and_then(ValueArray::explicit) {
            let bounds = bounds.to_f64().unwrap_or_default();
            for column in 0..self.nbounds {
                let column: Vec<f64> = bounds
                    .iter()
                    .skip(column)
                    .step_by(self.nbounds)
                    .copied()
                    .collect();
                match monotonic_direction(&column, false) {
                    Some(bounds_direction) if bounds_direction * direction >= 0 => {}
                    _ => return Err(CoordValidationError::BoundsNotMonotonic(name())),
                }
            }
        }
        Ok(())
    }
}

impl Coord {
    /// Display items for `values`, as dates if the units are a time reference.
    fn display_items(&self, values: &Values, data_type: DataType) -> Vec<String> {
        match (self.units.time_reference(), values.to_f64()) {
            (Some(reference), Some(numbers)) => numbers
                .into_iter()
                .map(|number| {
                    reference
                        .num2date(number)
                        .map_or_else(|| number.to_string(), |date| date.to_string())
                })
                .collect(),
            _ => format_items(values, data_type),
        }
    }

    fn display_array(&self, array: &ValueArray, data_type: DataType, shape: &[usize]) -> String {
        let options = CmlOptions::default();
        let elided = match array {
            ValueArray::Explicit(values) if values.len() > options.threshold() => {
                values.elide(options.edge_items(), data_type)
            }
            ValueArray::Explicit(values) => {
                return nest(&self.display_items(values, data_type), shape);
            }
            ValueArray::Elided(elided) => elided.clone(),
        };
        elided_list(
            self.display_items(elided.head(), data_type),
            self.display_items(elided.tail(), data_type),
        )
    }
}

/// A summary of the points, bounds and metadata.
///
/// Points and bounds with a time reference unit are shown as dates.
impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let points = self.display_array(&self.points, self.value_type, &self.shape);
        write!(f, "Coord({points}")?;
        if let Some(bounds) = &self.bounds {
            let mut shape = self.shape.clone();
            shape.push(self.nbounds);
            let bounds = self.display_array(bounds, self.bounds_value_type(), &shape);
            write!(f, ", bounds={bounds}")?;
        }
        write!(
            f,
            ", standard_name={}",
            self.standard_name
                .as_ref()
                .map_or_else(|| "None".to_string(), |name| format!("'{name}'"))
        )?;
        if let Some(long_name) = &self.long_name {
            write!(f, ", long_name='{long_name}'")?;
        }
        if let Some(var_name) = &self.var_name {
            write!(f, ", var_name='{var_name}'")?;
        }
        match self.units.calendar() {
            Some(calendar) => write!(f, ", units=Unit('{}', calendar='{calendar}')", self.units)?,
            None => write!(f, ", units=Unit('{}')", self.units)?,
        }
        if !self.attributes.is_empty() {
            write!(f, ", attributes={}", attributes::to_sorted_json(&self.attributes))?;
        }
        if let Some(coord_system) = &self.coord_system {
            write!(f, ", coord_system={coord_system}")?;
        }
        if self.circular {
            write!(f, ", circular=True")?;
        }
        write!(f, ")")
    }
}

/// `1` for increasing, `-1` for decreasing and `0` for a single value.
fn monotonic_direction(values: &[f64], strict: bool) -> Option<i8> {
    let mut direction = 0;
    for pair in values.windows(2) {
        let step = if pair[1] > pair[0] {
            1
        } else if pair[1] < pair[0] {
            -1
        } else if strict || pair[0].is_nan() {
            return None;
        } else {
            continue;
        };
        if direction == 0 {
            direction = step;
        } else if step != direction {
            return None;
        }
    }
    Some(direction)
}

pub(crate) fn resolve_name<'a>(
    standard_name: Option<&'a str>,
    long_name: Option<&'a str>,
    var_name: Option<&'a str>,
) -> &'a str {
    standard_name.or(long_name).or(var_name).unwrap_or("unknown")
}
