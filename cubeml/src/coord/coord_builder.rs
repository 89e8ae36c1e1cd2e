use cubeml_units::Unit;

use crate::{
    attributes::{self, Attributes},
    values::{ElidedValues, ValueArray, ValueTypeError, Values},
    CoordSystem, DataType,
};

use super::{resolve_name, Coord, CoordValidationError};

/// A [`Coord`] builder.
///
/// The builder is initialised from the points. By default:
///  - the names and coordinate system are unset and the units are `unknown`,
///  - the shape is one-dimensional,
///  - the value type is `int64`, `float64` or `string` according to the points,
///  - there are no bounds, and bounds have two values per cell when set,
///  - the bounds share the value type, or are `float64` if they are not integral for an integer coordinate, and
///  - the coordinate is not circular.
///
/// The order in which optional fields are set does not matter.
#[derive(Debug, Clone)]
pub struct CoordBuilder {
    /// The points in C order.
    pub points: ValueArray,
    /// The standard name.
    pub standard_name: Option<String>,
    /// The long name.
    pub long_name: Option<String>,
    /// The variable name.
    pub var_name: Option<String>,
    /// The units.
    pub units: Unit,
    /// The attributes.
    pub attributes: Attributes,
    /// The shape of the points. If [`None`], the points are one-dimensional.
    pub shape: Option<Vec<usize>>,
    /// The value type. If [`None`], chosen from the points.
    pub value_type: Option<DataType>,
    /// The bounds in C order with shape `[..shape, nbounds]`.
    pub bounds: Option<ValueArray>,
    /// The bounds value type. If [`None`], chosen from the bounds and the value type.
    pub bounds_value_type: Option<DataType>,
    /// The number of bounds per cell.
    pub nbounds: usize,
    /// The coordinate system.
    pub coord_system: Option<CoordSystem>,
    /// Whether the coordinate wraps around its unit modulus.
    pub circular: bool,
}

impl CoordBuilder {
    /// Create a new coordinate builder.
    #[must_use]
    pub fn new(points: impl Into<ValueArray>) -> Self {
        Self {
            points: points.into(),
            standard_name: None,
            long_name: None,
            var_name: None,
            units: Unit::default(),
            attributes: Attributes::default(),
            shape: None,
            value_type: None,
            bounds: None,
            bounds_value_type: None,
            nbounds: 2,
            coord_system: None,
            circular: false,
        }
    }

    /// Create a new builder copying an existing coordinate.
    #[must_use]
    pub fn from_coord(coord: &Coord) -> Self {
        Self {
            points: coord.points.clone(),
            standard_name: coord.standard_name.clone(),
            long_name: coord.long_name.clone(),
            var_name: coord.var_name.clone(),
            units: coord.units.clone(),
            attributes: coord.attributes.clone(),
            shape: Some(coord.shape.clone()),
            value_type: Some(coord.value_type),
            bounds: coord.bounds.clone(),
            bounds_value_type: coord.bounds.as_ref().map(|_| coord.bounds_value_type()),
            nbounds: coord.nbounds,
            coord_system: coord.coord_system,
            circular: coord.circular,
        }
    }

    /// Set the points.
    pub fn points(&mut self, points: impl Into<ValueArray>) -> &mut Self {
        self.points = points.into();
        self
    }

    /// Set the standard name.
    pub fn standard_name(&mut self, standard_name: impl Into<String>) -> &mut Self {
        self.standard_name = Some(standard_name.into());
        self
    }

    /// Set the long name.
    pub fn long_name(&mut self, long_name: impl Into<String>) -> &mut Self {
        self.long_name = Some(long_name.into());
        self
    }

    /// Set the variable name.
    pub fn var_name(&mut self, var_name: impl Into<String>) -> &mut Self {
        self.var_name = Some(var_name.into());
        self
    }

    /// Set the units.
    pub fn units(&mut self, units: Unit) -> &mut Self {
        self.units = units;
        self
    }

    /// Set the attributes.
    pub fn attributes(&mut self, attributes: Attributes) -> &mut Self {
        self.attributes = attributes;
        self
    }

    /// Set an attribute.
    pub fn attribute(
        &mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> &mut Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the shape of the points.
    pub fn shape(&mut self, shape: impl Into<Vec<usize>>) -> &mut Self {
        self.shape = Some(shape.into());
        self
    }

    /// Set the value type.
    pub fn value_type(&mut self, value_type: DataType) -> &mut Self {
        self.value_type = Some(value_type);
        self
    }

    /// Set the bounds.
    pub fn bounds(&mut self, bounds: impl Into<ValueArray>) -> &mut Self {
        self.bounds = Some(bounds.into());
        self
    }

    /// Set the bounds value type.
    ///
    /// This is the value type or `float64`. Elided bounds of an integer coordinate need it when any value between their
    /// edges is not integral.
    pub fn bounds_value_type(&mut self, bounds_value_type: DataType) -> &mut Self {
        self.bounds_value_type = Some(bounds_value_type);
        self
    }

    /// Remove the bounds and their value type.
    pub fn clear_bounds(&mut self) -> &mut Self {
        self.bounds = None;
        self.bounds_value_type = None;
        self
    }

    /// Set the number of bounds per cell.
    pub fn nbounds(&mut self, nbounds: usize) -> &mut Self {
        self.nbounds = nbounds;
        self
    }

    /// Set the coordinate system.
    pub fn coord_system(&mut self, coord_system: impl Into<CoordSystem>) -> &mut Self {
        self.coord_system = Some(coord_system.into());
        self
    }

    /// Set whether the coordinate wraps around its unit modulus.
    pub fn circular(&mut self, circular: bool) -> &mut Self {
        self.circular = circular;
        self
    }

    /// Build into a [`Coord`].
    ///
    /// # Errors
    /// Returns [`CoordValidationError`] if
    ///  - a name is empty, or an attribute name is reserved,
    ///  - there are no points, or the shape does not match the number of points,
    ///  - the points do not fit the value type,
    ///  - the bounds are not numeric, or their number is not the number of points times the bounds per cell, or
    ///  - a pair of bounds is neither ascending nor contains its point.
    pub fn build(&self) -> Result<Coord, CoordValidationError> {
        for (field, name) in [
            ("standard_name", &self.standard_name),
            ("long_name", &self.long_name),
            ("var_name", &self.var_name),
        ] {
            if name.as_ref().is_some_and(|name| name.trim().is_empty()) {
                return Err(CoordValidationError::EmptyName { field });
            }
        }
        let name = resolve_name(
            self.standard_name.as_deref(),
            self.long_name.as_deref(),
            self.var_name.as_deref(),
        )
        .to_string();

        if let Some(attribute) = attributes::find_reserved(&self.attributes) {
            return Err(CoordValidationError::ReservedAttribute {
                coord: name,
                attribute: attribute.to_string(),
            });
        }

        let len = self.points.len();
        if len == 0 {
            return Err(CoordValidationError::EmptyPoints(name));
        }
        let shape = self.shape.clone().unwrap_or_else(|| vec![len]);
        let shape_len = shape
            .iter()
            .try_fold(1usize, |len, &extent| len.checked_mul(extent));
        if shape.is_empty() || shape_len != Some(len) {
            return Err(CoordValidationError::ShapeMismatch {
                coord: name,
                shape,
                points: len,
            });
        }

        let value_type = self
            .value_type
            .unwrap_or_else(|| self.points.natural_data_type());
        let points = cast_array(&self.points, value_type).map_err(|source| {
            CoordValidationError::ValueType {
                coord: name.clone(),
                field: "points",
                value_type,
                source,
            }
        })?;

        let bounds = match &self.bounds {
            Some(bounds) => Some(self.validate_bounds(&name, &points, bounds, value_type)?),
            None => None,
        };

        Ok(Coord {
            standard_name: self.standard_name.clone(),
            long_name: self.long_name.clone(),
            var_name: self.var_name.clone(),
            units: self.units.clone(),
            attributes: self.attributes.clone(),
            points,
            bounds,
            nbounds: self.nbounds,
            shape,
            value_type,
            coord_system: self.coord_system,
            circular: self.circular,
        })
    }

    fn validate_bounds(
        &self,
        name: &str,
        points: &ValueArray,
        bounds: &ValueArray,
        value_type: DataType,
    ) -> Result<ValueArray, CoordValidationError> {
        if self.nbounds == 0 {
            return Err(CoordValidationError::ZeroBoundsPerCell(name.to_string()));
        }
        if !bounds.is_numeric() {
            return Err(CoordValidationError::BoundsNotNumeric(name.to_string()));
        }
        let expected = points.len().checked_mul(self.nbounds);
        if expected != Some(bounds.len()) {
            return Err(CoordValidationError::BoundsLength {
                coord: name.to_string(),
                expected: expected.unwrap_or(usize::MAX),
                found: bounds.len(),
                points: points.len(),
                nbounds: self.nbounds,
            });
        }

        // Integer coordinates keep non-integral bounds as float64.
        let bounds_type = match self.bounds_value_type {
            Some(bounds_type) if bounds_type == value_type || bounds_type == DataType::Float64 => {
                bounds_type
            }
            Some(bounds_type) => {
                return Err(CoordValidationError::BoundsValueType {
                    coord: name.to_string(),
                    value_type,
                    bounds_value_type: bounds_type,
                });
            }
            None if value_type.is_float() || fits_array(bounds, value_type) => value_type,
            None => DataType::Float64,
        };
        let bounds = cast_array(bounds, bounds_type).map_err(|source| {
            CoordValidationError::ValueType {
                coord: name.to_string(),
                field: "bounds",
                value_type: bounds_type,
                source,
            }
        })?;

        if self.nbounds == 2 {
            if let (Some(points), Some(bounds)) = (
                points.explicit().and_then(Values::to_f64),
                bounds.explicit().and_then(Values::to_f64),
            ) {
                for (index, (point, pair)) in points.iter().zip(bounds.chunks_exact(2)).enumerate()
                {
                    let (lower, upper) = (pair[0], pair[1]);
                    let contains = upper <= *point && *point <= lower;
                    let any_nan = lower.is_nan() || upper.is_nan() || point.is_nan();
                    if !(any_nan || lower <= upper || contains) {
                        return Err(CoordValidationError::BoundsOrder {
                            coord: name.to_string(),
                            index,
                            lower,
                            upper,
                            point: *point,
                        });
                    }
                }
            }
        }
        Ok(bounds)
    }
}

fn cast_array(array: &ValueArray, data_type: DataType) -> Result<ValueArray, ValueTypeError> {
    Ok(match array {
        ValueArray::Explicit(values) => ValueArray::Explicit(values.cast(data_type)?),
        ValueArray::Elided(elided) => ValueArray::Elided(ElidedValues::new(
            elided.head().cast(data_type)?,
            elided.tail().cast(data_type)?,
            elided.len(),
            elided.checksum(),
        )),
    })
}

fn fits_array(array: &ValueArray, data_type: DataType) -> bool {
    match array {
        ValueArray::Explicit(values) => values.fits(data_type),
        ValueArray::Elided(elided) => {
            elided.head().fits(data_type) && elided.tail().fits(data_type)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Checksum;

    #[test]
    fn coord_builder_defaults() {
        let coord = CoordBuilder::new(vec![1i64, 2, 3]).build().unwrap();
        assert_eq!(coord.value_type(), DataType::Int64);
        assert_eq!(coord.units(), &Unit::Unknown);
        assert!(coord.attributes().is_empty());
        assert!(!coord.is_circular());
        assert_eq!(coord.coord_system(), None);
    }

    #[test]
    fn coord_builder_from_coord() {
        let coord = CoordBuilder::new(vec![1.0, 2.0])
            .long_name("foo")
            .bounds(vec![0.5, 1.5, 1.5, 2.5])
            .circular(true)
            .build()
            .unwrap();
        let copy = CoordBuilder::from_coord(&coord).build().unwrap();
        assert_eq!(coord, copy);
        assert!(copy.is_circular());
        assert_eq!(copy.nbounds(), 2);
    }

    #[test]
    fn coord_builder_names_and_attributes() {
        assert_eq!(
            CoordBuilder::new(vec![1]).standard_name("").build(),
            Err(CoordValidationError::EmptyName {
                field: "standard_name"
            })
        );
        assert!(matches!(
            CoordBuilder::new(vec![1])
                .standard_name("air_temperature")
                .attribute("standard_name", "whoopsy")
                .build(),
            Err(CoordValidationError::ReservedAttribute { .. })
        ));
    }

    #[test]
    fn coord_builder_shape() {
        assert!(matches!(
            CoordBuilder::new(Vec::<f64>::new()).build(),
            Err(CoordValidationError::EmptyPoints(_))
        ));
        assert!(matches!(
            CoordBuilder::new(vec![1, 2, 3]).shape(vec![2, 2]).build(),
            Err(CoordValidationError::ShapeMismatch { .. })
        ));
        let coord = CoordBuilder::new(vec![1, 2, 3, 4])
            .shape(vec![2, 2])
            .build()
            .unwrap();
        assert_eq!(coord.ndim(), 2);
    }

    #[test]
    fn coord_builder_value_type() {
        let coord = CoordBuilder::new(vec![1i64, 2])
            .value_type(DataType::Float32)
            .build()
            .unwrap();
        assert_eq!(coord.explicit_points(), Some(&Values::Float(vec![1.0, 2.0])));

        assert!(matches!(
            CoordBuilder::new(vec![1.5])
                .value_type(DataType::Int32)
                .build(),
            Err(CoordValidationError::ValueType { field: "points", .. })
        ));
        assert!(CoordBuilder::new(vec![300])
            .value_type(DataType::Int8)
            .build()
            .is_err());
    }

    #[test]
    fn coord_builder_bounds() {
        let err = CoordBuilder::new(vec![1.0, 2.0])
            .bounds(vec![0.5, 1.5, 1.5])
            .build();
        assert!(matches!(
            err,
            Err(CoordValidationError::BoundsLength {
                expected: 4,
                found: 3,
                ..
            })
        ));

        assert!(matches!(
            CoordBuilder::new(vec![1.0])
                .bounds(vec!["a", "b"])
                .build(),
            Err(CoordValidationError::BoundsNotNumeric(_))
        ));

        assert!(matches!(
            CoordBuilder::new(vec![1.0])
                .bounds(vec![2.0, 0.0])
                .build(),
            Ok(_)
        ));
        assert!(matches!(
            CoordBuilder::new(vec![5.0])
                .bounds(vec![2.0, 0.0])
                .build(),
            Err(CoordValidationError::BoundsOrder { index: 0, .. })
        ));

        let three = CoordBuilder::new(vec![1.0, 2.0])
            .bounds(vec![0.0, 1.0, 2.0, 1.0, 2.0, 3.0])
            .nbounds(3)
            .build()
            .unwrap();
        assert_eq!(three.nbounds(), 3);
        assert!(CoordBuilder::new(vec![1.0])
            .bounds(Vec::<f64>::new())
            .nbounds(0)
            .build()
            .is_err());
    }

    #[test]
    fn coord_builder_integer_bounds() {
        let coord = CoordBuilder::new(vec![1i64, 2])
            .bounds(vec![0.5, 1.5, 1.5, 2.5])
            .build()
            .unwrap();
        assert_eq!(coord.value_type(), DataType::Int64);
        assert_eq!(coord.bounds_value_type(), DataType::Float64);

        let coord = CoordBuilder::new(vec![1i64, 2])
            .bounds(vec![0i64, 1, 1, 2])
            .build()
            .unwrap();
        assert_eq!(coord.bounds_value_type(), DataType::Int64);
    }

    #[test]
    fn coord_builder_bounds_value_type() {
        let bounds = Values::from(vec![0.0, 1.0, 1.5, 2.0, 2.0, 3.0, 3.0, 4.0]);
        let elided = bounds.elide(1, DataType::Float64);
        let inferred = CoordBuilder::new(vec![0i64, 1, 2, 3])
            .value_type(DataType::Int32)
            .bounds(elided.clone())
            .build()
            .unwrap();
        assert_eq!(inferred.bounds_value_type(), DataType::Int32);

        let coord = CoordBuilder::new(vec![0i64, 1, 2, 3])
            .value_type(DataType::Int32)
            .bounds_value_type(DataType::Float64)
            .bounds(elided)
            .build()
            .unwrap();
        assert_eq!(coord.bounds_value_type(), DataType::Float64);
        let explicit = CoordBuilder::new(vec![0i64, 1, 2, 3])
            .value_type(DataType::Int32)
            .bounds(bounds)
            .build()
            .unwrap();
        assert_eq!(coord, explicit);
        assert_eq!(
            CoordBuilder::from_coord(&coord).build().unwrap().bounds_value_type(),
            DataType::Float64
        );

        assert!(matches!(
            CoordBuilder::new(vec![1i64])
                .bounds(vec![0i64, 2])
                .bounds_value_type(DataType::Int8)
                .build(),
            Err(CoordValidationError::BoundsValueType {
                value_type: DataType::Int64,
                bounds_value_type: DataType::Int8,
                ..
            })
        ));
    }

    #[test]
    fn coord_builder_oversized_shape() {
        let elided = ElidedValues::new(
            Values::from(vec![1i64]),
            Values::from(vec![2i64]),
            2,
            Checksum::new(0),
        );
        assert!(matches!(
            CoordBuilder::new(elided).shape(vec![usize::MAX, 2]).build(),
            Err(CoordValidationError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            CoordBuilder::new(vec![1.0, 2.0])
                .bounds(vec![0.5, 1.5, 1.5, 2.5])
                .nbounds(usize::MAX)
                .build(),
            Err(CoordValidationError::BoundsLength {
                expected: usize::MAX,
                ..
            })
        ));
    }

    #[test]
    fn coord_builder_elided_points() {
        let values = Values::from((0..2000).map(f64::from).collect::<Vec<_>>());
        let elided = values.elide(3, DataType::Float64);
        let checksum: Checksum = elided.checksum();
        let coord = CoordBuilder::new(elided).build().unwrap();
        assert!(coord.points().is_elided());
        assert_eq!(coord.len(), 2000);
        assert_eq!(coord.points_checksum(), checksum);
        assert_eq!(coord, CoordBuilder::new(values).build().unwrap());
    }
}
