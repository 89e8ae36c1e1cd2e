use cubeml_units::UnitConversionError;
use thiserror::Error;

use crate::{values::ValueTypeError, DataType};

/// A coordinate validation error.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum CoordValidationError {
    /// A coordinate with no points.
    #[error("coordinate `{0}` has no points")]
    EmptyPoints(String),
    /// A name that is present but empty.
    #[error("coordinate {field} must not be empty")]
    EmptyName {
        /// The name field.
        field: &'static str,
    },
    /// An attribute that is reserved for coordinate metadata.
    #[error("coordinate `{coord}` attribute `{attribute}` is reserved")]
    ReservedAttribute {
        /// The coordinate name.
        coord: String,
        /// The attribute name.
        attribute: String,
    },
    /// The shape does not match the number of points.
    #[error("coordinate `{coord}` shape {shape:?} does not match its {points} points")]
    ShapeMismatch {
        /// The coordinate name.
        coord: String,
        /// The shape.
        shape: Vec<usize>,
        /// The number of points.
        points: usize,
    },
    /// The values do not fit the value type.
    #[error("coordinate `{coord}` {field} do not fit value type {value_type}: {source}")]
    ValueType {
        /// The coordinate name.
        coord: String,
        /// `points` or `bounds`.
        field: &'static str,
        /// The value type.
        value_type: DataType,
        /// The underlying error.
        #[source]
        source: ValueTypeError,
    },
    /// The number of bounds is not the number of points times the bounds per cell.
    #[error("coordinate `{coord}` has {found} bounds, expected {expected} ({points} points x {nbounds} bounds)")]
    BoundsLength {
        /// The coordinate name.
        coord: String,
        /// The expected number of bounds.
        expected: usize,
        /// The number of bounds.
        found: usize,
        /// The number of points.
        points: usize,
        /// The number of bounds per cell.
        nbounds: usize,
    },
    /// A bounds value type that is neither the value type nor `float64`.
    #[error("coordinate `{coord}` bounds value type {bounds_value_type} must be {value_type} or float64")]
    BoundsValueType {
        /// The coordinate name.
        coord: String,
        /// The value type.
        value_type: DataType,
        /// The bounds value type.
        bounds_value_type: DataType,
    },
    /// Zero bounds per cell.
    #[error("coordinate `{0}` must have at least one bound per cell")]
    ZeroBoundsPerCell(String),
    /// Bounds that are not numeric.
    #[error("coordinate `{0}` bounds must be numeric")]
    BoundsNotNumeric(String),
    /// A bound pair that is neither ascending nor contains its point.
    #[error("coordinate `{coord}` bounds [{lower:?}, {upper:?}] at index {index} are neither ordered nor contain the point {point:?}")]
    BoundsOrder {
        /// The coordinate name.
        coord: String,
        /// The cell index.
        index: usize,
        /// The first bound.
        lower: f64,
        /// The second bound.
        upper: f64,
        /// The point.
        point: f64,
    },
    /// A dimension coordinate that is not one-dimensional.
    #[error("dimension coordinate `{coord}` must be one-dimensional, found shape {shape:?}")]
    NotOneDimensional {
        /// The coordinate name.
        coord: String,
        /// The shape.
        shape: Vec<usize>,
    },
    /// A dimension coordinate that is not numeric.
    #[error("dimension coordinate `{0}` must be numeric")]
    NotNumeric(String),
    /// A dimension coordinate whose points are not strictly monotonic.
    #[error("dimension coordinate `{0}` points must be strictly monotonic")]
    NotMonotonic(String),
    /// A dimension coordinate whose bounds are not monotonic.
    #[error("dimension coordinate `{0}` bounds must be monotonic in the same direction as its points")]
    BoundsNotMonotonic(String),
}

/// A coordinate operation error.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum CoordOpError {
    /// The operation needs the full points or bounds, but they were elided.
    #[error("coordinate `{0}` values were elided")]
    Elided(String),
    /// The operation needs numeric points.
    #[error("coordinate `{0}` is not numeric")]
    NotNumeric(String),
    /// The operation needs a one-dimensional coordinate.
    #[error("coordinate `{0}` is not one-dimensional")]
    NotOneDimensional(String),
    /// The coordinate already has bounds.
    #[error("coordinate `{0}` already has bounds")]
    BoundsExist(String),
    /// The operation needs more points.
    #[error("coordinate `{coord}` has {points} point(s), at least {required} required")]
    TooFewPoints {
        /// The coordinate name.
        coord: String,
        /// The number of points.
        points: usize,
        /// The number of points required.
        required: usize,
    },
    /// Points that are not monotonic.
    #[error("coordinate `{0}` points are not monotonic")]
    NotMonotonic(String),
    /// A bound position outside `[0, 1]`.
    #[error("bound position {0} is outside [0, 1]")]
    InvalidBoundPosition(f64),
    /// An index outside the coordinate.
    #[error("index {index} is out of range for coordinate `{coord}` of length {len}")]
    IndexOutOfRange {
        /// The coordinate name.
        coord: String,
        /// The index.
        index: usize,
        /// The length.
        len: usize,
    },
    /// Coordinates that cannot be combined.
    #[error("coordinates `{coord}` and `{other}` are incompatible: {reason}")]
    Incompatible {
        /// The coordinate name.
        coord: String,
        /// The other coordinate name.
        other: String,
        /// Why they are incompatible.
        reason: &'static str,
    },
    /// Coordinates with no common cells.
    #[error("no intersection between `{0}` coordinates")]
    NoIntersection(String),
    /// A unit conversion error.
    #[error(transparent)]
    UnitConversion(#[from] UnitConversionError),
    /// The result is not a valid coordinate.
    #[error(transparent)]
    Validation(#[from] CoordValidationError),
}
