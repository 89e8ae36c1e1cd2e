//! Point and bound value sequences.
//!
//! [`Values`] holds a flat sequence of integers, floats or text in C order.
//! [`ValueArray`] is either explicit [`Values`] or an [`ElidedValues`] summary: a few leading and trailing values,
//! the true length and a [`Checksum`] of the full sequence, as produced when parsing a truncated display.

use std::ops::Range;

use derive_more::From;
use thiserror::Error;

use crate::{Checksum, DataType};

/// A flat sequence of values.
#[derive(Debug, Clone, From)]
pub enum Values {
    /// Integer (and boolean) values.
    Int(Vec<i64>),
    /// Floating point values.
    Float(Vec<f64>),
    /// Text values.
    Text(Vec<String>),
}

/// Values that cannot be represented by a data type.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValueTypeError {
    /// A numeric value outside the range of (or not representable by) the data type.
    #[error("value {value} cannot be represented as {data_type}")]
    OutOfRange {
        /// The value.
        value: String,
        /// The data type.
        data_type: DataType,
    },
    /// Text values for a numeric data type.
    #[error("text values cannot be stored as {0}")]
    NotNumeric(DataType),
    /// Numeric values for the string data type.
    #[error("numeric values cannot be stored as string")]
    NotText,
}

impl From<Vec<i32>> for Values {
    fn from(values: Vec<i32>) -> Self {
        Self::Int(values.into_iter().map(i64::from).collect())
    }
}

impl From<Vec<f32>> for Values {
    fn from(values: Vec<f32>) -> Self {
        Self::Float(values.into_iter().map(f64::from).collect())
    }
}

impl From<Vec<&str>> for Values {
    fn from(values: Vec<&str>) -> Self {
        Self::Text(values.into_iter().map(str::to_string).collect())
    }
}

/// Float equality where `NaN` equals `NaN`.
#[allow(clippy::float_cmp)]
pub(crate) fn float_eq(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

#[allow(clippy::cast_precision_loss)]
fn int_float_eq(a: i64, b: f64) -> bool {
    float_eq(a as f64, b)
}

impl PartialEq for Values {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| float_eq(*a, *b))
            }
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| int_float_eq(*a, *b))
            }
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Values {
    /// An empty sequence in the representation of `data_type`.
    #[must_use]
    pub fn empty(data_type: DataType) -> Self {
        if data_type == DataType::String {
            Self::Text(Vec::new())
        } else if data_type.is_float() {
            Self::Float(Vec::new())
        } else {
            Self::Int(Vec::new())
        }
    }

    /// The number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Int(values) => values.len(),
            Self::Float(values) => values.len(),
            Self::Text(values) => values.len(),
        }
    }

    /// Returns true if there are no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true for integer and float values.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Text(_))
    }

    /// The data type used when none is given explicitly.
    #[must_use]
    pub fn natural_data_type(&self) -> DataType {
        match self {
            Self::Int(_) => DataType::Int64,
            Self::Float(_) => DataType::Float64,
            Self::Text(_) => DataType::String,
        }
    }

    /// The value at `index` as a float.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        match self {
            Self::Int(values) => values.get(index).map(|value| *value as f64),
            Self::Float(values) => values.get(index).copied(),
            Self::Text(_) => None,
        }
    }

    /// The values as floats, or [`None`] for text.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            Self::Int(values) => Some(values.iter().map(|value| *value as f64).collect()),
            Self::Float(values) => Some(values.clone()),
            Self::Text(_) => None,
        }
    }

    /// Convert the values to the representation of `data_type`.
    ///
    /// `float32` values are rounded through `f32`. Integer types accept floats with no fractional part.
    /// An empty sequence converts to any data type.
    ///
    /// # Errors
    /// Returns a [`ValueTypeError`] if a value cannot be represented by `data_type`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::float_cmp
    )]
    pub fn cast(&self, data_type: DataType) -> Result<Self, ValueTypeError> {
        if self.is_empty() {
            return Ok(Self::empty(data_type));
        }
        match (self, data_type) {
            (Self::Text(values), DataType::String) => Ok(Self::Text(values.clone())),
            (Self::Text(_), data_type) => Err(ValueTypeError::NotNumeric(data_type)),
            (_, DataType::String) => Err(ValueTypeError::NotText),
            (Self::Int(values), DataType::Float64) => {
                Ok(Self::Float(values.iter().map(|value| *value as f64).collect()))
            }
            (Self::Float(values), DataType::Float64) => Ok(Self::Float(values.clone())),
            (values, DataType::Float32) => {
                let values = values.to_f64().unwrap_or_default();
                Ok(Self::Float(
                    values
                        .into_iter()
                        .map(|value| f64::from(value as f32))
                        .collect(),
                ))
            }
            (Self::Int(values), data_type) => {
                let (min, max) = data_type.integer_range().unwrap_or((i128::MIN, i128::MAX));
                for value in values {
                    if !(min..=max).contains(&i128::from(*value)) {
                        return Err(ValueTypeError::OutOfRange {
                            value: value.to_string(),
                            data_type,
                        });
                    }
                }
                Ok(Self::Int(values.clone()))
            }
            (Self::Float(values), data_type) => {
                let (min, max) = data_type.integer_range().unwrap_or((i128::MIN, i128::MAX));
                values
                    .iter()
                    .map(|value| {
                        let integral = value.is_finite() && value.fract() == 0.0;
                        let as_int = *value as i128;
                        if integral && (min..=max).contains(&as_int) {
                            Ok(as_int as i64)
                        } else {
                            Err(ValueTypeError::OutOfRange {
                                value: value.to_string(),
                                data_type,
                            })
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Self::Int)
            }
        }
    }

    /// Returns true if every value can be represented by `data_type` without loss.
    #[must_use]
    pub fn fits(&self, data_type: DataType) -> bool {
        match self.cast(data_type) {
            Ok(cast) => data_type == DataType::Float32 || cast == *self,
            Err(_) => false,
        }
    }

    /// The little-endian bytes of the values encoded as `data_type`.
    ///
    /// Text is encoded as UTF-8 with each value followed by a zero byte.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn to_le_bytes(&self, data_type: DataType) -> Vec<u8> {
        let pairs: Vec<(i64, f64)> = match self {
            Self::Text(values) => {
                let mut bytes = Vec::with_capacity(values.iter().map(|v| v.len() + 1).sum());
                for value in values {
                    bytes.extend_from_slice(value.as_bytes());
                    bytes.push(0);
                }
                return bytes;
            }
            Self::Int(values) => values.iter().map(|v| (*v, *v as f64)).collect(),
            Self::Float(values) => values.iter().map(|v| (*v as i64, *v)).collect(),
        };

        let data_type = if data_type.is_numeric() {
            data_type
        } else {
            self.natural_data_type()
        };
        let mut bytes = Vec::with_capacity(pairs.len() * data_type.size().unwrap_or(8));
        for (int, float) in pairs {
            match data_type {
                DataType::Bool => bytes.push(u8::from(int != 0)),
                DataType::Int8 => bytes.extend_from_slice(&(int as i8).to_le_bytes()),
                DataType::Int16 => bytes.extend_from_slice(&(int as i16).to_le_bytes()),
                DataType::Int32 => bytes.extend_from_slice(&(int as i32).to_le_bytes()),
                DataType::Int64 => bytes.extend_from_slice(&int.to_le_bytes()),
                DataType::UInt8 => bytes.push(int as u8),
                DataType::UInt16 => bytes.extend_from_slice(&(int as u16).to_le_bytes()),
                DataType::UInt32 => bytes.extend_from_slice(&(int as u32).to_le_bytes()),
                DataType::UInt64 => bytes.extend_from_slice(&(int as u64).to_le_bytes()),
                DataType::Float32 => bytes.extend_from_slice(&(float as f32).to_le_bytes()),
                DataType::Float64 | DataType::String => {
                    bytes.extend_from_slice(&float.to_le_bytes());
                }
            }
        }
        bytes
    }

    /// The checksum of the values encoded as `data_type`.
    #[must_use]
    pub fn checksum(&self, data_type: DataType) -> Checksum {
        Checksum::from_bytes(&self.to_le_bytes(data_type))
    }

    /// The values at `indices`, or [`None`] if an index is out of range.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Option<Self> {
        fn pick<T: Clone>(values: &[T], indices: &[usize]) -> Option<Vec<T>> {
            indices.iter().map(|i| values.get(*i).cloned()).collect()
        }
        match self {
            Self::Int(values) => pick(values, indices).map(Self::Int),
            Self::Float(values) => pick(values, indices).map(Self::Float),
            Self::Text(values) => pick(values, indices).map(Self::Text),
        }
    }

    /// The values in `range`, or [`None`] if it is out of range.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Option<Self> {
        match self {
            Self::Int(values) => values.get(range).map(|values| Self::Int(values.to_vec())),
            Self::Float(values) => values.get(range).map(|values| Self::Float(values.to_vec())),
            Self::Text(values) => values.get(range).map(|values| Self::Text(values.to_vec())),
        }
    }

    /// Summarise the values by their first and last `edge_items` elements.
    #[must_use]
    pub fn elide(&self, edge_items: usize, data_type: DataType) -> ElidedValues {
        let len = self.len();
        let edge_items = edge_items.min(len / 2);
        let empty = || Self::empty(self.natural_data_type());
        ElidedValues {
            head: self.slice(0..edge_items).unwrap_or_else(empty),
            tail: self.slice(len - edge_items..len).unwrap_or_else(empty),
            len,
            checksum: self.checksum(data_type),
        }
    }
}

/// A summary of a sequence of values whose middle was elided.
#[derive(Debug, Clone, PartialEq)]
pub struct ElidedValues {
    head: Values,
    tail: Values,
    len: usize,
    checksum: Checksum,
}

impl ElidedValues {
    /// Create a new elided value summary.
    #[must_use]
    pub fn new(head: Values, tail: Values, len: usize, checksum: Checksum) -> Self {
        Self {
            head,
            tail,
            len,
            checksum,
        }
    }

    /// The leading values.
    #[must_use]
    pub fn head(&self) -> &Values {
        &self.head
    }

    /// The trailing values.
    #[must_use]
    pub fn tail(&self) -> &Values {
        &self.tail
    }

    /// The length of the full sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the full sequence is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The checksum of the full sequence.
    #[must_use]
    pub fn checksum(&self) -> Checksum {
        self.checksum
    }
}

/// A sequence of values that is either held in full or summarised.
#[derive(Debug, Clone, From)]
pub enum ValueArray {
    /// All values.
    Explicit(Values),
    /// A summary of the values.
    Elided(ElidedValues),
}

macro_rules! value_array_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ValueArray {
                fn from(values: $t) -> Self {
                    Self::Explicit(values.into())
                }
            }
        )*
    };
}

value_array_from!(
    Vec<i64>,
    Vec<i32>,
    Vec<f64>,
    Vec<f32>,
    Vec<String>,
    Vec<&str>
);

impl ValueArray {
    /// The number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Explicit(values) => values.len(),
            Self::Elided(elided) => elided.len(),
        }
    }

    /// Returns true if there are no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The values, if held in full.
    #[must_use]
    pub fn explicit(&self) -> Option<&Values> {
        match self {
            Self::Explicit(values) => Some(values),
            Self::Elided(_) => None,
        }
    }

    /// Returns true if the values are summarised.
    #[must_use]
    pub fn is_elided(&self) -> bool {
        matches!(self, Self::Elided(_))
    }

    /// Returns true for integer and float values.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        match self {
            Self::Explicit(values) => values.is_numeric(),
            Self::Elided(elided) => elided.head().is_numeric(),
        }
    }

    /// The data type used when none is given explicitly.
    #[must_use]
    pub fn natural_data_type(&self) -> DataType {
        match self {
            Self::Explicit(values) => values.natural_data_type(),
            Self::Elided(elided) => elided.head().natural_data_type(),
        }
    }

    /// The checksum of the full sequence encoded as `data_type`.
    ///
    /// The checksum of elided values is the one they were summarised with.
    #[must_use]
    pub fn checksum(&self, data_type: DataType) -> Checksum {
        match self {
            Self::Explicit(values) => values.checksum(data_type),
            Self::Elided(elided) => elided.checksum(),
        }
    }

    /// Compare two sequences stored as `data_type` and `other_data_type`.
    ///
    /// Explicit sequences are compared value by value.
    /// An elided sequence matches another sequence of the same length whose checksum,
    /// encoded as the elided sequence's data type, is the same.
    #[must_use]
    pub fn equivalent(
        &self,
        data_type: DataType,
        other: &Self,
        other_data_type: DataType,
    ) -> bool {
        match (self, other) {
            (Self::Explicit(a), Self::Explicit(b)) => a == b,
            (Self::Elided(a), Self::Elided(b)) => {
                a.len() == b.len() && a.checksum() == b.checksum()
            }
            (Self::Explicit(values), Self::Elided(elided)) => {
                Self::explicit_matches_elided(values, elided, other_data_type)
            }
            (Self::Elided(elided), Self::Explicit(values)) => {
                Self::explicit_matches_elided(values, elided, data_type)
            }
        }
    }

    fn explicit_matches_elided(
        values: &Values,
        elided: &ElidedValues,
        elided_data_type: DataType,
    ) -> bool {
        values.len() == elided.len()
            && values
                .cast(elided_data_type)
                .is_ok_and(|values| values.checksum(elided_data_type) == elided.checksum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_equality() {
        assert_eq!(Values::from(vec![1i64, 2]), Values::from(vec![1.0, 2.0]));
        assert_eq!(Values::from(vec![f64::NAN]), Values::from(vec![f64::NAN]));
        assert_ne!(Values::from(vec![1.0]), Values::from(vec![1.5]));
        assert_ne!(Values::from(vec!["1"]), Values::from(vec![1i64]));
        assert_ne!(Values::from(vec![1i64]), Values::from(vec![1i64, 2]));
    }

    #[test]
    fn values_cast() {
        let values = Values::from(vec![1.0, 2.0, 300.0]);
        assert_eq!(values.cast(DataType::Int16), Ok(Values::from(vec![1i64, 2, 300])));
        assert!(matches!(
            values.cast(DataType::Int8),
            Err(ValueTypeError::OutOfRange { .. })
        ));
        assert!(values.cast(DataType::String).is_err());
        assert!(Values::from(vec![0.5]).cast(DataType::Int32).is_err());
        assert!(Values::from(vec![-1i64]).cast(DataType::UInt8).is_err());
        assert!(Values::from(vec!["a"]).cast(DataType::Float64).is_err());

        let Ok(Values::Float(rounded)) = Values::from(vec![0.1]).cast(DataType::Float32) else {
            panic!()
        };
        assert_eq!(rounded[0], f64::from(0.1f32));
        assert!(Values::from(vec![0.1]).fits(DataType::Float32));
        assert!(!Values::from(vec![2i64]).fits(DataType::Bool));
        assert!(Values::from(vec![1i64, 0]).fits(DataType::Bool));
    }

    #[test]
    fn values_checksum() {
        let ints = Values::from(vec![1i64, 2, 3]);
        assert_eq!(
            ints.checksum(DataType::Int32),
            Checksum::from_bytes(&[1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0])
        );
        assert_eq!(
            ints.checksum(DataType::Float64),
            Values::from(vec![1.0, 2.0, 3.0]).checksum(DataType::Float64)
        );
        assert_ne!(ints.checksum(DataType::Int32), ints.checksum(DataType::Int64));
        assert_eq!(
            Values::from(vec!["ab", "c"]).checksum(DataType::String),
            Checksum::from_bytes(b"ab\0c\0")
        );
    }

    #[test]
    fn values_select() {
        let values = Values::from(vec![10i64, 20, 30]);
        assert_eq!(values.select(&[2, 0]), Some(Values::from(vec![30i64, 10])));
        assert_eq!(values.select(&[3]), None);
        assert_eq!(values.slice(1..3), Some(Values::from(vec![20i64, 30])));
        assert_eq!(values.slice(2..4), None);
        assert_eq!(values.slice(0..0).map(|values| values.len()), Some(0));
    }

    #[test]
    fn values_cast_empty() {
        let empty = Values::Int(Vec::new());
        assert!(matches!(
            empty.cast(DataType::String),
            Ok(Values::Text(values)) if values.is_empty()
        ));
        assert!(matches!(
            empty.cast(DataType::Float32),
            Ok(Values::Float(values)) if values.is_empty()
        ));
        assert!(matches!(
            Values::Text(Vec::new()).cast(DataType::Int8),
            Ok(Values::Int(values)) if values.is_empty()
        ));
        assert!(Values::from(vec![1i64]).cast(DataType::String).is_err());
    }

    #[test]
    fn value_array_elided_equivalence() {
        let values = Values::from((0..100).map(f64::from).collect::<Vec<_>>());
        let elided = ValueArray::Elided(values.elide(3, DataType::Float32));
        let explicit = ValueArray::Explicit(values.clone());
        assert_eq!(elided.len(), 100);
        assert!(elided.is_elided());
        assert!(explicit.equivalent(DataType::Float32, &elided, DataType::Float32));
        assert!(elided.equivalent(DataType::Float32, &explicit, DataType::Float64));

        let ValueArray::Elided(summary) = &elided else {
            panic!()
        };
        assert_eq!(summary.head(), &Values::from(vec![0.0, 1.0, 2.0]));
        assert_eq!(summary.tail(), &Values::from(vec![97.0, 98.0, 99.0]));

        let mut changed = values.to_f64().unwrap();
        changed[50] = -1.0;
        let changed = ValueArray::Explicit(changed.into());
        assert!(!changed.equivalent(DataType::Float32, &elided, DataType::Float32));
    }
}
