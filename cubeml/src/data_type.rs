//! Element data types.

use std::str::FromStr;

use derive_more::Display;
use thiserror::Error;

/// The element type of points, bounds or a data payload, named as in `NumPy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DataType {
    /// `bool`
    #[display("bool")]
    Bool,
    /// `int8`
    #[display("int8")]
    Int8,
    /// `int16`
    #[display("int16")]
    Int16,
    /// `int32`
    #[display("int32")]
    Int32,
    /// `int64`
    #[display("int64")]
    Int64,
    /// `uint8`
    #[display("uint8")]
    UInt8,
    /// `uint16`
    #[display("uint16")]
    UInt16,
    /// `uint32`
    #[display("uint32")]
    UInt32,
    /// `uint64`
    #[display("uint64")]
    UInt64,
    /// `float32`
    #[display("float32")]
    Float32,
    /// `float64`
    #[display("float64")]
    Float64,
    /// Variable length text.
    #[display("string")]
    String,
}

/// An unrecognised data type name.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown data type `{0}`")]
pub struct UnknownDataTypeError(pub String);

impl FromStr for DataType {
    type Err = UnknownDataTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bool" => Ok(Self::Bool),
            "int8" => Ok(Self::Int8),
            "int16" => Ok(Self::Int16),
            "int32" => Ok(Self::Int32),
            "int64" => Ok(Self::Int64),
            "uint8" => Ok(Self::UInt8),
            "uint16" => Ok(Self::UInt16),
            "uint32" => Ok(Self::UInt32),
            "uint64" => Ok(Self::UInt64),
            "float32" => Ok(Self::Float32),
            "float64" => Ok(Self::Float64),
            "string" | "str" => Ok(Self::String),
            _ => Err(UnknownDataTypeError(s.to_string())),
        }
    }
}

impl DataType {
    /// The size of one element in bytes, or [`None`] for variable length text.
    #[must_use]
    pub const fn size(self) -> Option<usize> {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 => Some(1),
            Self::Int16 | Self::UInt16 => Some(2),
            Self::Int32 | Self::UInt32 | Self::Float32 => Some(4),
            Self::Int64 | Self::UInt64 | Self::Float64 => Some(8),
            Self::String => None,
        }
    }

    /// Returns true for boolean, integer and floating point types.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::String)
    }

    /// Returns true for floating point types.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Returns true for boolean and integer types.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        self.is_numeric() && !self.is_float()
    }

    /// The inclusive range of an integer type, as `i128` to cover `uint64`.
    pub(crate) const fn integer_range(self) -> Option<(i128, i128)> {
        match self {
            Self::Bool => Some((0, 1)),
            Self::Int8 => Some((i8::MIN as i128, i8::MAX as i128)),
            Self::Int16 => Some((i16::MIN as i128, i16::MAX as i128)),
            Self::Int32 => Some((i32::MIN as i128, i32::MAX as i128)),
            Self::Int64 => Some((i64::MIN as i128, i64::MAX as i128)),
            Self::UInt8 => Some((0, u8::MAX as i128)),
            Self::UInt16 => Some((0, u16::MAX as i128)),
            Self::UInt32 => Some((0, u32::MAX as i128)),
            Self::UInt64 => Some((0, i64::MAX as i128)),
            Self::Float32 | Self::Float64 | Self::String => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_names() {
        for data_type in [
            DataType::Bool,
            DataType::Int32,
            DataType::UInt16,
            DataType::Float32,
            DataType::Float64,
            DataType::String,
        ] {
            assert_eq!(data_type.to_string().parse::<DataType>(), Ok(data_type));
        }
        assert_eq!(
            "complex64".parse::<DataType>(),
            Err(UnknownDataTypeError("complex64".to_string()))
        );
    }

    #[test]
    fn data_type_properties() {
        assert_eq!(DataType::Float32.size(), Some(4));
        assert_eq!(DataType::String.size(), None);
        assert!(DataType::Int8.is_integer());
        assert!(!DataType::Float64.is_integer());
        assert!(!DataType::String.is_numeric());
    }
}
