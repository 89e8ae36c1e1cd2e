use std::str::FromStr;

use derive_more::Display;
use thiserror::Error;

use crate::{Checksum, DataType};

/// The byte order of a data payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum ByteOrder {
    /// Little endian.
    #[default]
    #[display("little")]
    Little,
    /// Big endian.
    #[display("big")]
    Big,
}

/// The memory layout of a data payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum MemoryOrder {
    /// Row-major.
    #[default]
    #[display("C")]
    C,
    /// Column-major.
    #[display("F")]
    F,
}

/// A data descriptor error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DataDescriptorError {
    /// The number of elements does not match the shape.
    #[error("got {found} elements, expected {expected} for shape {shape:?}")]
    ElementCount {
        /// The shape.
        shape: Vec<usize>,
        /// The expected number of elements.
        expected: usize,
        /// The number of elements.
        found: usize,
    },
    /// The mask length does not match the number of elements.
    #[error("got a mask of {found} elements, expected {expected}")]
    MaskLength {
        /// The expected mask length.
        expected: usize,
        /// The mask length.
        found: usize,
    },
    /// An unrecognised byte order.
    #[error("unknown byte order `{0}`")]
    UnknownByteOrder(String),
    /// An unrecognised memory order.
    #[error("unknown memory order `{0}`")]
    UnknownMemoryOrder(String),
}

impl FromStr for ByteOrder {
    type Err = DataDescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "little" | "<" => Ok(Self::Little),
            "big" | ">" => Ok(Self::Big),
            _ => Err(DataDescriptorError::UnknownByteOrder(s.to_string())),
        }
    }
}

impl FromStr for MemoryOrder {
    type Err = DataDescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(Self::C),
            "F" => Ok(Self::F),
            _ => Err(DataDescriptorError::UnknownMemoryOrder(s.to_string())),
        }
    }
}

/// A data element with a fixed size representation.
pub trait Element: Copy {
    /// The data type of the element.
    const DATA_TYPE: DataType;

    /// Append the little-endian bytes of the element.
    fn write_le_bytes(self, bytes: &mut Vec<u8>);
}

macro_rules! impl_element {
    ($t:ty, $data_type:ident) => {
        impl Element for $t {
            const DATA_TYPE: DataType = DataType::$data_type;

            fn write_le_bytes(self, bytes: &mut Vec<u8>) {
                bytes.extend_from_slice(&self.to_le_bytes());
            }
        }
    };
}

impl_element!(i8, Int8);
impl_element!(i16, Int16);
impl_element!(i32, Int32);
impl_element!(i64, Int64);
impl_element!(u8, UInt8);
impl_element!(u16, UInt16);
impl_element!(u32, UInt32);
impl_element!(u64, UInt64);
impl_element!(f32, Float32);
impl_element!(f64, Float64);

impl Element for bool {
    const DATA_TYPE: DataType = DataType::Bool;

    fn write_le_bytes(self, bytes: &mut Vec<u8>) {
        bytes.push(u8::from(self));
    }
}

fn elements_checksum<'a, T: Element + 'a>(elements: impl IntoIterator<Item = &'a T>) -> Checksum {
    let mut bytes = Vec::new();
    for element in elements {
        element.write_le_bytes(&mut bytes);
    }
    Checksum::from_bytes(&bytes)
}

/// The validity mask of a masked data payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaskDescriptor {
    /// The checksum of the mask, one byte per element.
    pub checksum: Checksum,
    /// The memory layout of the mask.
    pub order: MemoryOrder,
}

/// A summary of a cube's data payload: its shape, element type and layout, and a checksum of its content.
///
/// The payload itself is held elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataDescriptor {
    shape: Vec<usize>,
    dtype: DataType,
    byte_order: ByteOrder,
    order: MemoryOrder,
    checksum: Checksum,
    mask: Option<MaskDescriptor>,
}

impl DataDescriptor {
    /// Create a new little-endian C order data descriptor.
    #[must_use]
    pub fn new(shape: impl Into<Vec<usize>>, dtype: DataType, checksum: Checksum) -> Self {
        Self {
            shape: shape.into(),
            dtype,
            byte_order: ByteOrder::default(),
            order: MemoryOrder::default(),
            checksum,
            mask: None,
        }
    }

    /// Describe `elements` in C order with `shape`.
    ///
    /// # Errors
    /// Returns [`DataDescriptorError::ElementCount`] if the number of elements does not match the shape.
    pub fn from_elements<T: Element>(
        shape: impl Into<Vec<usize>>,
        elements: &[T],
    ) -> Result<Self, DataDescriptorError> {
        let shape = shape.into();
        let expected = shape.iter().product::<usize>();
        if elements.len() != expected {
            return Err(DataDescriptorError::ElementCount {
                shape,
                expected,
                found: elements.len(),
            });
        }
        Ok(Self::new(shape, T::DATA_TYPE, elements_checksum(elements)))
    }

    /// Describe masked `elements` in C order with `shape`, where `true` in `mask` marks an invalid element.
    ///
    /// # Errors
    /// Returns [`DataDescriptorError`] if the number of elements or the mask length does not match the shape.
    pub fn from_masked_elements<T: Element>(
        shape: impl Into<Vec<usize>>,
        elements: &[T],
        mask: &[bool],
    ) -> Result<Self, DataDescriptorError> {
        let descriptor = Self::from_elements(shape, elements)?;
        if mask.len() != elements.len() {
            return Err(DataDescriptorError::MaskLength {
                expected: elements.len(),
                found: mask.len(),
            });
        }
        Ok(descriptor.with_mask(MaskDescriptor {
            checksum: elements_checksum(mask),
            order: MemoryOrder::C,
        }))
    }

    /// Describe an [`ndarray`] array.
    ///
    /// Standard layout arrays are described in C order, and arrays whose transpose has standard layout in F order.
    /// Other arrays are described in C order as if copied to a standard layout.
    #[cfg(feature = "ndarray")]
    #[must_use]
    pub fn from_ndarray<T: Element, S: ndarray::Data<Elem = T>, D: ndarray::Dimension>(
        array: &ndarray::ArrayBase<S, D>,
    ) -> Self {
        let shape = array.shape().to_vec();
        let transposed = array.t();
        if !array.is_standard_layout() && transposed.is_standard_layout() {
            Self::new(shape, T::DATA_TYPE, elements_checksum(transposed.iter()))
                .with_order(MemoryOrder::F)
        } else {
            Self::new(shape, T::DATA_TYPE, elements_checksum(array.iter()))
        }
    }

    /// Set the byte order.
    #[must_use]
    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Set the memory order.
    #[must_use]
    pub fn with_order(mut self, order: MemoryOrder) -> Self {
        self.order = order;
        self
    }

    /// Set the validity mask.
    #[must_use]
    pub fn with_mask(mut self, mask: MaskDescriptor) -> Self {
        self.mask = Some(mask);
        self
    }

    /// The shape.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The number of dimensions.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// The element data type.
    #[must_use]
    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    /// The byte order.
    #[must_use]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// The memory order.
    #[must_use]
    pub fn order(&self) -> MemoryOrder {
        self.order
    }

    /// The content checksum.
    #[must_use]
    pub fn checksum(&self) -> Checksum {
        self.checksum
    }

    /// The validity mask, if the data is masked.
    #[must_use]
    pub fn mask(&self) -> Option<&MaskDescriptor> {
        self.mask.as_ref()
    }

    /// Returns true if the data is masked.
    #[must_use]
    pub fn is_masked(&self) -> bool {
        self.mask.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_descriptor_from_elements() {
        let descriptor = DataDescriptor::from_elements([2, 2], &[1i32, 2, 3, 4]).unwrap();
        assert_eq!(descriptor.shape(), &[2, 2]);
        assert_eq!(descriptor.dtype(), DataType::Int32);
        assert_eq!(descriptor.byte_order(), ByteOrder::Little);
        assert_eq!(descriptor.order(), MemoryOrder::C);
        assert!(!descriptor.is_masked());
        assert_eq!(
            descriptor.checksum(),
            Checksum::from_bytes(&[1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4, 0, 0, 0])
        );

        assert_eq!(
            DataDescriptor::from_elements([3], &[1.0f32, 2.0]),
            Err(DataDescriptorError::ElementCount {
                shape: vec![3],
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn data_descriptor_masked() {
        let descriptor =
            DataDescriptor::from_masked_elements([3], &[1.0f64, 2.0, 3.0], &[false, true, false])
                .unwrap();
        let mask = descriptor.mask().unwrap();
        assert_eq!(mask.checksum, Checksum::from_bytes(&[0, 1, 0]));
        assert_eq!(mask.order, MemoryOrder::C);
        assert!(matches!(
            DataDescriptor::from_masked_elements([3], &[1.0f64, 2.0, 3.0], &[false]),
            Err(DataDescriptorError::MaskLength { .. })
        ));
    }

    #[test]
    fn byte_and_memory_order_names() {
        assert_eq!(ByteOrder::Big.to_string(), "big");
        assert_eq!("little".parse(), Ok(ByteOrder::Little));
        assert_eq!(MemoryOrder::F.to_string(), "F");
        assert_eq!("C".parse(), Ok(MemoryOrder::C));
        assert!("G".parse::<MemoryOrder>().is_err());
    }

    #[cfg(feature = "ndarray")]
    #[test]
    fn data_descriptor_from_ndarray() {
        let array = ndarray::array![[1u8, 2, 3], [4, 5, 6]];
        let descriptor = DataDescriptor::from_ndarray(&array);
        assert_eq!(descriptor.shape(), &[2, 3]);
        assert_eq!(descriptor.dtype(), DataType::UInt8);
        assert_eq!(descriptor.order(), MemoryOrder::C);
        assert_eq!(descriptor.checksum(), Checksum::from_bytes(&[1, 2, 3, 4, 5, 6]));

        let fortran = array.t().to_owned();
        let fortran = fortran.reversed_axes();
        assert_eq!(fortran, array);
        let descriptor = DataDescriptor::from_ndarray(&fortran);
        assert_eq!(descriptor.order(), MemoryOrder::F);
        assert_eq!(descriptor.checksum(), Checksum::from_bytes(&[1, 4, 2, 5, 3, 6]));
    }
}
