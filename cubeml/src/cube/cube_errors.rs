use thiserror::Error;

use crate::CoordValidationError;

/// A coordinate maps a length to a dimension that disagrees with another coordinate.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("cube `{cube}` dimension {dim}: coordinate `{new}` has length {new_len} but `{existing}` has length {existing_len}")]
pub struct DimensionConflictError {
    /// The cube name.
    pub cube: String,
    /// The dimension.
    pub dim: usize,
    /// The name of the coordinate already on the dimension.
    pub existing: String,
    /// The length of the existing coordinate along the dimension.
    pub existing_len: usize,
    /// The name of the new coordinate.
    pub new: String,
    /// The length of the new coordinate along the dimension.
    pub new_len: usize,
}

/// A coordinate disagrees with the shape of the cube data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeMismatchError {
    /// The cube name.
    pub cube: String,
    /// The coordinate name.
    pub coord: String,
    /// The data dimension.
    pub dim: usize,
    /// The data length along the dimension, or [`None`] if the data has no such dimension.
    pub expected: Option<usize>,
    /// The coordinate length along the dimension.
    pub found: usize,
}

impl std::fmt::Display for ShapeMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cube `{}` coordinate `{}` has length {} along dimension {}, ",
            self.cube, self.coord, self.found, self.dim
        )?;
        match self.expected {
            Some(len) => write!(f, "but the data has length {len}"),
            None => write!(f, "but the data has no such dimension"),
        }
    }
}

impl std::error::Error for ShapeMismatchError {}

/// A cube mutation error.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum CubeError {
    /// A dimension conflict.
    #[error(transparent)]
    DimensionConflict(#[from] DimensionConflictError),
    /// The number of dimensions does not match the coordinate.
    #[error("cube `{cube}` coordinate `{coord}` has {ndim} dimensions but was mapped to {dims:?}")]
    WrongDimCount {
        /// The cube name.
        cube: String,
        /// The coordinate name.
        coord: String,
        /// The coordinate dimensionality.
        ndim: usize,
        /// The requested dimensions.
        dims: Vec<usize>,
    },
    /// A dimension is repeated.
    #[error("cube `{cube}` coordinate `{coord}` maps dimension {dim} more than once")]
    RepeatedDims {
        /// The cube name.
        cube: String,
        /// The coordinate name.
        coord: String,
        /// The repeated dimension.
        dim: usize,
    },
    /// A coordinate with the same definition is already on the cube.
    #[error("cube `{cube}` already has a coordinate `{coord}`")]
    DuplicateCoord {
        /// The cube name.
        cube: String,
        /// The coordinate name.
        coord: String,
    },
    /// The dimension already has a dimension coordinate.
    #[error("cube `{cube}` dimension {dim} already has dimension coordinate `{existing}`")]
    DimCoordExists {
        /// The cube name.
        cube: String,
        /// The dimension.
        dim: usize,
        /// The existing dimension coordinate name.
        existing: String,
    },
    /// The coordinate cannot describe a dimension.
    #[error("cube `{cube}`: invalid dimension coordinate")]
    InvalidDimCoord {
        /// The cube name.
        cube: String,
        /// The underlying error.
        #[source]
        source: CoordValidationError,
    },
    /// No coordinate with the name.
    #[error("cube `{cube}` has no coordinate `{coord}`")]
    CoordNotFound {
        /// The cube name.
        cube: String,
        /// The coordinate name.
        coord: String,
    },
    /// A reserved attribute name.
    #[error("cube `{cube}` attribute `{attribute}` is reserved")]
    ReservedAttribute {
        /// The cube name.
        cube: String,
        /// The attribute name.
        attribute: String,
    },
}
