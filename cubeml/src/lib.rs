//! `cubeml` is a Rust library for labelled multidimensional scientific arrays and their CubeML interchange format.
//!
//! A [`Cube`] pairs a [`DataDescriptor`] (the shape, data type and checksum of a data payload) with
//! - names, [`units`](crate::units::Unit) and free-form [`Attributes`],
//! - [`Coord`]s mapped to its dimensions, either as dimension coordinates or auxiliary coordinates,
//! - and the [`CellMethod`]s that record how its values were aggregated.
//!
//! Cubes are grouped in a [`CubeCollection`], which round-trips through the CubeML XML format with
//! [`to_cml_string`] and [`from_cml_str`].
//! Reference CubeML results can be kept on the filesystem and compared with a [`ResultStore`].
//!
//! ## Example
//! ```rust
//! # use cubeml::{
//! #     from_cml_str, to_cml_string, CellMethod, CmlOptions, CoordBuilder, Cube, CubeCollection,
//! #     DataDescriptor, units::Unit,
//! # };
//! let data = DataDescriptor::from_elements([3], &[280.0f32, 275.5, 270.25])?;
//! let mut cube = Cube::new(data);
//! cube.set_standard_name(Some("air_temperature".to_string()))
//!     .set_units(Unit::parse("K")?);
//! cube.add_dim_coord(
//!     CoordBuilder::new(vec![1000.0, 850.0, 700.0])
//!         .standard_name("air_pressure")
//!         .units(Unit::parse("hPa")?)
//!         .build()?,
//!     0,
//! )?;
//! cube.add_cell_method(CellMethod::new("mean", ["time"])?.with_intervals(["1 hour"])?);
//!
//! let cubes = CubeCollection::from(cube);
//! let cml = to_cml_string(&cubes, &CmlOptions::default())?;
//! assert!(cml.contains(r#"<cellMethod method="mean">"#));
//! assert_eq!(from_cml_str(&cml)?, cubes);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Features
//! - `ndarray` (default): adds [`DataDescriptor::from_ndarray`].
//!
//! ## Logging
//! `cubeml` logs information and warnings using the [`log`] crate.
//! A logging implementation must be enabled to capture logs.
//! See the [`log`] crate documentation for more details.
//!
//! ## Licence
//! `cubeml` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

mod attributes;
mod cell_method;
mod checksum;
pub mod cml;
pub mod config;
mod coord;
mod coord_system;
mod cube;
mod data_type;
pub mod result_store;
mod values;

pub use attributes::{Attributes, RESERVED_ATTRIBUTE_NAMES};
pub use cell_method::{CellMethod, CellMethodError};
pub use checksum::{Checksum, ChecksumParseError};
pub use cml::{from_cml_str, read_cml, to_cml_string, write_cml, CmlOptions, CodecError};
pub use config::{Config, ConfigError};
pub use coord::{Coord, CoordBuilder, CoordOpError, CoordValidationError};
pub use coord_system::{CoordSystem, CoordSystemError, Ellipsoid, GeogCs, RotatedGeogCs};
pub use cube::{
    ByteOrder, CoordKind, Cube, CubeCollection, CubeCoord, CubeError, DataDescriptor,
    DataDescriptorError, DimensionConflictError, Element, MaskDescriptor, MemoryOrder,
    ShapeMismatchError,
};
pub use data_type::{DataType, UnknownDataTypeError};
pub use result_store::{Comparison, ResultStore, ResultStoreError};
pub use values::{ElidedValues, ValueArray, ValueTypeError, Values};

pub use cubeml_units as units;
