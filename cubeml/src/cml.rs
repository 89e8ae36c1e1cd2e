//! The CubeML interchange format.
//!
//! CubeML is an XML summary of a [`CubeCollection`]: each cube's names, units, attributes, coordinates and
//! cell methods, and a [`DataDescriptor`](crate::DataDescriptor) standing in for its data.
//!
//! ```xml
//! <?xml version="1.0"?>
//! <cubes xmlns="urn:x-iris:cubeml-0.2">
//!   <cube standard_name="air_temperature" units="K">
//!     <coords>
//!       <coord datadims="[0]">
//!         <dimCoord id="1a2b3c4d" points="[1000.0, 850.0, 700.0]" shape="(3,)" standard_name="air_pressure" units="hPa" value_type="float32"/>
//!       </coord>
//!     </coords>
//!     <cellMethods>
//!       <cellMethod method="mean">
//!         <coord interval="1 hour" name="time"/>
//!       </cellMethod>
//!     </cellMethods>
//!     <data byteorder="little" checksum="0x4d2e0e3a" dtype="float32" order="C" shape="(3,)"/>
//!   </cube>
//! </cubes>
//! ```
//!
//! Point and bound sequences longer than the [`CmlOptions`] threshold are written elided, as `[a, b, ..., y, z]`,
//! with a `points_checksum` or `bounds_checksum` of the full sequence.
//! Elided sequences are read back as [`ElidedValues`](crate::ElidedValues) and compare by length and checksum.

mod cml_errors;
pub(crate) mod cml_format;
mod cml_options;
mod cml_reader;
mod cml_writer;

pub use cml_errors::CodecError;
pub use cml_options::CmlOptions;

use std::io::{Read, Write};

use crate::CubeCollection;

/// The CubeML namespace.
pub const CML_NAMESPACE: &str = "urn:x-iris:cubeml-0.2";

/// Write `cubes` as a CubeML document.
///
/// # Errors
/// Returns [`CodecError`] if writing to `writer` fails.
pub fn write_cml<W: Write>(
    cubes: &CubeCollection,
    options: &CmlOptions,
    writer: W,
) -> Result<(), CodecError> {
    cml_writer::write_collection(cubes, options, writer)
}

/// Serialise `cubes` as a CubeML document.
///
/// # Errors
/// Returns [`CodecError`] if the document cannot be written.
pub fn to_cml_string(cubes: &CubeCollection, options: &CmlOptions) -> Result<String, CodecError> {
    let mut bytes = Vec::new();
    write_cml(cubes, options, &mut bytes)?;
    String::from_utf8(bytes)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err).into())
}

/// Parse a CubeML document.
///
/// # Errors
/// Returns [`CodecError`] if the document is malformed: the XML is invalid, the root element does not declare the
/// [`CML_NAMESPACE`], a required element or attribute is missing or invalid, or a cube cannot be constructed.
pub fn from_cml_str(text: &str) -> Result<CubeCollection, CodecError> {
    cml_reader::read_collection(text)
}

/// Read a CubeML document.
///
/// # Errors
/// Returns [`CodecError`] if reading fails or the document is malformed.
pub fn read_cml<R: Read>(mut reader: R) -> Result<CubeCollection, CodecError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    from_cml_str(&text)
}
