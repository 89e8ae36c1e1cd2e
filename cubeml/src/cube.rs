//! Cubes.
//!
//! A [`Cube`] describes a multidimensional data payload with [`Coord`]s mapped to its dimensions,
//! a [`Unit`], attributes and the [`CellMethod`]s that produced it.
//!
//! ```rust
//! # use cubeml::{CoordBuilder, Cube, DataDescriptor, units::Unit};
//! let data = DataDescriptor::from_elements([2, 3], &[0.0f32; 6])?;
//! let mut cube = Cube::new(data);
//! cube.set_standard_name(Some("air_temperature".to_string()))
//!     .set_units(Unit::parse("K")?);
//! cube.add_dim_coord(
//!     CoordBuilder::new(vec![10.0, 20.0]).standard_name("latitude").build()?,
//!     0,
//! )?;
//! cube.add_dim_coord(
//!     CoordBuilder::new(vec![0.0, 1.0, 2.0]).standard_name("longitude").build()?,
//!     1,
//! )?;
//! cube.validate()?;
//! assert_eq!(cube.to_string(), "air_temperature / (K) (latitude: 2; longitude: 3)");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod cube_collection;
mod cube_errors;
mod data_descriptor;

pub use cube_collection::CubeCollection;
pub use cube_errors::{CubeError, DimensionConflictError, ShapeMismatchError};
pub use data_descriptor::{
    ByteOrder, DataDescriptor, DataDescriptorError, Element, MaskDescriptor, MemoryOrder,
};

use cubeml_units::Unit;
use itertools::Itertools;

use crate::{
    attributes::{self, Attributes},
    coord::resolve_name,
    CellMethod, Coord,
};

/// The role of a coordinate on a cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordKind {
    /// A dimension coordinate: one-dimensional, numeric and strictly monotonic, at most one per dimension.
    Dim,
    /// An auxiliary coordinate.
    Aux,
}

/// A coordinate and the cube dimensions it maps to.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeCoord {
    coord: Coord,
    dims: Vec<usize>,
    kind: CoordKind,
}

impl CubeCoord {
    /// The coordinate.
    #[must_use]
    pub fn coord(&self) -> &Coord {
        &self.coord
    }

    /// The cube dimensions, one per coordinate dimension, or empty for a scalar coordinate.
    #[must_use]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// The coordinate kind.
    #[must_use]
    pub fn kind(&self) -> CoordKind {
        self.kind
    }

    /// Returns true if the coordinate is a dimension coordinate.
    #[must_use]
    pub fn is_dim_coord(&self) -> bool {
        self.kind == CoordKind::Dim
    }

    /// The lengths of the coordinate along each of its cube dimensions.
    fn dim_lengths(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.dims.iter().copied().zip(self.coord.shape().iter().copied())
    }
}

/// A cube.
#[derive(Debug, Clone)]
pub struct Cube {
    standard_name: Option<String>,
    long_name: Option<String>,
    var_name: Option<String>,
    units: Unit,
    attributes: Attributes,
    coords: Vec<CubeCoord>,
    cell_methods: Vec<CellMethod>,
    data: DataDescriptor,
}

/// Coordinates are compared irrespective of the order they were added in.
/// Cell methods are compared in order.
impl PartialEq for Cube {
    fn eq(&self, other: &Self) -> bool {
        self.standard_name == other.standard_name
            && self.long_name == other.long_name
            && self.var_name == other.var_name
            && self.units == other.units
            && self.attributes == other.attributes
            && self.cell_methods == other.cell_methods
            && self.data == other.data
            && self.coords.len() == other.coords.len()
            && self
                .coords
                .iter()
                .all(|coord| other.coords.contains(coord))
    }
}

impl Cube {
    /// Create a new cube with unknown units and no coordinates.
    #[must_use]
    pub fn new(data: DataDescriptor) -> Self {
        Self {
            standard_name: None,
            long_name: None,
            var_name: None,
            units: Unit::default(),
            attributes: Attributes::default(),
            coords: Vec::new(),
            cell_methods: Vec::new(),
            data,
        }
    }

    /// The standard name.
    #[must_use]
    pub fn standard_name(&self) -> Option<&str> {
        self.standard_name.as_deref()
    }

    /// Set the standard name.
    pub fn set_standard_name(&mut self, standard_name: Option<String>) -> &mut Self {
        self.standard_name = standard_name;
        self
    }

    /// The long name.
    #[must_use]
    pub fn long_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }

    /// Set the long name.
    pub fn set_long_name(&mut self, long_name: Option<String>) -> &mut Self {
        self.long_name = long_name;
        self
    }

    /// The variable name.
    #[must_use]
    pub fn var_name(&self) -> Option<&str> {
        self.var_name.as_deref()
    }

    /// Set the variable name.
    pub fn set_var_name(&mut self, var_name: Option<String>) -> &mut Self {
        self.var_name = var_name;
        self
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

    /// Rename the cube.
    ///
    /// The name becomes the long name, and the standard name and variable name are cleared.
    pub fn rename(&mut self, name: impl Into<String>) -> &mut Self {
        self.standard_name = None;
        self.long_name = Some(name.into()).filter(|name| !name.is_empty());
        self.var_name = None;
        self
    }

    /// The units.
    #[must_use]
    pub fn units(&self) -> &Unit {
        &self.units
    }

    /// Set the units.
    pub fn set_units(&mut self, units: Unit) -> &mut Self {
        self.units = units;
        self
    }

    /// The attributes.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Set the attributes.
    ///
    /// # Errors
    /// Returns [`CubeError::ReservedAttribute`] if an attribute name is reserved for cube metadata.
    pub fn set_attributes(&mut self, attributes: Attributes) -> Result<&mut Self, CubeError> {
        if let Some(attribute) = attributes::find_reserved(&attributes) {
            return Err(CubeError::ReservedAttribute {
                cube: self.name().to_string(),
                attribute: attribute.to_string(),
            });
        }
        self.attributes = attributes;
        Ok(self)
    }

    /// Set an attribute.
    ///
    /// # Errors
    /// Returns [`CubeError::ReservedAttribute`] if `name` is reserved for cube metadata.
    pub fn set_attribute(
        &mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Result<&mut Self, CubeError> {
        let name: String = name.into();
        if attributes::RESERVED_ATTRIBUTE_NAMES.contains(&name.as_str()) {
            return Err(CubeError::ReservedAttribute {
                cube: self.name().to_string(),
                attribute: name,
            });
        }
        self.attributes.insert(name, value.into());
        Ok(self)
    }

    /// The data descriptor.
    #[must_use]
    pub fn data(&self) -> &DataDescriptor {
        &self.data
    }

    /// Set the data descriptor.
    ///
    /// Coordinates are not checked against the new shape until [`validate`](Cube::validate).
    pub fn set_data(&mut self, data: DataDescriptor) -> &mut Self {
        self.data = data;
        self
    }

    /// The data shape.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// The number of data dimensions.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// The cell methods in the order they were applied.
    #[must_use]
    pub fn cell_methods(&self) -> &[CellMethod] {
        &self.cell_methods
    }

    /// Append a cell method.
    pub fn add_cell_method(&mut self, cell_method: CellMethod) -> &mut Self {
        self.cell_methods.push(cell_method);
        self
    }

    /// The coordinates with their dimension mappings, in the order they were added.
    #[must_use]
    pub fn coord_entries(&self) -> &[CubeCoord] {
        &self.coords
    }

    /// The coordinates, in the order they were added.
    pub fn coords(&self) -> impl Iterator<Item = &Coord> {
        self.coords.iter().map(CubeCoord::coord)
    }

    /// The dimension coordinates in dimension order.
    pub fn dim_coords(&self) -> impl Iterator<Item = &Coord> {
        self.coords
            .iter()
            .filter(|entry| entry.is_dim_coord())
            .sorted_by_key(|entry| entry.dims.first().copied())
            .map(CubeCoord::coord)
    }

    /// The auxiliary coordinates, in the order they were added.
    pub fn aux_coords(&self) -> impl Iterator<Item = &Coord> {
        self.coords
            .iter()
            .filter(|entry| !entry.is_dim_coord())
            .map(CubeCoord::coord)
    }

    fn find_coord(&self, name: &str) -> Option<usize> {
        self.coords.iter().position(|entry| {
            let coord = &entry.coord;
            coord.name() == name
                || coord.standard_name() == Some(name)
                || coord.long_name() == Some(name)
                || coord.var_name() == Some(name)
        })
    }

    /// The coordinate with a standard, long or variable name of `name`.
    #[must_use]
    pub fn coord(&self, name: &str) -> Option<&Coord> {
        self.find_coord(name).map(|index| &self.coords[index].coord)
    }

    /// The cube dimensions of the coordinate named `name`.
    #[must_use]
    pub fn coord_dims(&self, name: &str) -> Option<&[usize]> {
        self.find_coord(name)
            .map(|index| self.coords[index].dims.as_slice())
    }

    /// The dimension coordinate of `dim`.
    #[must_use]
    pub fn dim_coord(&self, dim: usize) -> Option<&Coord> {
        self.coords
            .iter()
            .find(|entry| entry.is_dim_coord() && entry.dims == [dim])
            .map(CubeCoord::coord)
    }

    /// The length of `dim` implied by the coordinates, and the coordinate implying it.
    fn coord_dim_len(&self, dim: usize, skip: Option<usize>) -> Option<(&str, usize)> {
        self.coords
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != skip)
            .find_map(|(_, entry)| {
                entry
                    .dim_lengths()
                    .find(|(d, _)| *d == dim)
                    .map(|(_, len)| (entry.coord.name(), len))
            })
    }

    fn check_mapping(
        &self,
        coord: &Coord,
        dims: &[usize],
        skip: Option<usize>,
    ) -> Result<(), CubeError> {
        let scalar = dims.is_empty() && coord.is_scalar();
        if !scalar && dims.len() != coord.ndim() {
            return Err(CubeError::WrongDimCount {
                cube: self.name().to_string(),
                coord: coord.name().to_string(),
                ndim: coord.ndim(),
                dims: dims.to_vec(),
            });
        }
        if let Some(dim) = dims.iter().duplicates().next() {
            return Err(CubeError::RepeatedDims {
                cube: self.name().to_string(),
                coord: coord.name().to_string(),
                dim: *dim,
            });
        }
        for (&dim, &new_len) in dims.iter().zip(coord.shape()) {
            if let Some((existing, existing_len)) = self.coord_dim_len(dim, skip) {
                if existing_len != new_len {
                    return Err(DimensionConflictError {
                        cube: self.name().to_string(),
                        dim,
                        existing: existing.to_string(),
                        existing_len,
                        new: coord.name().to_string(),
                        new_len,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    fn insert_coord(
        &mut self,
        coord: Coord,
        dims: &[usize],
        kind: CoordKind,
    ) -> Result<(), CubeError> {
        if self.find_coord(coord.name()).is_some() {
            return Err(CubeError::DuplicateCoord {
                cube: self.name().to_string(),
                coord: coord.name().to_string(),
            });
        }
        self.check_mapping(&coord, dims, None)?;
        self.coords.push(CubeCoord {
            coord,
            dims: dims.to_vec(),
            kind,
        });
        Ok(())
    }

    /// Add an auxiliary coordinate mapped to `dims`, one cube dimension per coordinate dimension.
    ///
    /// A scalar coordinate may be mapped to no dimensions.
    ///
    /// # Errors
    /// Returns [`CubeError::DimensionConflict`] if another coordinate maps a different length to one of `dims`,
    /// or another [`CubeError`] if the mapping is invalid or the cube already has a coordinate with the same name.
    pub fn add_coord(&mut self, coord: Coord, dims: &[usize]) -> Result<(), CubeError> {
        self.insert_coord(coord, dims, CoordKind::Aux)
    }

    /// Add a dimension coordinate describing `dim`.
    ///
    /// # Errors
    /// Returns [`CubeError::InvalidDimCoord`] if the coordinate cannot describe a dimension,
    /// [`CubeError::DimCoordExists`] if `dim` already has a dimension coordinate,
    /// or the errors of [`add_coord`](Cube::add_coord).
    pub fn add_dim_coord(&mut self, coord: Coord, dim: usize) -> Result<(), CubeError> {
        coord
            .check_dim_coord()
            .map_err(|source| CubeError::InvalidDimCoord {
                cube: self.name().to_string(),
                source,
            })?;
        if let Some(existing) = self.dim_coord(dim) {
            return Err(CubeError::DimCoordExists {
                cube: self.name().to_string(),
                dim,
                existing: existing.name().to_string(),
            });
        }
        self.insert_coord(coord, &[dim], CoordKind::Dim)
    }

    /// Remove the coordinate named `name`.
    ///
    /// # Errors
    /// Returns [`CubeError::CoordNotFound`] if there is no such coordinate.
    pub fn remove_coord(&mut self, name: &str) -> Result<Coord, CubeError> {
        let index = self
            .find_coord(name)
            .ok_or_else(|| CubeError::CoordNotFound {
                cube: self.name().to_string(),
                coord: name.to_string(),
            })?;
        Ok(self.coords.remove(index).coord)
    }

    /// Replace the coordinate with the same name as `coord`, keeping its dimensions and kind.
    ///
    /// The replacement is checked against the other coordinates but not against the data shape.
    ///
    /// # Errors
    /// Returns [`CubeError::CoordNotFound`] if there is no such coordinate,
    /// [`CubeError::DimensionConflict`] if the replacement disagrees with another coordinate,
    /// or [`CubeError::InvalidDimCoord`] if a dimension coordinate is replaced with one that cannot describe a dimension.
    pub fn replace_coord(&mut self, coord: Coord) -> Result<Coord, CubeError> {
        let index = self
            .find_coord(coord.name())
            .ok_or_else(|| CubeError::CoordNotFound {
                cube: self.name().to_string(),
                coord: coord.name().to_string(),
            })?;
        let entry = &self.coords[index];
        if entry.is_dim_coord() {
            coord
                .check_dim_coord()
                .map_err(|source| CubeError::InvalidDimCoord {
                    cube: self.name().to_string(),
                    source,
                })?;
        }
        self.check_mapping(&coord, &entry.dims, Some(index))?;
        Ok(std::mem::replace(&mut self.coords[index].coord, coord))
    }

    /// Check every coordinate agrees with the data shape.
    ///
    /// # Errors
    /// Returns [`ShapeMismatchError`] naming the first coordinate with a length that differs from the data along one of its dimensions,
    /// or that maps to a dimension the data does not have.
    pub fn validate(&self) -> Result<(), ShapeMismatchError> {
        let shape = self.data.shape();
        for entry in &self.coords {
            for (dim, len) in entry.dim_lengths() {
                let expected = shape.get(dim).copied();
                if expected != Some(len) {
                    return Err(ShapeMismatchError {
                        cube: self.name().to_string(),
                        coord: entry.coord.name().to_string(),
                        dim,
                        expected,
                        found: len,
                    });
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Cube {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / ({})", self.name(), self.units)?;
        if self.ndim() == 0 {
            return write!(f, " (scalar cube)");
        }
        let dims = self
            .shape()
            .iter()
            .enumerate()
            .map(|(dim, len)| match self.dim_coord(dim) {
                Some(coord) => format!("{}: {len}", coord.name()),
                None => format!("-- : {len}"),
            })
            .join("; ");
        write!(f, " ({dims})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CoordBuilder, CoordValidationError};

    fn linspace(start: f64, step: f64, len: usize) -> Vec<f64> {
        (0..len).map(|i| start + step * i as f64).collect()
    }

    fn air_temperature() -> Cube {
        let data = DataDescriptor::from_elements([3, 73, 96], &vec![0.0f32; 3 * 73 * 96]).unwrap();
        let mut cube = Cube::new(data);
        cube.set_standard_name(Some("air_temperature".to_string()))
            .set_units(Unit::parse("K").unwrap());
        cube.add_dim_coord(
            CoordBuilder::new(vec![1000.0, 850.0, 700.0])
                .long_name("pressure")
                .units(Unit::parse("hPa").unwrap())
                .build()
                .unwrap(),
            0,
        )
        .unwrap();
        cube.add_dim_coord(
            CoordBuilder::new(linspace(-90.0, 2.5, 73))
                .standard_name("latitude")
                .units(Unit::parse("degrees").unwrap())
                .build()
                .unwrap(),
            1,
        )
        .unwrap();
        cube.add_dim_coord(
            CoordBuilder::new(linspace(0.0, 3.75, 96))
                .standard_name("longitude")
                .units(Unit::parse("degrees").unwrap())
                .circular(true)
                .build()
                .unwrap(),
            2,
        )
        .unwrap();
        cube
    }

    #[test]
    fn cube_validates() {
        let cube = air_temperature();
        assert_eq!(cube.validate(), Ok(()));
        assert_eq!(
            cube.to_string(),
            "air_temperature / (K) (pressure: 3; latitude: 73; longitude: 96)"
        );
        assert_eq!(cube.coord_dims("latitude"), Some([1].as_slice()));
        assert_eq!(
            cube.dim_coords().map(Coord::name).collect::<Vec<_>>(),
            ["pressure", "latitude", "longitude"]
        );
    }

    #[test]
    fn cube_shape_mismatch() {
        let mut cube = air_temperature();
        let pressure = CoordBuilder::new(vec![1000.0, 850.0, 700.0, 500.0])
            .long_name("pressure")
            .units(Unit::parse("hPa").unwrap())
            .build()
            .unwrap();
        cube.replace_coord(pressure).unwrap();
        assert_eq!(
            cube.validate(),
            Err(ShapeMismatchError {
                cube: "air_temperature".to_string(),
                coord: "pressure".to_string(),
                dim: 0,
                expected: Some(3),
                found: 4,
            })
        );
    }

    #[test]
    fn cube_dimension_conflict() {
        let mut cube = air_temperature();
        let level = CoordBuilder::new(vec![1, 2, 3, 4])
            .long_name("model_level_number")
            .build()
            .unwrap();
        assert_eq!(
            cube.add_coord(level, &[0]),
            Err(CubeError::DimensionConflict(DimensionConflictError {
                cube: "air_temperature".to_string(),
                dim: 0,
                existing: "pressure".to_string(),
                existing_len: 3,
                new: "model_level_number".to_string(),
                new_len: 4,
            }))
        );
    }

    #[test]
    fn cube_add_coord_errors() {
        let mut cube = air_temperature();
        let surface = CoordBuilder::new(vec![0.0, 1.0])
            .long_name("surface_altitude")
            .shape(vec![1, 2])
            .build()
            .unwrap();
        assert!(matches!(
            cube.add_coord(surface.clone(), &[1]),
            Err(CubeError::WrongDimCount { ndim: 2, .. })
        ));
        assert!(matches!(
            cube.add_coord(surface, &[1, 1]),
            Err(CubeError::RepeatedDims { dim: 1, .. })
        ));

        let latitude = cube.coord("latitude").unwrap().clone();
        assert!(matches!(
            cube.add_coord(latitude.clone(), &[1]),
            Err(CubeError::DuplicateCoord { .. })
        ));
        let mut other = latitude;
        other.rename("grid_latitude");
        assert!(matches!(
            cube.add_dim_coord(other, 1),
            Err(CubeError::DimCoordExists { dim: 1, .. })
        ));

        let unordered = CoordBuilder::new(vec![3.0, 1.0, 2.0])
            .long_name("unordered")
            .build()
            .unwrap();
        assert!(matches!(
            cube.add_dim_coord(unordered, 0),
            Err(CubeError::InvalidDimCoord {
                source: CoordValidationError::NotMonotonic(_),
                ..
            })
        ));
    }

    #[test]
    fn cube_scalar_and_aux_coords() {
        let mut cube = air_temperature();
        let height = CoordBuilder::new(vec![1.5])
            .standard_name("height")
            .units(Unit::parse("m").unwrap())
            .build()
            .unwrap();
        cube.add_coord(height, &[]).unwrap();
        let level = CoordBuilder::new(vec![1, 2, 3])
            .long_name("model_level_number")
            .build()
            .unwrap();
        cube.add_coord(level, &[0]).unwrap();
        assert_eq!(cube.validate(), Ok(()));
        assert_eq!(
            cube.aux_coords().map(Coord::name).collect::<Vec<_>>(),
            ["height", "model_level_number"]
        );
        assert_eq!(cube.coord_dims("height"), Some([].as_slice()));

        let removed = cube.remove_coord("height").unwrap();
        assert_eq!(removed.name(), "height");
        assert!(cube.coord("height").is_none());
        assert!(matches!(
            cube.remove_coord("height"),
            Err(CubeError::CoordNotFound { .. })
        ));
    }

    #[test]
    fn cube_validate_missing_dimension() {
        let mut cube = air_temperature();
        let data = DataDescriptor::from_elements([3, 73], &vec![0i16; 3 * 73]).unwrap();
        cube.set_data(data);
        assert_eq!(
            cube.validate(),
            Err(ShapeMismatchError {
                cube: "air_temperature".to_string(),
                coord: "longitude".to_string(),
                dim: 2,
                expected: None,
                found: 96,
            })
        );
        assert_eq!(
            cube.to_string(),
            "air_temperature / (K) (pressure: 3; latitude: 73)"
        );
    }

    #[test]
    fn cube_equality_ignores_coord_order() {
        let cube = air_temperature();
        let mut reordered = Cube::new(cube.data().clone());
        reordered
            .set_standard_name(Some("air_temperature".to_string()))
            .set_units(Unit::parse("K").unwrap());
        for entry in cube.coord_entries().iter().rev() {
            reordered
                .add_dim_coord(entry.coord().clone(), entry.dims()[0])
                .unwrap();
        }
        assert_eq!(cube, reordered);

        reordered.add_cell_method(CellMethod::new("mean", ["time"]).unwrap());
        assert_ne!(cube, reordered);
    }

    #[test]
    fn cube_attributes_and_names() {
        let mut cube = air_temperature();
        cube.set_attribute("source", "Data from Met Office Unified Model")
            .unwrap();
        assert!(matches!(
            cube.set_attribute("units", "K"),
            Err(CubeError::ReservedAttribute { .. })
        ));
        assert_eq!(cube.attributes().len(), 1);

        cube.rename("temperature");
        assert_eq!(cube.name(), "temperature");
        assert_eq!(cube.standard_name(), None);
        assert_eq!(cube.long_name(), Some("temperature"));

        let scalar = Cube::new(DataDescriptor::from_elements(Vec::new(), &[1.0f64]).unwrap());
        assert_eq!(scalar.to_string(), "unknown / (unknown) (scalar cube)");
    }
}
