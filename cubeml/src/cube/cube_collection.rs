use derive_more::{Deref, DerefMut, From, IntoIterator};

use super::{Cube, ShapeMismatchError};

/// An ordered collection of cubes.
#[derive(Debug, Clone, PartialEq, Default, Deref, DerefMut, From, IntoIterator)]
pub struct CubeCollection(#[into_iterator(owned, ref, ref_mut)] Vec<Cube>);

impl CubeCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the collection, returning its cubes.
    #[must_use]
    pub fn into_inner(self) -> Vec<Cube> {
        self.0
    }

    /// The cube named `name`.
    #[must_use]
    pub fn cube(&self, name: &str) -> Option<&Cube> {
        self.0.iter().find(|cube| cube.name() == name)
    }

    /// Validate every cube.
    ///
    /// # Errors
    /// Returns the [`ShapeMismatchError`] of the first invalid cube.
    pub fn validate(&self) -> Result<(), ShapeMismatchError> {
        self.0.iter().try_for_each(Cube::validate)
    }
}

impl FromIterator<Cube> for CubeCollection {
    fn from_iter<T: IntoIterator<Item = Cube>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Cube> for CubeCollection {
    fn from(cube: Cube) -> Self {
        Self(vec![cube])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CoordBuilder, DataDescriptor};

    #[test]
    fn cube_collection_validate() {
        let mut cube = Cube::new(DataDescriptor::from_elements([2], &[1i32, 2]).unwrap());
        cube.set_long_name(Some("counts".to_string()));
        cube.add_coord(
            CoordBuilder::new(vec![1, 2, 3]).long_name("index").build().unwrap(),
            &[0],
        )
        .unwrap();
        let valid = Cube::new(DataDescriptor::from_elements([2], &[1i32, 2]).unwrap());

        let mut cubes: CubeCollection = vec![valid].into();
        assert_eq!(cubes.validate(), Ok(()));
        cubes.push(cube);
        assert_eq!(cubes.len(), 2);
        assert!(cubes.cube("counts").is_some());
        assert_eq!(cubes.validate().unwrap_err().coord, "index");

        let names: Vec<&str> = cubes.iter().map(Cube::name).collect();
        assert_eq!(names, ["unknown", "counts"]);
        let cubes: CubeCollection = cubes.into_iter().skip(1).collect();
        assert_eq!(cubes.len(), 1);
    }
}
