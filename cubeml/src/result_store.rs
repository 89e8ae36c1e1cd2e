//! Reference CubeML results on the filesystem.
//!
//! A [`ResultStore`] keeps CubeML summaries of known-good cube collections under a base directory, typically the
//! resource directory of a [`Config`]. A fresh result can be checked against its reference:
//!
//! ```rust
//! # use cubeml::{Config, Cube, CubeCollection, DataDescriptor, ResultStore};
//! # let dir = tempfile::tempdir()?;
//! let config = Config::default().with_resource_dir(dir.path());
//! let store = ResultStore::from_config(&config)?;
//!
//! let data = DataDescriptor::from_elements([2], &[1.0f32, 2.0])?;
//! let cubes = CubeCollection::from(Cube::new(data));
//!
//! // The first check writes the reference, later checks compare against it.
//! store.check(["analysis", "mean.cml"], &cubes)?;
//! store.check(["analysis", "mean.cml"], &cubes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::{
    cml::{from_cml_str, to_cml_string, CmlOptions, CodecError},
    config::{Config, ConfigError},
    CubeCollection,
};

/// A result store error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResultStoreError {
    /// A configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// An IO error on a reference file.
    #[error("reference {}: {source}", .path.display())]
    Io {
        /// The reference path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A CubeML codec error.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// A result that differs from its reference.
    #[error("result differs from reference {}", .path.display())]
    Mismatch {
        /// The reference path.
        path: PathBuf,
    },
}

/// The outcome of comparing a result with its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// The result matches the reference.
    Match,
    /// The result differs from the reference.
    Mismatch,
    /// There is no reference.
    Missing,
}

/// Reference CubeML files under a base directory.
#[derive(Debug, Clone)]
pub struct ResultStore {
    base_path: PathBuf,
    options: CmlOptions,
}

impl ResultStore {
    /// Create a result store at `base_path` writing with `options`.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>, options: CmlOptions) -> Self {
        Self {
            base_path: base_path.into(),
            options,
        }
    }

    /// Create a result store in the resource directory of `config`, writing with its CubeML options.
    ///
    /// # Errors
    /// Returns [`ConfigError::ResourceDirUnset`] if `config` has no resource directory.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let base_path = config
            .resource_dir()
            .ok_or(ConfigError::ResourceDirUnset)?;
        Ok(Self::new(base_path, config.cml_options()))
    }

    /// The base directory.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// The CubeML options references are written with.
    #[must_use]
    pub fn options(&self) -> &CmlOptions {
        &self.options
    }

    /// Maps path components to a reference path.
    #[must_use]
    pub fn reference_path<P: AsRef<Path>>(
        &self,
        components: impl IntoIterator<Item = P>,
    ) -> PathBuf {
        let mut path = self.base_path.clone();
        path.extend(components);
        path
    }

    /// Load the reference at `components`.
    ///
    /// Returns [`None`] if there is no reference.
    ///
    /// # Errors
    /// Returns [`ResultStoreError`] if the reference cannot be read or is not valid CubeML.
    pub fn load<P: AsRef<Path>>(
        &self,
        components: impl IntoIterator<Item = P>,
    ) -> Result<Option<CubeCollection>, ResultStoreError> {
        let path = self.reference_path(components);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ResultStoreError::Io { path, source }),
        };
        Ok(Some(from_cml_str(&text)?))
    }

    /// Store `cubes` as the reference at `components`, creating parent directories as needed.
    ///
    /// # Errors
    /// Returns [`ResultStoreError`] if the reference cannot be written.
    pub fn store<P: AsRef<Path>>(
        &self,
        components: impl IntoIterator<Item = P>,
        cubes: &CubeCollection,
    ) -> Result<PathBuf, ResultStoreError> {
        let path = self.reference_path(components);
        let text = to_cml_string(cubes, &self.options)?;
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| ResultStoreError::Io {
                    path: path.clone(),
                    source,
                })?;
            }
        }
        std::fs::write(&path, text).map_err(|source| ResultStoreError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Compare `cubes` with the reference at `components`.
    ///
    /// # Errors
    /// Returns [`ResultStoreError`] if the reference exists but cannot be loaded.
    pub fn compare<P: AsRef<Path>>(
        &self,
        components: impl IntoIterator<Item = P>,
        cubes: &CubeCollection,
    ) -> Result<Comparison, ResultStoreError> {
        Ok(match self.load(components)? {
            None => Comparison::Missing,
            Some(reference) if reference == *cubes => Comparison::Match,
            Some(_) => Comparison::Mismatch,
        })
    }

    /// Check `cubes` against the reference at `components`.
    ///
    /// A missing reference is written from `cubes`.
    ///
    /// # Errors
    /// Returns [`ResultStoreError::Mismatch`] if `cubes` differs from the reference, or another [`ResultStoreError`]
    /// if the reference cannot be read or written.
    pub fn check<P: AsRef<Path>>(
        &self,
        components: impl IntoIterator<Item = P>,
        cubes: &CubeCollection,
    ) -> Result<(), ResultStoreError> {
        let components: Vec<P> = components.into_iter().collect();
        match self.compare(&components, cubes)? {
            Comparison::Match => Ok(()),
            Comparison::Mismatch => Err(ResultStoreError::Mismatch {
                path: self.reference_path(&components),
            }),
            Comparison::Missing => {
                let path = self.store(&components, cubes)?;
                log::warn!("created reference result {}", path.display());
                Ok(())
            }
        }
    }
}
