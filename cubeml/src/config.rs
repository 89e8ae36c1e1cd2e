//! `cubeml` configuration.
//!
//! A [`Config`] is an explicit value handed to the components that need it, such as a
//! [`ResultStore`](crate::ResultStore). There is no process-wide configuration.
//!
//! A configuration can be created from the environment with [`Config::from_env`], which reads
//! [`RESOURCE_DIR_ENV`], or loaded from a JSON file with [`Config::from_json_file`]:
//!
//! ```json
//! {
//!     "resource_dir": "/data/cubeml/results",
//!     "cml_threshold": 1000,
//!     "cml_edge_items": 3
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CmlOptions;

/// The environment variable holding the resource directory.
pub const RESOURCE_DIR_ENV: &str = "CUBEML_RESOURCE_DIR";

/// A configuration error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// No resource directory is configured.
    #[error("no resource directory is configured, set `CUBEML_RESOURCE_DIR` or `resource_dir`")]
    ResourceDirUnset,
    /// An IO error.
    #[error("failed to read configuration {}: {source}", .path.display())]
    Io {
        /// The configuration path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Invalid JSON.
    #[error("invalid configuration {}: {source}", .path.display())]
    Json {
        /// The configuration path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// The `cubeml` configuration.
///
/// The default values are:
/// - `resource_dir`: [`None`]
/// - `cml_threshold`: `1000`
/// - `cml_edge_items`: `3`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    resource_dir: Option<PathBuf>,
    cml_threshold: usize,
    cml_edge_items: usize,
}

impl Default for Config {
    fn default() -> Self {
        let options = CmlOptions::default();
        Self {
            resource_dir: None,
            cml_threshold: options.threshold(),
            cml_edge_items: options.edge_items(),
        }
    }
}

impl Config {
    /// Create a default configuration with the resource directory from the [`RESOURCE_DIR_ENV`] environment variable, if set.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(resource_dir) =
            std::env::var_os(RESOURCE_DIR_ENV).filter(|dir| !dir.is_empty())
        {
            config.set_resource_dir(Some(PathBuf::from(resource_dir)));
        }
        config
    }

    /// Load a configuration from a JSON file. Missing fields take their default values.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file cannot be read or is not a valid configuration.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Return the resource directory.
    #[must_use]
    pub fn resource_dir(&self) -> Option<&Path> {
        self.resource_dir.as_deref()
    }

    /// Set the resource directory.
    pub fn set_resource_dir(&mut self, resource_dir: Option<PathBuf>) -> &mut Self {
        self.resource_dir = resource_dir;
        self
    }

    /// Set the resource directory.
    #[must_use]
    pub fn with_resource_dir(mut self, resource_dir: impl Into<PathBuf>) -> Self {
        self.resource_dir = Some(resource_dir.into());
        self
    }

    /// Return the CubeML elision threshold.
    #[must_use]
    pub fn cml_threshold(&self) -> usize {
        self.cml_threshold
    }

    /// Set the CubeML elision threshold.
    pub fn set_cml_threshold(&mut self, cml_threshold: usize) -> &mut Self {
        self.cml_threshold = cml_threshold;
        self
    }

    /// Return the number of values kept at each end of an elided CubeML sequence.
    #[must_use]
    pub fn cml_edge_items(&self) -> usize {
        self.cml_edge_items
    }

    /// Set the number of values kept at each end of an elided CubeML sequence.
    pub fn set_cml_edge_items(&mut self, cml_edge_items: usize) -> &mut Self {
        self.cml_edge_items = cml_edge_items;
        self
    }

    /// The CubeML writer options.
    #[must_use]
    pub fn cml_options(&self) -> CmlOptions {
        CmlOptions::default()
            .with_threshold(self.cml_threshold)
            .with_edge_items(self.cml_edge_items)
    }

    /// The path of `components` under the resource directory.
    ///
    /// # Errors
    /// Returns [`ConfigError::ResourceDirUnset`] if no resource directory is configured.
    pub fn resource_path<P: AsRef<Path>>(
        &self,
        components: impl IntoIterator<Item = P>,
    ) -> Result<PathBuf, ConfigError> {
        let mut path = self
            .resource_dir
            .clone()
            .ok_or(ConfigError::ResourceDirUnset)?;
        path.extend(components);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default() {
        let config = Config::default();
        assert_eq!(config.resource_dir(), None);
        assert_eq!(config.cml_options(), CmlOptions::default());
        assert!(matches!(
            config.resource_path(["a.cml"]),
            Err(ConfigError::ResourceDirUnset)
        ));
    }

    #[test]
    fn config_resource_path() {
        let config = Config::default().with_resource_dir("/results");
        assert_eq!(
            config.resource_path(["analysis", "mean.cml"]).unwrap(),
            Path::new("/results/analysis/mean.cml")
        );
    }

    #[test]
    fn config_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cubeml.json");
        std::fs::write(&path, r#"{"resource_dir": "/results", "cml_threshold": 10}"#).unwrap();
        let config = Config::from_json_file(&path).unwrap();
        assert_eq!(config.resource_dir(), Some(Path::new("/results")));
        assert_eq!(config.cml_threshold(), 10);
        assert_eq!(config.cml_edge_items(), 3);
        assert_eq!(
            config.cml_options(),
            CmlOptions::default().with_threshold(10)
        );

        std::fs::write(&path, "{").unwrap();
        assert!(matches!(
            Config::from_json_file(&path),
            Err(ConfigError::Json { .. })
        ));
        assert!(matches!(
            Config::from_json_file(dir.path().join("missing.json")),
            Err(ConfigError::Io { .. })
        ));
    }
}
