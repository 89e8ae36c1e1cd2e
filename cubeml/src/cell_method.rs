//! Cell methods.

use thiserror::Error;

/// A cell method error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum CellMethodError {
    /// An empty method.
    #[error("cell method must name a method")]
    EmptyMethod,
    /// No coordinates.
    #[error("cell method `{0}` must reference at least one coordinate")]
    NoCoords(String),
    /// More intervals than coordinates.
    #[error("cell method `{method}` has {intervals} intervals for {coords} coordinates")]
    TooManyIntervals {
        /// The method.
        method: String,
        /// The number of intervals.
        intervals: usize,
        /// The number of coordinates.
        coords: usize,
    },
}

/// An aggregation applied to a cube over one or more coordinates, such as a `mean` over `time`.
///
/// Intervals pair with coordinates in order, so the `n`th interval describes the `n`th coordinate.
///
/// ```rust
/// # use cubeml::CellMethod;
/// let method = CellMethod::new("mean", ["time"])?.with_intervals(["1 hour"])?;
/// assert_eq!(method.to_string(), "mean: time (interval: 1 hour)");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellMethod {
    method: String,
    coord_names: Vec<String>,
    intervals: Vec<String>,
    comments: Vec<String>,
}

impl CellMethod {
    /// Create a new cell method with no intervals or comments.
    ///
    /// # Errors
    /// Returns [`CellMethodError`] if `method` is empty or there are no coordinate names.
    pub fn new<S: Into<String>>(
        method: impl Into<String>,
        coord_names: impl IntoIterator<Item = S>,
    ) -> Result<Self, CellMethodError> {
        let method: String = method.into();
        if method.trim().is_empty() {
            return Err(CellMethodError::EmptyMethod);
        }
        let coord_names: Vec<String> = coord_names.into_iter().map(Into::into).collect();
        if coord_names.is_empty() {
            return Err(CellMethodError::NoCoords(method));
        }
        Ok(Self {
            method,
            coord_names,
            intervals: Vec::new(),
            comments: Vec::new(),
        })
    }

    /// Set the intervals.
    ///
    /// # Errors
    /// Returns [`CellMethodError::TooManyIntervals`] if there are more intervals than coordinates.
    pub fn with_intervals<S: Into<String>>(
        mut self,
        intervals: impl IntoIterator<Item = S>,
    ) -> Result<Self, CellMethodError> {
        let intervals: Vec<String> = intervals.into_iter().map(Into::into).collect();
        if intervals.len() > self.coord_names.len() {
            return Err(CellMethodError::TooManyIntervals {
                method: self.method,
                intervals: intervals.len(),
                coords: self.coord_names.len(),
            });
        }
        self.intervals = intervals;
        Ok(self)
    }

    /// Set the comments.
    #[must_use]
    pub fn with_comments<S: Into<String>>(mut self, comments: impl IntoIterator<Item = S>) -> Self {
        self.comments = comments.into_iter().map(Into::into).collect();
        self
    }

    /// The method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The names of the coordinates the method was applied over.
    #[must_use]
    pub fn coord_names(&self) -> &[String] {
        &self.coord_names
    }

    /// The intervals.
    #[must_use]
    pub fn intervals(&self) -> &[String] {
        &self.intervals
    }

    /// The comments.
    #[must_use]
    pub fn comments(&self) -> &[String] {
        &self.comments
    }
}

impl std::fmt::Display for CellMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ", self.method)?;
        let comments = self.comments.iter().map(Some).chain(std::iter::repeat(None));
        for (index, (coord_name, comment)) in self.coord_names.iter().zip(comments).enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{coord_name}")?;
            let interval = self.intervals.get(index).map(|i| format!("interval: {i}"));
            let comment = comment.map(|c| format!("comment: {c}"));
            let extra: Vec<String> = interval.into_iter().chain(comment).collect();
            if !extra.is_empty() {
                write!(f, " ({})", extra.join(", "))?;
            }
        }
        for comment in self.comments.iter().skip(self.coord_names.len()) {
            write!(f, " (comment: {comment})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_method_display() {
        let method = CellMethod::new("mean", ["time"]).unwrap();
        assert_eq!(method.to_string(), "mean: time");

        let method = CellMethod::new("maximum", ["latitude", "longitude"])
            .unwrap()
            .with_intervals(["0.1 degrees"])
            .unwrap()
            .with_comments(["area weighted"]);
        assert_eq!(
            method.to_string(),
            "maximum: latitude (interval: 0.1 degrees, comment: area weighted), longitude"
        );
        assert_eq!(method.coord_names(), &["latitude", "longitude"]);
        assert_eq!(method.intervals(), &["0.1 degrees"]);
    }

    #[test]
    fn cell_method_errors() {
        assert_eq!(
            CellMethod::new("", ["time"]),
            Err(CellMethodError::EmptyMethod)
        );
        assert_eq!(
            CellMethod::new("mean", Vec::<String>::new()),
            Err(CellMethodError::NoCoords("mean".to_string()))
        );
        assert!(matches!(
            CellMethod::new("mean", ["time"])
                .unwrap()
                .with_intervals(["1 hour", "2 hours"]),
            Err(CellMethodError::TooManyIntervals {
                intervals: 2,
                coords: 1,
                ..
            })
        ));
    }
}
