use thiserror::Error;

use crate::{CellMethodError, CoordValidationError, CubeError};

/// A CubeML codec error.
///
/// Errors found within a cube name the cube and the element or attribute at fault.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// Malformed XML.
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    /// An IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The document has no root element.
    #[error("document has no root element")]
    MissingRoot,
    /// A second top-level element after the root.
    #[error("document has more than one root element, found `{0}`")]
    MultipleRoots(String),
    /// An element that is never closed.
    #[error("element `{0}` is not closed")]
    UnclosedElement(String),
    /// The root element is not `cubes`.
    #[error("root element `{0}` is not `cubes`")]
    UnexpectedRoot(String),
    /// The root element does not declare a namespace.
    #[error("root element does not declare the `urn:x-iris:cubeml-0.2` namespace")]
    MissingNamespace,
    /// The root element declares an unsupported namespace.
    #[error("unsupported namespace `{0}`, expected `urn:x-iris:cubeml-0.2`")]
    InvalidNamespace(String),
    /// An element that is not valid where it appears.
    #[error("cube `{cube}`: unexpected element `{element}` in `{parent}`")]
    UnexpectedElement {
        /// The cube name.
        cube: String,
        /// The parent element.
        parent: String,
        /// The unexpected element.
        element: String,
    },
    /// A required child element is missing.
    #[error("cube `{cube}`: `{parent}` has no `{element}` element")]
    MissingElement {
        /// The cube name.
        cube: String,
        /// The parent element.
        parent: String,
        /// The missing element.
        element: &'static str,
    },
    /// A required attribute is missing.
    #[error("cube `{cube}`: `{element}` is missing the `{attribute}` attribute")]
    MissingAttribute {
        /// The cube name.
        cube: String,
        /// The element.
        element: String,
        /// The missing attribute.
        attribute: &'static str,
    },
    /// An attribute value that cannot be parsed.
    #[error("cube `{cube}`: `{element}` attribute `{attribute}` = `{value}` is invalid: {reason}")]
    InvalidAttribute {
        /// The cube name.
        cube: String,
        /// The element.
        element: String,
        /// The attribute.
        attribute: String,
        /// The attribute value.
        value: String,
        /// Why the value is invalid.
        reason: String,
    },
    /// The number of bounds disagrees with the number of points.
    #[error("cube `{cube}` coordinate `{coord}` has {found} bounds for {points} points with {nbounds} bounds each")]
    BoundsMismatch {
        /// The cube name.
        cube: String,
        /// The coordinate name.
        coord: String,
        /// The number of points.
        points: usize,
        /// The number of bounds per point.
        nbounds: usize,
        /// The number of bounds.
        found: usize,
    },
    /// An invalid coordinate.
    #[error("cube `{cube}`: {source}")]
    Coord {
        /// The cube name.
        cube: String,
        /// The underlying error.
        #[source]
        source: CoordValidationError,
    },
    /// An invalid cube.
    #[error("cube `{cube}`: {source}")]
    Cube {
        /// The cube name.
        cube: String,
        /// The underlying error.
        #[source]
        source: CubeError,
    },
    /// An invalid cell method.
    #[error("cube `{cube}`: {source}")]
    CellMethod {
        /// The cube name.
        cube: String,
        /// The underlying error.
        #[source]
        source: CellMethodError,
    },
}
